//! Contact records owned by a single user.
//!
//! A [`ContactDraft`] carries the validated, user-editable fields used both for
//! creation and for full replacement on update. A persisted [`Contact`] adds the
//! identifier, owner and audit timestamps.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::user::{UserId, is_plausible_email};

/// Maximum length of a first or last name.
pub const NAME_MAX: usize = 50;
/// Maximum length of a contact email address.
pub const CONTACT_EMAIL_MAX: usize = 100;
/// Maximum length of a phone number.
pub const PHONE_MAX: usize = 20;
/// Maximum length of the free-form notes field.
pub const ADDITIONAL_DATA_MAX: usize = 150;

/// Field-level validation failures for contact payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    InvalidId,
    EmptyField { field: &'static str },
    FieldTooLong { field: &'static str, max: usize },
    InvalidEmail,
    InvalidPhoneNumber,
    BirthdayInFuture,
}

impl ContactValidationError {
    /// Name of the offending payload field, in wire (camelCase) form.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "contactId",
            Self::EmptyField { field } | Self::FieldTooLong { field, .. } => field,
            Self::InvalidEmail => "email",
            Self::InvalidPhoneNumber => "phoneNumber",
            Self::BirthdayInFuture => "birthday",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_uuid",
            Self::EmptyField { .. } => "empty_field",
            Self::FieldTooLong { .. } => "too_long",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPhoneNumber => "invalid_phone_number",
            Self::BirthdayInFuture => "birthday_in_future",
        }
    }
}

impl fmt::Display for ContactValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "contact id must be a valid UUID"),
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::InvalidEmail => write!(f, "email must look like name@example.com"),
            Self::InvalidPhoneNumber => write!(
                f,
                "phone number may only contain digits, spaces, '+', '-', '(' or ')'"
            ),
            Self::BirthdayInFuture => write!(f, "birthday must not be in the future"),
        }
    }
}

impl std::error::Error for ContactValidationError {}

/// Contact identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactId(Uuid);

impl ContactId {
    /// Parse an identifier from a path segment.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ContactValidationError::InvalidId)
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn required_text(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ContactValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContactValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > max {
        return Err(ContactValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')')
}

/// Raw, unvalidated contact fields as received from an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFields<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub birthday: NaiveDate,
    pub additional_data: Option<&'a str>,
}

/// Validated, user-editable contact fields.
///
/// ## Invariants
/// - names are 1..=50 characters after trimming;
/// - email is a plausible address of at most 100 characters, stored as
///   given apart from surrounding whitespace;
/// - phone number is 1..=20 characters drawn from digits and `+-() `, with
///   at least one digit;
/// - additional data is at most 150 characters; blank input becomes `None`.
///
/// The "birthday not in the future" rule depends on the current date and is
/// enforced by [`ContactDraft::ensure_birthday_not_after`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    birthday: NaiveDate,
    additional_data: Option<String>,
}

impl ContactDraft {
    /// Validate raw fields.
    pub fn try_from_fields(fields: ContactFields<'_>) -> Result<Self, ContactValidationError> {
        let first_name = required_text(fields.first_name, "firstName", NAME_MAX)?;
        let last_name = required_text(fields.last_name, "lastName", NAME_MAX)?;

        let email = fields.email.trim();
        if email.chars().count() > CONTACT_EMAIL_MAX {
            return Err(ContactValidationError::FieldTooLong {
                field: "email",
                max: CONTACT_EMAIL_MAX,
            });
        }
        if !is_plausible_email(email) {
            return Err(ContactValidationError::InvalidEmail);
        }
        let email = email.to_owned();

        let phone_number = required_text(fields.phone_number, "phoneNumber", PHONE_MAX)?;
        if !phone_number.chars().all(is_phone_char)
            || !phone_number.chars().any(|c| c.is_ascii_digit())
        {
            return Err(ContactValidationError::InvalidPhoneNumber);
        }

        let additional_data = match fields.additional_data.map(str::trim) {
            None | Some("") => None,
            Some(text) if text.chars().count() > ADDITIONAL_DATA_MAX => {
                return Err(ContactValidationError::FieldTooLong {
                    field: "additionalData",
                    max: ADDITIONAL_DATA_MAX,
                });
            }
            Some(text) => Some(text.to_owned()),
        };

        Ok(Self {
            first_name,
            last_name,
            email,
            phone_number,
            birthday: fields.birthday,
            additional_data,
        })
    }

    /// Reject birthdays later than `today`.
    pub fn ensure_birthday_not_after(
        &self,
        today: NaiveDate,
    ) -> Result<(), ContactValidationError> {
        if self.birthday > today {
            return Err(ContactValidationError::BirthdayInFuture);
        }
        Ok(())
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn birthday(&self) -> NaiveDate {
        self.birthday
    }

    pub fn additional_data(&self) -> Option<&str> {
        self.additional_data.as_deref()
    }
}

/// Persisted contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    id: ContactId,
    owner: UserId,
    fields: ContactDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Contact {
    /// Assemble a contact from stored parts.
    pub fn new(
        id: ContactId,
        owner: UserId,
        fields: ContactDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            fields,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> ContactId {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Editable fields.
    pub fn fields(&self) -> &ContactDraft {
        &self.fields
    }

    pub fn birthday(&self) -> NaiveDate {
        self.fields.birthday
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Case-insensitive substring match over the searchable fields.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let fields = &self.fields;
        [
            fields.first_name.as_str(),
            fields.last_name.as_str(),
            fields.email.as_str(),
            fields.phone_number.as_str(),
            fields.additional_data.as_deref().unwrap_or_default(),
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    }
}
