//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection becomes an `invalid_request` [`Error`] whose details carry
//! the offending `field` and a stable `code`, so clients can highlight the
//! right input regardless of which layer refused it.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError};
use actix_web::{HttpRequest, web};
use serde_json::json;

use crate::domain::{
    BirthdayWindowError, ContactId, Error, LoginValidationError, PageValidationError,
    RegistrationValidationError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    EmptyField,
    TooShort,
    TooLong,
    InvalidCharacters,
    InvalidEmail,
    InvalidUrl,
    InvalidUuid,
    OutOfRange,
    InvalidPayload,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::TooShort => "too_short",
            ErrorCode::TooLong => "too_long",
            ErrorCode::InvalidCharacters => "invalid_characters",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidUrl => "invalid_url",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::InvalidPayload => "invalid_payload",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const AVATAR_URL: FieldName = FieldName::new("avatarUrl");
const USER_ID: FieldName = FieldName::new("id");
const CONTACT_ID: FieldName = FieldName::new("contactId");
const LIMIT: FieldName = FieldName::new("limit");
const DAYS: FieldName = FieldName::new("days");

pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_error_with_value(
    field: FieldName,
    code: ErrorCode,
    message: impl Into<String>,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => {
            (USER_ID, ErrorCode::InvalidUuid)
        }
        UserValidationError::EmptyUsername => (USERNAME, ErrorCode::EmptyField),
        UserValidationError::UsernameTooShort { .. } => (USERNAME, ErrorCode::TooShort),
        UserValidationError::UsernameTooLong { .. } => (USERNAME, ErrorCode::TooLong),
        UserValidationError::UsernameInvalidCharacters => (USERNAME, ErrorCode::InvalidCharacters),
        UserValidationError::EmptyEmail => (EMAIL, ErrorCode::EmptyField),
        UserValidationError::EmailTooLong { .. } => (EMAIL, ErrorCode::TooLong),
        UserValidationError::InvalidEmail => (EMAIL, ErrorCode::InvalidEmail),
        UserValidationError::AvatarTooLong { .. } => (AVATAR_URL, ErrorCode::TooLong),
        UserValidationError::InvalidAvatarUrl => (AVATAR_URL, ErrorCode::InvalidUrl),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn registration_validation_error(err: RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::User(inner) => user_validation_error(inner),
        RegistrationValidationError::PasswordTooShort { .. } => {
            field_error(PASSWORD, ErrorCode::TooShort, err.to_string())
        }
        RegistrationValidationError::PasswordTooLong { .. } => {
            field_error(PASSWORD, ErrorCode::TooLong, err.to_string())
        }
    }
}

pub(crate) fn login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyUsername => USERNAME,
        LoginValidationError::EmptyPassword => PASSWORD,
    };
    field_error(field, ErrorCode::EmptyField, err.to_string())
}

pub(crate) fn page_validation_error(err: PageValidationError) -> Error {
    field_error(LIMIT, ErrorCode::OutOfRange, err.to_string())
}

pub(crate) fn birthday_window_error(err: BirthdayWindowError) -> Error {
    field_error(DAYS, ErrorCode::OutOfRange, err.to_string())
}

pub(crate) fn parse_contact_id(value: &str) -> Result<ContactId, Error> {
    ContactId::new(value).map_err(|_| {
        field_error_with_value(
            CONTACT_ID,
            ErrorCode::InvalidUuid,
            "contactId must be a valid UUID",
            value,
        )
    })
}

fn payload_error(message: String) -> actix_web::Error {
    Error::invalid_request(message)
        .with_details(json!({ "code": ErrorCode::InvalidPayload.as_str() }))
        .into()
}

/// JSON body extractor config that reports failures in the API error schema.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| payload_error(err.to_string()))
}

/// Query-string extractor config that reports failures in the API error schema.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err: QueryPayloadError, _req: &HttpRequest| payload_error(err.to_string()))
}

/// Form body extractor config that reports failures in the API error schema.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .error_handler(|err: UrlencodedError, _req: &HttpRequest| payload_error(err.to_string()))
}

/// Path extractor config that reports failures in the API error schema.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err: PathError, _req: &HttpRequest| payload_error(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainErrorCode, Registration};
    use rstest::rstest;

    fn details(error: &Error) -> (&str, &str) {
        let details = error.details().expect("details present");
        (
            details["field"].as_str().expect("field"),
            details["code"].as_str().expect("code"),
        )
    }

    #[rstest]
    #[case("ab", "ada@example.com", "secret1", ("username", "too_short"))]
    #[case("ada lovelace", "ada@example.com", "secret1", ("username", "invalid_characters"))]
    #[case("ada", "not-an-email", "secret1", ("email", "invalid_email"))]
    #[case("ada", "", "secret1", ("email", "empty_field"))]
    #[case("ada", "ada@example.com", "12345", ("password", "too_short"))]
    fn registration_failures_name_the_field(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: (&str, &str),
    ) {
        let err = Registration::try_from_parts(username, email, password).expect_err("invalid");
        let error = registration_validation_error(err);
        assert_eq!(error.code(), DomainErrorCode::InvalidRequest);
        assert_eq!(details(&error), expected);
    }

    #[rstest]
    fn contact_id_errors_echo_the_value() {
        let error = parse_contact_id("nope").expect_err("invalid id");
        let payload = error.details().expect("details");
        assert_eq!(payload["field"], "contactId");
        assert_eq!(payload["value"], "nope");
        assert_eq!(payload["code"], "invalid_uuid");
    }

    #[rstest]
    fn page_errors_point_at_limit() {
        let error = page_validation_error(PageValidationError::LimitOutOfRange { max: 100 });
        assert_eq!(details(&error), ("limit", "out_of_range"));
        assert_eq!(error.message(), "limit must be between 1 and 100");
    }
}
