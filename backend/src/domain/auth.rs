//! Authentication primitives: credentials, registration payloads and tokens.
//!
//! Inbound adapters build these from raw strings before talking to
//! [`crate::domain::ports::AuthCommand`], so services never see unvalidated
//! input. Passwords are held in [`Zeroizing`] buffers and wiped on drop.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError, Username};

/// Minimum accepted password length at registration.
pub const PASSWORD_MIN: usize = 6;
/// Maximum accepted password length at registration.
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Credentials presented to the login endpoint.
///
/// The username is only trimmed, not shape-checked: an unknown or malformed
/// username must fail as "bad credentials", never as a validation error that
/// would hint at which usernames exist.
///
/// # Examples
/// ```
/// use contacts_api::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "hunter22").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validation failures for a registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Username or email failed its own validation.
    User(UserValidationError),
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Password longer than [`PASSWORD_MAX`].
    PasswordTooLong { max: usize },
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(inner) => inner.fmt(f),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl From<UserValidationError> for RegistrationValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw registration inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        let email = EmailAddress::new(email)?;
        let length = password.chars().count();
        if length < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(RegistrationValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Purpose a signed token was minted for.
///
/// Tokens are only honoured for the scope they carry: an email verification
/// link is not a bearer credential and an access token cannot confirm an
/// account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    Access,
    EmailVerification,
}

/// Bearer token returned from a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccessToken {
    /// Signed JWT to send as `Authorization: Bearer <token>`.
    pub access_token: String,
    /// Always `bearer`.
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl AccessToken {
    /// Wrap a signed token string.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            token_type: "bearer".to_owned(),
        }
    }
}

/// Result of redeeming a confirmation token or asking for a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// The account was unconfirmed and has now been confirmed.
    Confirmed,
    /// Nothing changed because the account was already confirmed.
    AlreadyConfirmed,
    /// A confirmation email was queued (or silently skipped for unknown
    /// addresses).
    EmailSent,
}

impl ConfirmationOutcome {
    /// Human-readable message surfaced to clients.
    pub fn message(self) -> &'static str {
        match self {
            Self::Confirmed => "Email confirmed",
            Self::AlreadyConfirmed => "Your email is already confirmed",
            Self::EmailSent => "Check your email for confirmation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_login_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("ada", " secret ").expect("valid");
        assert_eq!(creds.password(), " secret ");
    }

    #[rstest]
    #[case("ada", "ada@example.com", "12345", RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN })]
    #[case("ada", "ada@example.com", &"x".repeat(PASSWORD_MAX + 1), RegistrationValidationError::PasswordTooLong { max: PASSWORD_MAX })]
    #[case("a", "ada@example.com", "secret1", RegistrationValidationError::User(UserValidationError::UsernameTooShort { min: 3 }))]
    #[case(
        "ada",
        "nope",
        "secret1",
        RegistrationValidationError::User(UserValidationError::InvalidEmail)
    )]
    fn invalid_registrations(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: RegistrationValidationError,
    ) {
        let err = Registration::try_from_parts(username, email, password)
            .expect_err("invalid registration");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn valid_registration_normalises_email() {
        let registration =
            Registration::try_from_parts("ada", "ADA@example.com", "secret1").expect("valid");
        assert_eq!(registration.email().as_ref(), "ada@example.com");
        assert_eq!(registration.password(), "secret1");
    }

    #[rstest]
    fn token_scope_serialises_snake_case() {
        let value = serde_json::to_value(TokenScope::EmailVerification).expect("serialise");
        assert_eq!(value, serde_json::json!("email_verification"));
    }
}
