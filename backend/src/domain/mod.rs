//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: Define strongly typed entities used by the API and persistence
//! layers, plus the services that implement the driving ports. Types are
//! immutable once validated; invariants are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Contact and their validated field types.
//! - AuthService, CurrentUserService, UserProfileService, ContactsService.

pub mod auth;
pub mod auth_service;
pub mod birthdays;
pub mod contact;
pub mod contacts_service;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_profile_service;

pub use self::auth::{
    AccessToken, ConfirmationOutcome, LoginCredentials, LoginValidationError, PASSWORD_MAX,
    PASSWORD_MIN, Registration, RegistrationValidationError, TokenScope,
};
pub use self::auth_service::{AuthService, AuthServicePorts, CurrentUserService, gravatar_url};
pub use self::birthdays::{
    BirthdayWindow, BirthdayWindowError, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS, next_anniversary,
    upcoming_birthdays,
};
pub use self::contact::{
    ADDITIONAL_DATA_MAX, CONTACT_EMAIL_MAX, Contact, ContactDraft, ContactFields, ContactId,
    ContactValidationError, NAME_MAX, PHONE_MAX,
};
pub use self::contacts_service::{ContactsService, contact_validation_error};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::pagination::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageValidationError};
pub use self::trace_id::TraceId;
pub use self::user::{
    AVATAR_URL_MAX, AvatarUrl, EMAIL_MAX, EmailAddress, USERNAME_MAX, USERNAME_MIN, User, UserId,
    UserValidationError, Username,
};
pub use self::user_profile_service::UserProfileService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use contacts_api::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("contact not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
