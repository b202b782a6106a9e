//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, tokens, mail, cache) describe what the
//! domain needs from infrastructure. Driving ports describe what inbound
//! adapters may ask of the domain.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_command;
mod confirmation_mailer;
mod contact_repository;
mod contacts_command;
mod contacts_query;
mod current_user;
mod database_probe;
mod password_hasher;
mod token_codec;
mod user_cache;
mod user_profile_command;
mod user_repository;

pub use auth_command::AuthCommand;
#[cfg(test)]
pub use auth_command::MockAuthCommand;
#[cfg(test)]
pub use confirmation_mailer::MockConfirmationMailer;
pub use confirmation_mailer::{
    ConfirmationEmail, ConfirmationMailer, LoggingConfirmationMailer, MailerError,
};
#[cfg(test)]
pub use contact_repository::MockContactRepository;
pub use contact_repository::{ContactRepository, ContactRepositoryError};
pub use contacts_command::ContactsCommand;
#[cfg(test)]
pub use contacts_command::MockContactsCommand;
pub use contacts_query::ContactsQuery;
#[cfg(test)]
pub use contacts_query::MockContactsQuery;
pub use current_user::CurrentUserResolver;
#[cfg(test)]
pub use current_user::MockCurrentUserResolver;
#[cfg(test)]
pub use database_probe::MockDatabaseProbe;
pub use database_probe::{DatabaseProbe, DatabaseProbeError, FixtureDatabaseProbe};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenClaims, TokenCodec, TokenError};
#[cfg(test)]
pub use user_cache::MockUserCache;
pub use user_cache::{NoOpUserCache, UserCache, UserCacheError};
#[cfg(test)]
pub use user_profile_command::MockUserProfileCommand;
pub use user_profile_command::UserProfileCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredUser, UserPersistenceError, UserRepository};
