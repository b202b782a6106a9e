//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{AvatarUrl, EmailAddress, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (`email` or `username`) already holds the value.
        Duplicate { field: String } => "user with this {field} already exists",
    }
}

/// A user together with its password hash.
///
/// Only the credential-checking path needs the hash; everything else works with
/// the plain [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Storage for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with [`UserPersistenceError::Duplicate`]
    /// when the email or username is taken.
    async fn insert(&self, user: &StoredUser) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by exact username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError>;

    /// Whether the username is already registered.
    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError>;

    /// Flip `confirmed` to true for an unconfirmed account.
    ///
    /// Returns `true` only when a row actually changed, so concurrent or
    /// repeated confirmations observe the transition exactly once.
    async fn mark_confirmed(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError>;

    /// Replace the avatar link, returning the updated user if it exists.
    async fn update_avatar(
        &self,
        id: &UserId,
        avatar: &AvatarUrl,
    ) -> Result<Option<User>, UserPersistenceError>;
}
