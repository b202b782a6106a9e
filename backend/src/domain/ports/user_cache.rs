//! Port for the look-through cache in front of current-user reads.
//!
//! The cache is an optimisation only. Callers log its failures and fall back
//! to the repository, so an unavailable cache never fails a request.

use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user cache adapters.
    pub enum UserCacheError {
        /// Cache backend could not be reached.
        Backend { message: String } => "user cache backend failed: {message}",
        /// Cached payload could not be encoded or decoded.
        Serialization { message: String } => "user cache serialization failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Return the cached user, if present and fresh.
    async fn get(&self, id: &UserId) -> Result<Option<User>, UserCacheError>;

    /// Store the user with the adapter's configured time-to-live.
    async fn put(&self, user: &User) -> Result<(), UserCacheError>;

    /// Drop any cached copy after the user changes.
    async fn invalidate(&self, id: &UserId) -> Result<(), UserCacheError>;
}

/// Cache that never stores anything. Used when no Redis URL is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpUserCache;

#[async_trait]
impl UserCache for NoOpUserCache {
    async fn get(&self, _id: &UserId) -> Result<Option<User>, UserCacheError> {
        Ok(None)
    }

    async fn put(&self, _user: &User) -> Result<(), UserCacheError> {
        Ok(())
    }

    async fn invalidate(&self, _id: &UserId) -> Result<(), UserCacheError> {
        Ok(())
    }
}
