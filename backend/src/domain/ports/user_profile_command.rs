//! Driving port for changes a user makes to their own profile.

use async_trait::async_trait;

use crate::domain::{AvatarUrl, Error, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileCommand: Send + Sync {
    /// Set the avatar link and evict the cached profile.
    async fn update_avatar(&self, user_id: &UserId, avatar: AvatarUrl) -> Result<User, Error>;
}
