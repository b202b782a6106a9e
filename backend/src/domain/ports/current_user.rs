//! Driving port resolving a bearer token to the authenticated user.

use async_trait::async_trait;

use crate::domain::{Error, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrentUserResolver: Send + Sync {
    /// Verify an access token and load its user, consulting the user cache
    /// first. Any failure to authenticate is `Unauthorized`.
    async fn resolve(&self, bearer_token: &str) -> Result<User, Error>;
}
