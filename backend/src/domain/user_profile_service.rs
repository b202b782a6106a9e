//! Profile updates for the authenticated user.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::auth_service::map_user_persistence_error;
use crate::domain::ports::{UserCache, UserProfileCommand, UserRepository};
use crate::domain::{AvatarUrl, Error, User, UserId};

/// Applies profile changes and keeps the user cache coherent.
pub struct UserProfileService<U: ?Sized, C: ?Sized> {
    users: Arc<U>,
    cache: Arc<C>,
}

impl<U: ?Sized, C: ?Sized> Clone for UserProfileService<U, C> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<U: ?Sized, C: ?Sized> UserProfileService<U, C> {
    pub fn new(users: Arc<U>, cache: Arc<C>) -> Self {
        Self { users, cache }
    }
}

#[async_trait]
impl<U: ?Sized, C: ?Sized> UserProfileCommand for UserProfileService<U, C>
where
    U: UserRepository,
    C: UserCache,
{
    async fn update_avatar(&self, user_id: &UserId, avatar: AvatarUrl) -> Result<User, Error> {
        let user = self
            .users
            .update_avatar(user_id, &avatar)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if let Err(error) = self.cache.invalidate(user_id).await {
            warn!(%error, %user_id, "failed to invalidate cached user");
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockUserCache, MockUserRepository, UserCacheError, UserPersistenceError,
    };
    use crate::domain::{EmailAddress, ErrorCode, Username};
    use chrono::Utc;

    fn avatar() -> AvatarUrl {
        AvatarUrl::new("https://cdn.example.com/ada.png").expect("valid url")
    }

    fn user_with_avatar(id: UserId) -> User {
        User::new(
            id,
            Username::new("ada").expect("valid username"),
            EmailAddress::new("ada@example.com").expect("valid email"),
            Utc::now(),
        )
        .with_avatar(Some(avatar()))
    }

    #[tokio::test]
    async fn update_avatar_persists_and_evicts_cache() {
        let user_id = UserId::random();
        let updated = user_with_avatar(user_id.clone());
        let mut users = MockUserRepository::new();
        users
            .expect_update_avatar()
            .withf(|_, url| url.as_ref() == "https://cdn.example.com/ada.png")
            .times(1)
            .return_once(move |_, _| Ok(Some(updated)));
        let mut cache = MockUserCache::new();
        let evicted = user_id.clone();
        cache
            .expect_invalidate()
            .withf(move |id| *id == evicted)
            .times(1)
            .return_once(|_| Ok(()));

        let service = UserProfileService::new(Arc::new(users), Arc::new(cache));
        let user = service
            .update_avatar(&user_id, avatar())
            .await
            .expect("avatar updated");
        assert_eq!(user.avatar(), Some(&avatar()));
    }

    #[tokio::test]
    async fn update_avatar_tolerates_cache_failure() {
        let user_id = UserId::random();
        let updated = user_with_avatar(user_id.clone());
        let mut users = MockUserRepository::new();
        users
            .expect_update_avatar()
            .return_once(move |_, _| Ok(Some(updated)));
        let mut cache = MockUserCache::new();
        cache
            .expect_invalidate()
            .return_once(|_| Err(UserCacheError::backend("redis down")));

        let service = UserProfileService::new(Arc::new(users), Arc::new(cache));
        service
            .update_avatar(&user_id, avatar())
            .await
            .expect("cache failure is not fatal");
    }

    #[tokio::test]
    async fn update_avatar_reports_missing_user() {
        let mut users = MockUserRepository::new();
        users.expect_update_avatar().return_once(|_, _| Ok(None));
        let mut cache = MockUserCache::new();
        cache.expect_invalidate().never();

        let service = UserProfileService::new(Arc::new(users), Arc::new(cache));
        let error = service
            .update_avatar(&UserId::random(), avatar())
            .await
            .expect_err("missing user");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_avatar_maps_query_failures() {
        let mut users = MockUserRepository::new();
        users
            .expect_update_avatar()
            .return_once(|_, _| Err(UserPersistenceError::query("syntax error")));

        let service = UserProfileService::new(Arc::new(users), Arc::new(MockUserCache::new()));
        let error = service
            .update_avatar(&UserId::random(), avatar())
            .await
            .expect_err("query failure");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }
}
