//! `UserRepository` backed by a mutex-guarded map.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{StoredUser, UserPersistenceError, UserRepository};
use crate::domain::{AvatarUrl, EmailAddress, User, UserId, Username};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, StoredUser>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, StoredUser>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

fn find_by_email_mut<'a>(
    users: &'a mut HashMap<UserId, StoredUser>,
    email: &EmailAddress,
) -> Option<&'a mut StoredUser> {
    users
        .values_mut()
        .find(|stored| stored.user.email() == email)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &StoredUser) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        if users
            .values()
            .any(|stored| stored.user.email() == user.user.email())
        {
            return Err(UserPersistenceError::duplicate("email"));
        }
        if users
            .values()
            .any(|stored| stored.user.username() == user.user.username())
        {
            return Err(UserPersistenceError::duplicate("username"));
        }
        users.insert(user.user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .values()
            .find(|stored| stored.user.email() == email)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        Ok(self
            .lock()?
            .values()
            .find(|stored| stored.user.username().as_ref() == username)
            .cloned())
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        Ok(self
            .lock()?
            .values()
            .any(|stored| stored.user.username() == username))
    }

    async fn mark_confirmed(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        let mut users = self.lock()?;
        match find_by_email_mut(&mut users, email) {
            Some(stored) if !stored.user.is_confirmed() => {
                stored.user = stored.user.clone().with_confirmed(true);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_avatar(
        &self,
        id: &UserId,
        avatar: &AvatarUrl,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.lock()?;
        Ok(users.get_mut(id).map(|stored| {
            stored.user = stored.user.clone().with_avatar(Some(avatar.clone()));
            stored.user.clone()
        }))
    }
}
