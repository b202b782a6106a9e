//! Driving port for mutating the authenticated user's contacts.

use async_trait::async_trait;

use crate::domain::{Contact, ContactDraft, ContactId, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactsCommand: Send + Sync {
    /// Create a contact owned by `owner`.
    async fn create(&self, owner: &UserId, draft: ContactDraft) -> Result<Contact, Error>;

    /// Replace the editable fields of one of `owner`'s contacts.
    async fn update(
        &self,
        owner: &UserId,
        id: &ContactId,
        draft: ContactDraft,
    ) -> Result<Contact, Error>;

    /// Delete one of `owner`'s contacts.
    async fn delete(&self, owner: &UserId, id: &ContactId) -> Result<(), Error>;
}
