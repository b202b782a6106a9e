//! Port for contact persistence.
//!
//! Every method takes the owning [`UserId`] and adapters must filter on it.
//! A contact that belongs to somebody else is indistinguishable from one that
//! does not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Contact, ContactDraft, ContactId, Page, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by contact repository adapters.
    pub enum ContactRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "contact repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "contact repository query failed: {message}",
    }
}

/// Owner-scoped contact storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Persist a new contact.
    async fn insert(&self, contact: &Contact) -> Result<(), ContactRepositoryError>;

    /// Page through the owner's contacts in creation order.
    async fn list(
        &self,
        owner: &UserId,
        page: Page,
    ) -> Result<Vec<Contact>, ContactRepositoryError>;

    /// Every contact of the owner, used for birthday windows.
    async fn list_all(&self, owner: &UserId) -> Result<Vec<Contact>, ContactRepositoryError>;

    /// Fetch one of the owner's contacts.
    async fn find(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactRepositoryError>;

    /// Replace the editable fields, returning the updated contact.
    async fn update(
        &self,
        owner: &UserId,
        id: &ContactId,
        draft: &ContactDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Contact>, ContactRepositoryError>;

    /// Delete one of the owner's contacts. Returns `false` when nothing matched.
    async fn delete(&self, owner: &UserId, id: &ContactId) -> Result<bool, ContactRepositoryError>;

    /// Case-insensitive substring search over names, email, phone and notes.
    ///
    /// `needle` is trimmed and non-empty.
    async fn search(
        &self,
        owner: &UserId,
        needle: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactRepositoryError>;
}
