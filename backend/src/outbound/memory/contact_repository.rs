//! `ContactRepository` backed by a mutex-guarded vector in insertion order.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ContactRepository, ContactRepositoryError};
use crate::domain::{Contact, ContactDraft, ContactId, Page, UserId};

#[derive(Debug, Default)]
pub struct InMemoryContactRepository {
    contacts: Mutex<Vec<Contact>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Contact>>, ContactRepositoryError> {
        self.contacts
            .lock()
            .map_err(|_| ContactRepositoryError::query("contact store lock poisoned"))
    }

    fn owned_by(&self, owner: &UserId) -> Result<Vec<Contact>, ContactRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|contact| contact.owner() == owner)
            .cloned()
            .collect())
    }
}

fn is_target(contact: &Contact, owner: &UserId, id: &ContactId) -> bool {
    contact.owner() == owner && contact.id() == *id
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn insert(&self, contact: &Contact) -> Result<(), ContactRepositoryError> {
        self.lock()?.push(contact.clone());
        Ok(())
    }

    async fn list(
        &self,
        owner: &UserId,
        page: Page,
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        Ok(page.apply(self.owned_by(owner)?))
    }

    async fn list_all(&self, owner: &UserId) -> Result<Vec<Contact>, ContactRepositoryError> {
        self.owned_by(owner)
    }

    async fn find(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .find(|contact| is_target(contact, owner, id))
            .cloned())
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &ContactId,
        draft: &ContactDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        let mut contacts = self.lock()?;
        Ok(contacts
            .iter_mut()
            .find(|contact| is_target(contact, owner, id))
            .map(|contact| {
                *contact = Contact::new(
                    contact.id(),
                    contact.owner().clone(),
                    draft.clone(),
                    contact.created_at(),
                    updated_at,
                );
                contact.clone()
            }))
    }

    async fn delete(&self, owner: &UserId, id: &ContactId) -> Result<bool, ContactRepositoryError> {
        let mut contacts = self.lock()?;
        let before = contacts.len();
        contacts.retain(|contact| !is_target(contact, owner, id));
        Ok(contacts.len() != before)
    }

    async fn search(
        &self,
        owner: &UserId,
        needle: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        let matches = self
            .owned_by(owner)?
            .into_iter()
            .filter(|contact| contact.matches_text(needle));
        Ok(page.apply(matches))
    }
}
