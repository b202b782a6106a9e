//! Contact use cases scoped to a single owner.
//!
//! Every repository call carries the owner id, so a contact belonging to
//! someone else is indistinguishable from a missing one.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{
    ContactRepository, ContactRepositoryError, ContactsCommand, ContactsQuery,
};
use crate::domain::{
    BirthdayWindow, Contact, ContactDraft, ContactId, ContactValidationError, Error, Page, UserId,
    upcoming_birthdays,
};

const CONTACT_NOT_FOUND: &str = "contact not found";

/// Translate a field validation failure into an `invalid_request` error with
/// `{field, code}` details.
pub fn contact_validation_error(error: ContactValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.code(),
    }))
}

fn map_repository_error(error: ContactRepositoryError) -> Error {
    match error {
        ContactRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("contact repository unavailable: {message}"))
        }
        ContactRepositoryError::Query { message } => {
            Error::internal(format!("contact repository error: {message}"))
        }
    }
}

/// Implements the contact driving ports over a [`ContactRepository`].
pub struct ContactsService<R: ?Sized> {
    contacts: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> Clone for ContactsService<R> {
    fn clone(&self) -> Self {
        Self {
            contacts: Arc::clone(&self.contacts),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: ?Sized> ContactsService<R> {
    pub fn new(contacts: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { contacts, clock }
    }
}

impl<R: ContactRepository + ?Sized> ContactsService<R> {
    fn check_birthday(&self, draft: &ContactDraft) -> Result<(), Error> {
        draft
            .ensure_birthday_not_after(self.clock.utc().date_naive())
            .map_err(contact_validation_error)
    }
}

#[async_trait]
impl<R: ContactRepository + ?Sized> ContactsCommand for ContactsService<R> {
    async fn create(&self, owner: &UserId, draft: ContactDraft) -> Result<Contact, Error> {
        self.check_birthday(&draft)?;
        let now = self.clock.utc();
        let contact = Contact::new(ContactId::random(), owner.clone(), draft, now, now);
        self.contacts
            .insert(&contact)
            .await
            .map_err(map_repository_error)?;
        Ok(contact)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &ContactId,
        draft: ContactDraft,
    ) -> Result<Contact, Error> {
        self.check_birthday(&draft)?;
        self.contacts
            .update(owner, id, &draft, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(CONTACT_NOT_FOUND))
    }

    async fn delete(&self, owner: &UserId, id: &ContactId) -> Result<(), Error> {
        let deleted = self
            .contacts
            .delete(owner, id)
            .await
            .map_err(map_repository_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found(CONTACT_NOT_FOUND))
        }
    }
}

#[async_trait]
impl<R: ContactRepository + ?Sized> ContactsQuery for ContactsService<R> {
    async fn list(&self, owner: &UserId, page: Page) -> Result<Vec<Contact>, Error> {
        self.contacts
            .list(owner, page)
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, owner: &UserId, id: &ContactId) -> Result<Contact, Error> {
        self.contacts
            .find(owner, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(CONTACT_NOT_FOUND))
    }

    async fn search(&self, owner: &UserId, text: &str, page: Page) -> Result<Vec<Contact>, Error> {
        let needle = text.trim();
        if needle.is_empty() {
            return Err(
                Error::invalid_request("search text must not be empty").with_details(json!({
                    "field": "text",
                    "code": "empty_field",
                })),
            );
        }
        self.contacts
            .search(owner, needle, page)
            .await
            .map_err(map_repository_error)
    }

    async fn upcoming_birthdays(
        &self,
        owner: &UserId,
        window: BirthdayWindow,
    ) -> Result<Vec<Contact>, Error> {
        let contacts = self
            .contacts
            .list_all(owner)
            .await
            .map_err(map_repository_error)?;
        Ok(upcoming_birthdays(
            contacts,
            self.clock.utc().date_naive(),
            window,
        ))
    }
}

#[cfg(test)]
#[path = "contacts_service_tests.rs"]
mod tests;
