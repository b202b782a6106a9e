//! Driving port for reading the authenticated user's contacts.

use async_trait::async_trait;

use crate::domain::{BirthdayWindow, Contact, ContactId, Error, Page, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactsQuery: Send + Sync {
    async fn list(&self, owner: &UserId, page: Page) -> Result<Vec<Contact>, Error>;

    /// Fails with `NotFound` when the contact is missing or not owned.
    async fn get(&self, owner: &UserId, id: &ContactId) -> Result<Contact, Error>;

    /// Case-insensitive substring search; blank text is `InvalidRequest`.
    async fn search(&self, owner: &UserId, text: &str, page: Page) -> Result<Vec<Contact>, Error>;

    /// Contacts whose next birthday falls within `window` days of today.
    async fn upcoming_birthdays(
        &self,
        owner: &UserId,
        window: BirthdayWindow,
    ) -> Result<Vec<Contact>, Error>;
}
