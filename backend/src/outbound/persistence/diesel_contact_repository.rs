//! PostgreSQL-backed `ContactRepository` implementation using Diesel ORM.
//!
//! Every statement filters on `user_id`, so callers can never reach another
//! user's rows through this adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ContactRepository, ContactRepositoryError};
use crate::domain::{Contact, ContactDraft, ContactFields, ContactId, Page, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ContactChangeset, ContactRow, NewContactRow};
use super::pool::{DbPool, PoolError};
use super::schema::contacts;

/// Diesel-backed implementation of the [`ContactRepository`] port.
#[derive(Clone)]
pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ContactRepositoryError {
    map_pool_error(error, ContactRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ContactRepositoryError {
    map_diesel_error(
        error,
        ContactRepositoryError::query,
        ContactRepositoryError::connection,
    )
}

fn row_to_contact(row: ContactRow) -> Result<Contact, ContactRepositoryError> {
    let draft = ContactDraft::try_from_fields(ContactFields {
        first_name: &row.first_name,
        last_name: &row.last_name,
        email: &row.email,
        phone_number: &row.phone_number,
        birthday: row.birthday,
        additional_data: row.additional_data.as_deref(),
    })
    .map_err(|err| ContactRepositoryError::query(format!("stored contact is invalid: {err}")))?;
    Ok(Contact::new(
        ContactId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        draft,
        row.created_at,
        row.updated_at,
    ))
}

fn rows_to_contacts(rows: Vec<ContactRow>) -> Result<Vec<Contact>, ContactRepositoryError> {
    rows.into_iter().map(row_to_contact).collect()
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn changeset(draft: &ContactDraft, updated_at: DateTime<Utc>) -> ContactChangeset<'_> {
    ContactChangeset {
        first_name: draft.first_name(),
        last_name: draft.last_name(),
        email: draft.email(),
        phone_number: draft.phone_number(),
        birthday: draft.birthday(),
        additional_data: draft.additional_data(),
        updated_at,
    }
}

#[async_trait]
impl ContactRepository for DieselContactRepository {
    async fn insert(&self, contact: &Contact) -> Result<(), ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let fields = contact.fields();
        let row = NewContactRow {
            id: *contact.id().as_uuid(),
            user_id: *contact.owner().as_uuid(),
            first_name: fields.first_name(),
            last_name: fields.last_name(),
            email: fields.email(),
            phone_number: fields.phone_number(),
            birthday: fields.birthday(),
            additional_data: fields.additional_data(),
            created_at: contact.created_at(),
            updated_at: contact.updated_at(),
        };
        diesel::insert_into(contacts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn list(
        &self,
        owner: &UserId,
        page: Page,
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = contacts::table
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .order_by((contacts::created_at.asc(), contacts::id.asc()))
            .offset(i64::from(page.skip()))
            .limit(i64::from(page.limit()))
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_contacts(rows)
    }

    async fn list_all(&self, owner: &UserId) -> Result<Vec<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = contacts::table
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_contacts(rows)
    }

    async fn find(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        contacts::table
            .filter(contacts::id.eq(id.as_uuid()))
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .select(ContactRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_contact)
            .transpose()
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &ContactId,
        draft: &ContactDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(
            contacts::table
                .filter(contacts::id.eq(id.as_uuid()))
                .filter(contacts::user_id.eq(owner.as_uuid())),
        )
        .set(changeset(draft, updated_at))
        .returning(ContactRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?
        .map(row_to_contact)
        .transpose()
    }

    async fn delete(&self, owner: &UserId, id: &ContactId) -> Result<bool, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            contacts::table
                .filter(contacts::id.eq(id.as_uuid()))
                .filter(contacts::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn search(
        &self,
        owner: &UserId,
        needle: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let pattern = like_pattern(needle);
        let rows = contacts::table
            .filter(contacts::user_id.eq(owner.as_uuid()))
            .filter(
                contacts::first_name
                    .ilike(&pattern)
                    .or(contacts::last_name.ilike(&pattern))
                    .or(contacts::email.ilike(&pattern))
                    .or(contacts::phone_number.ilike(&pattern))
                    .or(contacts::additional_data.ilike(&pattern)),
            )
            .order_by((contacts::created_at.asc(), contacts::id.asc()))
            .offset(i64::from(page.skip()))
            .limit(i64::from(page.limit()))
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_contacts(rows)
    }
}
