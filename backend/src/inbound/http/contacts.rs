//! Contact endpoints. Every route requires a bearer token and only ever sees
//! the caller's own contacts.
//!
//! ```text
//! GET    /api/contacts?skip=0&limit=100
//! POST   /api/contacts
//! GET    /api/contacts/search?text=doe
//! POST   /api/contacts/upcoming-birthdays {"days":7}
//! GET    /api/contacts/{contact_id}
//! PUT    /api/contacts/{contact_id}
//! DELETE /api/contacts/{contact_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    BirthdayWindow, Contact, ContactDraft, ContactFields, Error, Page, contact_validation_error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    birthday_window_error, page_validation_error, parse_contact_id,
};

/// Create or full-replacement payload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "+380 93 123 4567")]
    pub phone_number: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub additional_data: Option<String>,
}

impl ContactRequest {
    fn to_draft(&self) -> Result<ContactDraft, Error> {
        ContactDraft::try_from_fields(ContactFields {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            phone_number: &self.phone_number,
            birthday: self.birthday,
            additional_data: self.additional_data.as_deref(),
        })
        .map_err(contact_validation_error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    pub additional_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Contact> for ContactResponse {
    fn from(contact: &Contact) -> Self {
        let fields = contact.fields();
        Self {
            id: *contact.id().as_uuid(),
            first_name: fields.first_name().to_owned(),
            last_name: fields.last_name().to_owned(),
            email: fields.email().to_owned(),
            phone_number: fields.phone_number().to_owned(),
            birthday: fields.birthday(),
            additional_data: fields.additional_data().map(str::to_owned),
            created_at: contact.created_at(),
            updated_at: contact.updated_at(),
        }
    }
}

fn respond(contacts: &[Contact]) -> web::Json<Vec<ContactResponse>> {
    web::Json(contacts.iter().map(ContactResponse::from).collect())
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Rows to skip (default 0).
    pub skip: Option<u32>,
    /// Page size, 1..=100 (default 100).
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive text matched against names, email, phone and notes.
    pub text: String,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct BirthdaysRequest {
    /// Look-ahead in days, 0..=365 (default 7).
    #[schema(example = 7)]
    pub days: Option<u16>,
}

fn page(skip: Option<u32>, limit: Option<u32>) -> Result<Page, Error> {
    Page::new(skip, limit).map_err(page_validation_error)
}

#[utoipa::path(
    get,
    path = "/api/contacts",
    params(PageQuery),
    responses(
        (status = 200, description = "Contacts in creation order", body = [ContactResponse]),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "listContacts",
    security(("bearer_auth" = []))
)]
#[get("/contacts")]
pub async fn list_contacts(
    state: web::Data<HttpState>,
    auth: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ContactResponse>>> {
    let page = page(query.skip, query.limit)?;
    let contacts = state.contacts_query.list(auth.user().id(), page).await?;
    Ok(respond(&contacts))
}

#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Contact created", body = ContactResponse),
        (status = 400, description = "Invalid contact", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "createContact",
    security(("bearer_auth" = []))
)]
#[post("/contacts")]
pub async fn create_contact(
    state: web::Data<HttpState>,
    auth: AuthenticatedUser,
    payload: web::Json<ContactRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.to_draft()?;
    let contact = state.contacts.create(auth.user().id(), draft).await?;
    Ok(HttpResponse::Created().json(ContactResponse::from(&contact)))
}

#[utoipa::path(
    get,
    path = "/api/contacts/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching contacts", body = [ContactResponse]),
        (status = 400, description = "Blank search text or invalid paging", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "searchContacts",
    security(("bearer_auth" = []))
)]
#[get("/contacts/search")]
pub async fn search_contacts(
    state: web::Data<HttpState>,
    auth: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<ContactResponse>>> {
    let page = page(query.skip, query.limit)?;
    let contacts = state
        .contacts_query
        .search(auth.user().id(), &query.text, page)
        .await?;
    Ok(respond(&contacts))
}

/// Contacts whose birthday falls within the next `days` days, soonest first.
#[utoipa::path(
    post,
    path = "/api/contacts/upcoming-birthdays",
    request_body = BirthdaysRequest,
    responses(
        (status = 200, description = "Contacts ordered by next birthday", body = [ContactResponse]),
        (status = 400, description = "Window out of range", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "upcomingBirthdays",
    security(("bearer_auth" = []))
)]
#[post("/contacts/upcoming-birthdays")]
pub async fn upcoming_birthdays(
    state: web::Data<HttpState>,
    auth: AuthenticatedUser,
    payload: Option<web::Json<BirthdaysRequest>>,
) -> ApiResult<web::Json<Vec<ContactResponse>>> {
    let window = match payload.and_then(|body| body.into_inner().days) {
        Some(days) => BirthdayWindow::new(days).map_err(birthday_window_error)?,
        None => BirthdayWindow::default(),
    };
    let contacts = state
        .contacts_query
        .upcoming_birthdays(auth.user().id(), window)
        .await?;
    Ok(respond(&contacts))
}

#[utoipa::path(
    get,
    path = "/api/contacts/{contact_id}",
    params(("contact_id" = Uuid, Path, description = "Contact identifier")),
    responses(
        (status = 200, description = "Contact", body = ContactResponse),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Contact not found", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "getContact",
    security(("bearer_auth" = []))
)]
#[get("/contacts/{contact_id}")]
pub async fn get_contact(
    state: web::Data<HttpState>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ContactResponse>> {
    let id = parse_contact_id(&path)?;
    let contact = state.contacts_query.get(auth.user().id(), &id).await?;
    Ok(web::Json(ContactResponse::from(&contact)))
}

#[utoipa::path(
    put,
    path = "/api/contacts/{contact_id}",
    params(("contact_id" = Uuid, Path, description = "Contact identifier")),
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Updated contact", body = ContactResponse),
        (status = 400, description = "Invalid contact", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Contact not found", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "updateContact",
    security(("bearer_auth" = []))
)]
#[put("/contacts/{contact_id}")]
pub async fn update_contact(
    state: web::Data<HttpState>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<web::Json<ContactResponse>> {
    let id = parse_contact_id(&path)?;
    let draft = payload.to_draft()?;
    let contact = state.contacts.update(auth.user().id(), &id, draft).await?;
    Ok(web::Json(ContactResponse::from(&contact)))
}

#[utoipa::path(
    delete,
    path = "/api/contacts/{contact_id}",
    params(("contact_id" = Uuid, Path, description = "Contact identifier")),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Contact not found", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "deleteContact",
    security(("bearer_auth" = []))
)]
#[delete("/contacts/{contact_id}")]
pub async fn delete_contact(
    state: web::Data<HttpState>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_contact_id(&path)?;
    state.contacts.delete(auth.user().id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "contacts_tests.rs"]
mod tests;
