//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    MockAuthCommand, MockContactsCommand, MockContactsQuery, MockCurrentUserResolver,
    MockDatabaseProbe, MockUserProfileCommand,
};
use crate::domain::{EmailAddress, User, UserId, Username};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Token the resolver stub accepts after [`TestPorts::authenticate_as`].
pub const VALID_TOKEN: &str = "valid-token";

pub const SAMPLE_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// A confirmed user with a fixed identifier.
pub fn sample_user() -> User {
    let created_at = Utc
        .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    User::new(
        UserId::from_uuid(Uuid::parse_str(SAMPLE_USER_ID).expect("fixture id")),
        Username::new("ada").expect("valid username"),
        EmailAddress::new("ada@example.com").expect("valid email"),
        created_at,
    )
    .with_confirmed(true)
}

/// Mocked driving ports. Unconfigured mocks panic when called.
#[derive(Default)]
pub struct TestPorts {
    pub auth: MockAuthCommand,
    pub current_user: MockCurrentUserResolver,
    pub profile: MockUserProfileCommand,
    pub contacts: MockContactsCommand,
    pub contacts_query: MockContactsQuery,
    pub database: MockDatabaseProbe,
}

impl TestPorts {
    /// Accept [`VALID_TOKEN`] as `user`; reject everything else with 401.
    pub fn authenticate_as(&mut self, user: User) {
        self.current_user.expect_resolve().returning(move |token| {
            if token == VALID_TOKEN {
                Ok(user.clone())
            } else {
                Err(crate::domain::Error::unauthorized(
                    "could not validate credentials",
                ))
            }
        });
    }

    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            auth: Arc::new(self.auth),
            current_user: Arc::new(self.current_user),
            profile: Arc::new(self.profile),
            contacts: Arc::new(self.contacts),
            contacts_query: Arc::new(self.contacts_query),
            database: Arc::new(self.database),
        }))
    }
}

/// `Authorization` header value carrying [`VALID_TOKEN`].
pub fn bearer_header() -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {VALID_TOKEN}"),
    )
}
