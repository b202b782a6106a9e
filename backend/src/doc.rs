//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (auth, users,
//!   contacts, utilities and health probes)
//! - **Schemas**: request and response DTOs plus the domain [`Error`] payload
//! - **Security**: HTTP bearer authentication for JWT access tokens
//!
//! The generated document is served by Swagger UI in debug builds.
//!
//! [`Error`]: crate::domain::Error

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AccessToken, Error, ErrorCode};
use crate::inbound::http::auth::{LoginForm, RegisterRequest, RequestEmail};
use crate::inbound::http::contacts::{BirthdaysRequest, ContactRequest, ContactResponse};
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::users::{AvatarRequest, UserResponse};

/// Name of the security scheme referenced by protected handlers.
pub const BEARER_SCHEME: &str = "bearer_auth";

/// Enrich the generated document with the JWT bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Contacts API",
        description = "Manage personal contacts behind JWT authentication with email confirmation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::request_email,
        crate::inbound::http::auth::confirmed_email,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_avatar,
        crate::inbound::http::contacts::list_contacts,
        crate::inbound::http::contacts::create_contact,
        crate::inbound::http::contacts::search_contacts,
        crate::inbound::http::contacts::upcoming_birthdays,
        crate::inbound::http::contacts::get_contact,
        crate::inbound::http::contacts::update_contact,
        crate::inbound::http::contacts::delete_contact,
        crate::inbound::http::health::healthchecker,
        crate::inbound::http::health::root,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        AccessToken,
        MessageResponse,
        RegisterRequest,
        LoginForm,
        RequestEmail,
        UserResponse,
        AvatarRequest,
        ContactRequest,
        ContactResponse,
        BirthdaysRequest,
    )),
    tags(
        (name = "auth", description = "Registration, login and email confirmation"),
        (name = "users", description = "The authenticated user's profile"),
        (name = "contacts", description = "Contacts owned by the authenticated user"),
        (name = "utils", description = "Welcome message and database health check"),
        (name = "health", description = "Endpoints for orchestration probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    fn schema(name: &str) -> RefOr<Schema> {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        components
            .schemas
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("{name} schema registered"))
    }

    #[rstest]
    #[case("Error", &["code", "message", "traceId", "details"])]
    #[case("UserResponse", &["id", "username", "email", "avatar", "confirmed", "createdAt"])]
    #[case("ContactResponse", &["id", "firstName", "lastName", "phoneNumber", "birthday"])]
    #[case("AccessToken", &["access_token", "token_type"])]
    fn schemas_expose_wire_field_names(#[case] name: &str, #[case] fields: &[&str]) {
        let schema = schema(name);
        for field in fields {
            assert_object_schema_has_field(&schema, field);
        }
    }

    #[rstest]
    #[case("/api/auth/register")]
    #[case("/api/auth/confirmed_email/{token}")]
    #[case("/api/contacts/{contact_id}")]
    #[case("/api/contacts/upcoming-birthdays")]
    #[case("/api/users/me")]
    #[case("/api/healthchecker")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
