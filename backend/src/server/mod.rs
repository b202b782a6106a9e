//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::{CURRENT_USER_RATE_LIMIT, ServerConfig};
pub use settings::{AppSettings, SettingsError};

use state_builders::build_http_state;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::TRACE_ID_HEADER;
use crate::inbound::http::auth::{confirmed_email, login, register, request_email};
use crate::inbound::http::contacts::{
    create_contact, delete_contact, get_contact, list_contacts, search_contacts,
    upcoming_birthdays, update_contact,
};
use crate::inbound::http::health::{HealthState, healthchecker, live, ready, root};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{current_user, update_avatar};
use crate::inbound::http::validation::{form_config, json_config, path_config, query_config};
use crate::middleware::{RateLimit, Trace};

/// Everything a worker needs to assemble the application.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    /// Shared across workers so every worker sees the same client windows.
    pub current_user_limit: RateLimit,
    pub cors_allowed_origin: String,
}

impl AppDependencies {
    /// Build handler state and middleware from the server configuration.
    pub fn from_config(health_state: web::Data<HealthState>, config: &ServerConfig) -> Self {
        Self {
            health_state,
            http_state: build_http_state(config),
            current_user_limit: RateLimit::new(config.current_user_limit),
            cors_allowed_origin: config.cors_allowed_origin.clone(),
        }
    }
}

fn cors(allowed_origin: &str) -> Cors {
    let cors = Cors::default()
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([TRACE_ID_HEADER])
        .max_age(3600);
    if allowed_origin.is_empty() {
        cors
    } else {
        cors.allowed_origin(allowed_origin)
    }
}

/// Mount every route, middleware and extractor configuration.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        current_user_limit,
        cors_allowed_origin,
    } = deps;

    let api = web::scope("/api")
        .service(register)
        .service(login)
        .service(request_email)
        .service(confirmed_email)
        .service(
            web::resource("/users/me")
                .wrap(current_user_limit)
                .route(web::get().to(current_user)),
        )
        .service(update_avatar)
        .service(list_contacts)
        .service(create_contact)
        .service(search_contacts)
        .service(upcoming_birthdays)
        .service(get_contact)
        .service(update_contact)
        .service(delete_contact)
        .service(healthchecker);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(form_config())
        .app_data(path_config())
        .wrap(cors(&cors_allowed_origin))
        .wrap(Trace)
        .service(api)
        .service(root)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let deps = AppDependencies::from_config(health_state.clone(), &config);

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
