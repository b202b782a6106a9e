//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuthCommand, ContactsCommand, ContactsQuery, CurrentUserResolver, DatabaseProbe,
    UserProfileCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthCommand>,
    pub current_user: Arc<dyn CurrentUserResolver>,
    pub profile: Arc<dyn UserProfileCommand>,
    pub contacts: Arc<dyn ContactsCommand>,
    pub contacts_query: Arc<dyn ContactsQuery>,
    pub database: Arc<dyn DatabaseProbe>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthCommand>,
    pub current_user: Arc<dyn CurrentUserResolver>,
    pub profile: Arc<dyn UserProfileCommand>,
    pub contacts: Arc<dyn ContactsCommand>,
    pub contacts_query: Arc<dyn ContactsQuery>,
    pub database: Arc<dyn DatabaseProbe>,
    /// Origin used in emailed links; the request's own origin when unset.
    pub public_base_url: Option<String>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            auth,
            current_user,
            profile,
            contacts,
            contacts_query,
            database,
        } = ports;
        Self {
            auth,
            current_user,
            profile,
            contacts,
            contacts_query,
            database,
            public_base_url: None,
        }
    }

    /// Build emailed links from `base_url` instead of the request origin.
    #[must_use]
    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url;
        self
    }
}
