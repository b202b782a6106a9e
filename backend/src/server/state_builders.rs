//! Builders for HTTP state ports and adapter-backed services.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    ConfirmationMailer, ContactRepository, ContactsCommand, ContactsQuery, DatabaseProbe,
    FixtureDatabaseProbe, LoggingConfirmationMailer, NoOpUserCache, PasswordHasher, TokenCodec,
    UserCache, UserRepository,
};
use crate::domain::{
    AuthService, AuthServicePorts, ContactsService, CurrentUserService, UserProfileService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryContactRepository, InMemoryUserRepository};
use crate::outbound::persistence::{
    DbPool, DieselContactRepository, DieselDatabaseProbe, DieselUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Pick the pool-backed adapter when a pool is available, otherwise the
/// in-process fallback.
fn select_adapter<Pool, Port>(
    pool: &Option<Pool>,
    make_adapter: impl FnOnce(&Pool) -> Arc<Port>,
    fallback: impl FnOnce() -> Arc<Port>,
) -> Arc<Port>
where
    Port: ?Sized,
{
    match pool {
        Some(pool) => make_adapter(pool),
        None => fallback(),
    }
}

/// Split one service into the command/query pair it implements.
fn build_service_pair<S, Cmd, Query>(
    service: S,
    cast: impl FnOnce(Arc<S>) -> (Arc<Cmd>, Arc<Query>),
) -> (Arc<Cmd>, Arc<Query>)
where
    S: 'static,
    Cmd: ?Sized + 'static,
    Query: ?Sized + 'static,
{
    cast(Arc::new(service))
}

/// Driven ports shared by every service.
struct DrivenPorts {
    users: Arc<dyn UserRepository>,
    contacts: Arc<dyn ContactRepository>,
    database: Arc<dyn DatabaseProbe>,
    cache: Arc<dyn UserCache>,
    mailer: Arc<dyn ConfirmationMailer>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

fn build_driven_ports(config: &ServerConfig) -> DrivenPorts {
    let pool: &Option<DbPool> = &config.db_pool;
    let users = select_adapter(
        pool,
        |pool| Arc::new(DieselUserRepository::new(pool.clone())) as Arc<dyn UserRepository>,
        || Arc::new(InMemoryUserRepository::new()),
    );
    let contacts = select_adapter(
        pool,
        |pool| Arc::new(DieselContactRepository::new(pool.clone())) as Arc<dyn ContactRepository>,
        || Arc::new(InMemoryContactRepository::new()),
    );
    let database = select_adapter(
        pool,
        |pool| Arc::new(DieselDatabaseProbe::new(pool.clone())) as Arc<dyn DatabaseProbe>,
        || Arc::new(FixtureDatabaseProbe),
    );
    let cache: Arc<dyn UserCache> = match &config.user_cache {
        Some(cache) => Arc::new(cache.clone()),
        None => Arc::new(NoOpUserCache),
    };
    let mailer: Arc<dyn ConfirmationMailer> = match &config.mailer {
        Some(mailer) => Arc::new(mailer.clone()),
        None => Arc::new(LoggingConfirmationMailer),
    };
    let tokens: Arc<dyn TokenCodec> = config.tokens.clone();

    DrivenPorts {
        users,
        contacts,
        database,
        cache,
        mailer,
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens,
    }
}

/// Build the shared HTTP state from the configured adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    build_http_state_with_clock(config, Arc::new(DefaultClock))
}

fn build_http_state_with_clock(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> web::Data<HttpState> {
    let ports = build_driven_ports(config);

    let auth = AuthService::new(
        AuthServicePorts {
            users: ports.users.clone(),
            hasher: ports.hasher,
            tokens: ports.tokens.clone(),
            mailer: ports.mailer,
            cache: ports.cache.clone(),
        },
        clock.clone(),
    );
    let current_user =
        CurrentUserService::new(ports.users.clone(), ports.tokens, ports.cache.clone());
    let profile = UserProfileService::new(ports.users, ports.cache);
    let (contacts, contacts_query) =
        build_service_pair(ContactsService::new(ports.contacts, clock), |service| {
            (
                service.clone() as Arc<dyn ContactsCommand>,
                service as Arc<dyn ContactsQuery>,
            )
        });

    let state = HttpState::new(HttpStatePorts {
        auth: Arc::new(auth),
        current_user: Arc::new(current_user),
        profile: Arc::new(profile),
        contacts,
        contacts_query,
        database: ports.database,
    })
    .with_public_base_url(config.public_base_url.clone());
    web::Data::new(state)
}
