//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::middleware::RateLimitPolicy;
use crate::outbound::cache::RedisUserCache;
use crate::outbound::mail::HttpConfirmationMailer;
use crate::outbound::persistence::DbPool;
use crate::outbound::security::JwtCodec;

/// Budget for `GET /api/users/me`.
pub const CURRENT_USER_RATE_LIMIT: RateLimitPolicy = RateLimitPolicy::per_minute(5);

/// Builder-style configuration for creating the HTTP server.
///
/// Optional adapters fall back to their in-process counterparts: no pool
/// selects the in-memory repositories, no cache disables caching and no
/// mailer logs confirmation links instead of sending them.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cors_allowed_origin: String,
    pub(crate) public_base_url: Option<String>,
    pub(crate) tokens: Arc<JwtCodec>,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) user_cache: Option<RedisUserCache>,
    pub(crate) mailer: Option<HttpConfirmationMailer>,
    pub(crate) current_user_limit: RateLimitPolicy,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, tokens: JwtCodec) -> Self {
        Self {
            bind_addr,
            cors_allowed_origin: String::new(),
            public_base_url: None,
            tokens: Arc::new(tokens),
            db_pool: None,
            user_cache: None,
            mailer: None,
            current_user_limit: CURRENT_USER_RATE_LIMIT,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Serve cached users from Redis.
    #[must_use]
    pub fn with_user_cache(mut self, cache: RedisUserCache) -> Self {
        self.user_cache = Some(cache);
        self
    }

    /// Deliver confirmation emails through the HTTP mail API.
    #[must_use]
    pub fn with_mailer(mut self, mailer: HttpConfirmationMailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Allow browser calls from `origin`. Empty disables cross-origin access.
    #[must_use]
    pub fn with_cors_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_allowed_origin = origin.into();
        self
    }

    /// Origin placed in confirmation links instead of the request's `Host`.
    #[must_use]
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.public_base_url = Some(base_url.into());
        self
    }

    /// Override the current-user rate limit.
    #[must_use]
    pub fn with_current_user_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.current_user_limit = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
