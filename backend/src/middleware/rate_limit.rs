//! Fixed-window, per-client rate limiting.
//!
//! Each client address gets a budget of `max_requests` per `window`. The
//! window starts with the client's first request and resets once it has
//! elapsed. State lives in a single process-wide table, so the limiter must be
//! built once and cloned into every worker's `App`.
//!
//! Exhausted budgets are answered with `429 Too Many Requests`, a
//! `Retry-After` header and the standard error payload.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderValue, RETRY_AFTER};
use actix_web::{Error, ResponseError};
use chrono::{DateTime, TimeDelta, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::{Clock, DefaultClock};
use tracing::warn;

use crate::domain::Error as DomainError;

/// Tables larger than this are swept for expired windows on the next check.
const SWEEP_THRESHOLD: usize = 4096;
const UNKNOWN_CLIENT: &str = "unknown";

/// Budget applied to each client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    /// `max_requests` per minute.
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

struct Limiter {
    policy: RateLimitPolicy,
    window: TimeDelta,
    clock: Arc<dyn Clock>,
    clients: Mutex<HashMap<String, Window>>,
}

impl Limiter {
    fn check(&self, client: &str) -> Decision {
        let now = self.clock.utc();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if clients.len() > SWEEP_THRESHOLD {
            clients.retain(|_, window| now - window.started < self.window);
        }

        let window = clients.entry(client.to_owned()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now - window.started >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }
        if window.count >= self.policy.max_requests {
            let remaining = (window.started + self.window - now).num_seconds();
            return Decision::Limited {
                retry_after_secs: u64::try_from(remaining).unwrap_or(0).max(1),
            };
        }
        window.count += 1;
        Decision::Allowed
    }
}

/// Rate limiting middleware factory.
///
/// # Examples
/// ```
/// use actix_web::{App, HttpResponse, web};
/// use contacts_api::middleware::{RateLimit, RateLimitPolicy};
///
/// let limiter = RateLimit::new(RateLimitPolicy::per_minute(5));
/// let app = App::new().service(
///     web::resource("/me")
///         .wrap(limiter.clone())
///         .route(web::get().to(|| async { HttpResponse::Ok().finish() })),
/// );
/// ```
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<Limiter>,
}

impl RateLimit {
    /// Limiter driven by the system clock.
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(DefaultClock))
    }

    /// Limiter driven by an injected clock.
    pub fn with_clock(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        let window = TimeDelta::from_std(policy.window).unwrap_or(TimeDelta::MAX);
        Self {
            limiter: Arc::new(Limiter {
                policy,
                window,
                clock,
                clients: Mutex::new(HashMap::new()),
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<Limiter>,
}

fn client_key(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map_or_else(|| UNKNOWN_CLIENT.to_owned(), |addr| addr.ip().to_string())
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = client_key(&req);
        match self.limiter.check(&client) {
            Decision::Allowed => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Decision::Limited { retry_after_secs } => {
                warn!(%client, path = %req.path(), "rate limit exceeded");
                let policy = self.limiter.policy;
                let error = DomainError::too_many_requests(format!(
                    "rate limit exceeded: {} requests per {} seconds",
                    policy.max_requests,
                    policy.window.as_secs()
                ));
                let mut response = error.error_response();
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}
