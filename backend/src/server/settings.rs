//! Application settings loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `CONTACTS_*` environment variables and
//! an optional configuration file. Accessors validate and normalise the raw
//! values so startup fails before any adapter is built.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use jsonwebtoken::Algorithm;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::EmailAddress;
use crate::outbound::cache::RedisUserCacheSettings;
use crate::outbound::mail::HttpMailerSettings;
use crate::outbound::security::{JwtConfigError, JwtSettings, parse_hmac_algorithm};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_JWT_ALGORITHM: &str = "HS256";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8000";
const MAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Invalid or missing configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} is invalid: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Jwt(#[from] JwtConfigError),
}

impl SettingsError {
    fn invalid(field: &'static str, message: impl fmt::Display) -> Self {
        Self::Invalid {
            field,
            message: message.to_string(),
        }
    }
}

/// Raw configuration values for the contacts API.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CONTACTS")]
pub struct AppSettings {
    /// PostgreSQL connection URL. Required unless `in_memory` is set.
    pub database_url: Option<String>,
    /// HMAC secret used to sign JWTs.
    pub jwt_secret: Option<String>,
    /// `HS256`, `HS384` or `HS512`.
    pub jwt_algorithm: Option<String>,
    /// Access token lifetime.
    #[ortho_config(default = 3600)]
    pub jwt_expiration_seconds: i64,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Enables the Redis user cache when present.
    pub redis_url: Option<String>,
    #[ortho_config(default = 1800)]
    pub user_cache_ttl_seconds: u64,
    /// Mail provider base URL; the logging mailer is used when absent.
    pub mail_api_url: Option<String>,
    pub mail_api_token: Option<String>,
    pub mail_from: Option<String>,
    /// Origin allowed by the CORS policy.
    pub cors_allowed_origin: Option<String>,
    /// Public origin placed in confirmation links. The request's `Host`
    /// header is used when absent.
    pub public_base_url: Option<String>,
    /// Keep users and contacts in process memory instead of PostgreSQL.
    #[ortho_config(default = false)]
    pub in_memory: bool,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AppSettings")
            .field("database_url", &redact(&self.database_url))
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_seconds", &self.jwt_expiration_seconds)
            .field("bind_addr", &self.bind_addr)
            .field("redis_url", &redact(&self.redis_url))
            .field("user_cache_ttl_seconds", &self.user_cache_ttl_seconds)
            .field("mail_api_url", &self.mail_api_url)
            .field("mail_api_token", &redact(&self.mail_api_token))
            .field("mail_from", &self.mail_from)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("public_base_url", &self.public_base_url)
            .field("in_memory", &self.in_memory)
            .finish()
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

impl AppSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:8000`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        non_blank(self.bind_addr.as_ref())
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|err| SettingsError::invalid("bind_addr", err))
    }

    /// Database URL, or `None` when running in memory.
    pub fn database_url(&self) -> Result<Option<&str>, SettingsError> {
        if self.in_memory {
            return Ok(None);
        }
        non_blank(self.database_url.as_ref())
            .map(Some)
            .ok_or(SettingsError::Missing {
                field: "database_url",
            })
    }

    /// Validated JWT signing parameters.
    pub fn jwt_settings(&self) -> Result<JwtSettings, SettingsError> {
        let secret = non_blank(self.jwt_secret.as_ref()).ok_or(SettingsError::Missing {
            field: "jwt_secret",
        })?;
        let algorithm: Algorithm = parse_hmac_algorithm(
            non_blank(self.jwt_algorithm.as_ref()).unwrap_or(DEFAULT_JWT_ALGORITHM),
        )?;
        if self.jwt_expiration_seconds <= 0 {
            return Err(JwtConfigError::NonPositiveLifetime.into());
        }
        Ok(JwtSettings {
            secret: Zeroizing::new(secret.to_owned()),
            algorithm,
            access_ttl: TimeDelta::seconds(self.jwt_expiration_seconds),
        })
    }

    /// Redis cache settings when a URL is configured.
    pub fn user_cache_settings(&self) -> Result<Option<RedisUserCacheSettings>, SettingsError> {
        let Some(url) = non_blank(self.redis_url.as_ref()) else {
            return Ok(None);
        };
        if self.user_cache_ttl_seconds == 0 {
            return Err(SettingsError::invalid(
                "user_cache_ttl_seconds",
                "must be positive",
            ));
        }
        Ok(Some(RedisUserCacheSettings::new(
            url,
            Duration::from_secs(self.user_cache_ttl_seconds),
        )))
    }

    /// HTTP mailer settings when a mail API URL is configured.
    ///
    /// A configured URL requires both the server token and the sender.
    pub fn mailer_settings(&self) -> Result<Option<HttpMailerSettings>, SettingsError> {
        let Some(raw_url) = non_blank(self.mail_api_url.as_ref()) else {
            return Ok(None);
        };
        let base_url =
            Url::parse(raw_url).map_err(|err| SettingsError::invalid("mail_api_url", err))?;
        let token = non_blank(self.mail_api_token.as_ref()).ok_or(SettingsError::Missing {
            field: "mail_api_token",
        })?;
        let sender = non_blank(self.mail_from.as_ref())
            .ok_or(SettingsError::Missing { field: "mail_from" })?;
        let sender =
            EmailAddress::new(sender).map_err(|err| SettingsError::invalid("mail_from", err))?;
        Ok(Some(HttpMailerSettings {
            base_url,
            server_token: Zeroizing::new(token.to_owned()),
            sender,
            timeout: MAIL_TIMEOUT,
        }))
    }

    /// Validated public origin for emailed links, without a trailing slash.
    pub fn public_base_url(&self) -> Result<Option<String>, SettingsError> {
        let Some(raw) = non_blank(self.public_base_url.as_ref()) else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|err| SettingsError::invalid("public_base_url", err))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(SettingsError::invalid(
                "public_base_url",
                "must be an http or https URL with a host",
            ));
        }
        Ok(Some(url.as_str().trim_end_matches('/').to_owned()))
    }

    /// Origin allowed to call the API from a browser.
    pub fn cors_allowed_origin(&self) -> &str {
        non_blank(self.cors_allowed_origin.as_ref()).unwrap_or(DEFAULT_CORS_ORIGIN)
    }
}
