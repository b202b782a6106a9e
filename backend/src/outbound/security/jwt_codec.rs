//! HMAC-signed JWT implementation of the `TokenCodec` port.
//!
//! Claims carry `sub`, `iat`, `exp` and a `scope`. Expiry is checked against
//! the injected clock rather than the system time so behaviour is
//! reproducible in tests.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::TokenScope;
use crate::domain::ports::{TokenClaims, TokenCodec, TokenError};

/// Email verification links stay valid for a week.
pub const EMAIL_VERIFICATION_TTL_DAYS: i64 = 7;

/// Construction failures for [`JwtCodec`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtConfigError {
    #[error("JWT secret must not be empty")]
    EmptySecret,
    #[error("unsupported JWT algorithm `{0}`; expected HS256, HS384 or HS512")]
    UnsupportedAlgorithm(String),
    #[error("access token lifetime must be positive")]
    NonPositiveLifetime,
}

/// Parse an HMAC algorithm name.
pub fn parse_hmac_algorithm(name: &str) -> Result<Algorithm, JwtConfigError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(JwtConfigError::UnsupportedAlgorithm(name.to_owned())),
    }
}

/// Signing parameters.
pub struct JwtSettings {
    pub secret: Zeroizing<String>,
    pub algorithm: Algorithm,
    pub access_ttl: TimeDelta,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    scope: TokenScope,
}

pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    access_ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtCodec {
    pub fn new(settings: JwtSettings, clock: Arc<dyn Clock>) -> Result<Self, JwtConfigError> {
        if settings.secret.is_empty() {
            return Err(JwtConfigError::EmptySecret);
        }
        if settings.access_ttl <= TimeDelta::zero() {
            return Err(JwtConfigError::NonPositiveLifetime);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            algorithm: settings.algorithm,
            access_ttl: settings.access_ttl,
            clock,
        })
    }

    fn ttl(&self, scope: TokenScope) -> TimeDelta {
        match scope {
            TokenScope::Access => self.access_ttl,
            TokenScope::EmailVerification => TimeDelta::days(EMAIL_VERIFICATION_TTL_DAYS),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| TokenError::invalid("timestamp out of range"))
}

impl TokenCodec for JwtCodec {
    fn issue(
        &self,
        subject: &str,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl(scope))
            .ok_or_else(|| TokenError::signing("expiry overflows"))?;
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            scope,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str, expected: TokenScope) -> Result<TokenClaims, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation()).map_err(|err| match err
                .kind()
            {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            })?;
        let claims = data.claims;
        let expires_at = timestamp(claims.exp)?;
        if expires_at <= self.clock.utc() {
            return Err(TokenError::expired());
        }
        if claims.scope != expected {
            return Err(TokenError::wrong_scope());
        }
        Ok(TokenClaims {
            subject: claims.sub,
            scope: claims.scope,
            issued_at: timestamp(claims.iat)?,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn settings(secret: &str) -> JwtSettings {
        JwtSettings {
            secret: Zeroizing::new(secret.to_owned()),
            algorithm: Algorithm::HS256,
            access_ttl: TimeDelta::seconds(3600),
        }
    }

    struct Harness {
        clock: Arc<MutableClock>,
        codec: JwtCodec,
    }

    #[fixture]
    fn harness() -> Harness {
        let clock = Arc::new(MutableClock::new(now()));
        let codec = JwtCodec::new(settings("test-secret"), clock.clone()).expect("codec");
        Harness { clock, codec }
    }

    #[rstest]
    fn access_token_round_trips_claims(harness: Harness) {
        let token = harness
            .codec
            .issue("user-1", TokenScope::Access, now())
            .expect("issue");
        let claims = harness
            .codec
            .verify(&token, TokenScope::Access)
            .expect("verify");
        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.issued_at, now());
        assert_eq!(claims.expires_at, now() + TimeDelta::seconds(3600));
    }

    #[rstest]
    fn access_token_expires_after_configured_lifetime(harness: Harness) {
        let token = harness
            .codec
            .issue("user-1", TokenScope::Access, now())
            .expect("issue");
        harness.clock.advance_seconds(3600);
        let error = harness
            .codec
            .verify(&token, TokenScope::Access)
            .expect_err("expired");
        assert_eq!(error, TokenError::expired());
    }

    #[rstest]
    fn verification_token_lives_for_a_week(harness: Harness) {
        let token = harness
            .codec
            .issue("ada@example.com", TokenScope::EmailVerification, now())
            .expect("issue");
        harness.clock.advance_days(6);
        harness
            .codec
            .verify(&token, TokenScope::EmailVerification)
            .expect("still valid");
        harness.clock.advance_days(1);
        let error = harness
            .codec
            .verify(&token, TokenScope::EmailVerification)
            .expect_err("expired");
        assert_eq!(error, TokenError::expired());
    }

    #[rstest]
    #[case(TokenScope::Access, TokenScope::EmailVerification)]
    #[case(TokenScope::EmailVerification, TokenScope::Access)]
    fn scopes_are_not_interchangeable(
        harness: Harness,
        #[case] minted: TokenScope,
        #[case] expected: TokenScope,
    ) {
        let token = harness
            .codec
            .issue("subject", minted, now())
            .expect("issue");
        let error = harness
            .codec
            .verify(&token, expected)
            .expect_err("wrong scope");
        assert_eq!(error, TokenError::wrong_scope());
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_rejected(harness: Harness) {
        let foreign = JwtCodec::new(settings("other-secret"), harness.clock.clone())
            .expect("codec")
            .issue("user-1", TokenScope::Access, now())
            .expect("issue");
        let error = harness
            .codec
            .verify(&foreign, TokenScope::Access)
            .expect_err("bad signature");
        assert!(matches!(error, TokenError::Invalid { .. }));
    }

    #[rstest]
    fn garbage_is_rejected(harness: Harness) {
        let error = harness
            .codec
            .verify("not.a.jwt", TokenScope::Access)
            .expect_err("garbage");
        assert!(matches!(error, TokenError::Invalid { .. }));
    }

    #[rstest]
    #[case("HS256", Ok(Algorithm::HS256))]
    #[case("hs384", Ok(Algorithm::HS384))]
    #[case("HS512", Ok(Algorithm::HS512))]
    #[case("RS256", Err(JwtConfigError::UnsupportedAlgorithm("RS256".to_owned())))]
    fn parses_hmac_algorithms(
        #[case] name: &str,
        #[case] expected: Result<Algorithm, JwtConfigError>,
    ) {
        assert_eq!(parse_hmac_algorithm(name), expected);
    }

    #[rstest]
    fn empty_secret_is_rejected() {
        let result = JwtCodec::new(settings(""), Arc::new(MutableClock::new(now())));
        assert!(matches!(result, Err(JwtConfigError::EmptySecret)));
    }
}
