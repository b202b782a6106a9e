//! Port for minting and checking signed, expiring tokens.

use chrono::{DateTime, Utc};

use crate::domain::TokenScope;

use super::define_port_error;

define_port_error! {
    /// Token failures. Callers map every variant except `Signing` to a client
    /// error.
    pub enum TokenError {
        /// Signature, encoding or claim structure was invalid.
        Invalid { message: String } => "token is invalid: {message}",
        /// The token's `exp` claim is in the past.
        Expired => "token has expired",
        /// The token was minted for a different purpose.
        WrongScope => "token scope does not match",
        /// The server could not sign a token.
        Signing { message: String } => "failed to sign token: {message}",
    }
}

/// Verified claims extracted from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// User id for access tokens, email address for verification tokens.
    pub subject: String,
    pub scope: TokenScope,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Encode and decode scoped tokens.
///
/// Lifetimes are the adapter's concern: it knows how long each scope lives.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a token for `subject` with the given scope, issued at `now`.
    fn issue(
        &self,
        subject: &str,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError>;

    /// Verify signature, expiry and scope.
    fn verify(&self, token: &str, expected: TokenScope) -> Result<TokenClaims, TokenError>;
}
