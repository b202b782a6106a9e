//! Driving port for registration, login and email confirmation.
//!
//! Inbound adapters call this port without knowing how credentials are
//! stored, hashed or signed, which keeps HTTP handler tests free of I/O.

use async_trait::async_trait;

use crate::domain::{
    AccessToken, ConfirmationOutcome, EmailAddress, Error, LoginCredentials, Registration, User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Create an unconfirmed account and email a confirmation link rooted at
    /// `base_url` (scheme and host of the incoming request).
    ///
    /// Fails with `Conflict` when the email or username is taken.
    async fn register(&self, registration: Registration, base_url: &str) -> Result<User, Error>;

    /// Exchange credentials for an access token.
    ///
    /// Fails with `Unauthorized` on unknown users, bad passwords and
    /// unconfirmed accounts alike.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;

    /// Re-send the confirmation email for an unconfirmed account.
    async fn request_confirmation(
        &self,
        email: &EmailAddress,
        base_url: &str,
    ) -> Result<ConfirmationOutcome, Error>;

    /// Redeem a confirmation token.
    ///
    /// Fails with `InvalidRequest` for bad, expired or mis-scoped tokens.
    async fn confirm_email(&self, token: &str) -> Result<ConfirmationOutcome, Error>;
}
