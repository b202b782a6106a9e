//! Account lifecycle services: registration, login, email confirmation and
//! bearer-token resolution.
//!
//! Credentials never leave this module in clear text: passwords are hashed
//! through the [`PasswordHasher`] port and tokens are minted and checked
//! through the [`TokenCodec`] port.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::domain::ports::{
    AuthCommand, ConfirmationEmail, ConfirmationMailer, CurrentUserResolver, PasswordHashError,
    PasswordHasher, StoredUser, TokenCodec, TokenError, UserCache, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    AccessToken, AvatarUrl, ConfirmationOutcome, EmailAddress, Error, LoginCredentials,
    Registration, TokenScope, User, UserId, Username,
};

const GRAVATAR_BASE: &str = "https://www.gravatar.com/avatar";
const INVALID_CREDENTIALS: &str = "invalid username or password";
const INVALID_BEARER: &str = "could not validate credentials";

/// Build the Gravatar identicon URL for a normalised email address.
///
/// # Examples
/// ```
/// use contacts_api::domain::{EmailAddress, gravatar_url};
///
/// let email = EmailAddress::new("Ada@Example.com").expect("valid email");
/// let url = gravatar_url(&email).expect("valid url");
/// assert!(url.as_ref().starts_with("https://www.gravatar.com/avatar/"));
/// assert!(url.as_ref().ends_with("?d=identicon"));
/// ```
pub fn gravatar_url(email: &EmailAddress) -> Result<AvatarUrl, Error> {
    let digest = Sha256::digest(email.as_ref().as_bytes());
    AvatarUrl::new(format!(
        "{GRAVATAR_BASE}/{}?d=identicon",
        hex::encode(digest)
    ))
    .map_err(|err| Error::internal(format!("failed to build gravatar url: {err}")))
}

/// Map user repository failures onto domain errors.
pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::conflict(format!("user with this {field} already exists"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn map_signing_error(error: TokenError) -> Error {
    Error::internal(format!("token issuance failed: {error}"))
}

fn confirmation_link(base_url: &str, token: &str) -> String {
    format!(
        "{}/api/auth/confirmed_email/{token}",
        base_url.trim_end_matches('/')
    )
}

/// Driven ports the [`AuthService`] orchestrates.
pub struct AuthServicePorts<U: ?Sized, H: ?Sized, T: ?Sized, M: ?Sized, C: ?Sized> {
    pub users: Arc<U>,
    pub hasher: Arc<H>,
    pub tokens: Arc<T>,
    pub mailer: Arc<M>,
    pub cache: Arc<C>,
}

/// Registration, login and email confirmation.
pub struct AuthService<U: ?Sized, H: ?Sized, T: ?Sized, M: ?Sized, C: ?Sized> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    mailer: Arc<M>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<U: ?Sized, H: ?Sized, T: ?Sized, M: ?Sized, C: ?Sized> Clone for AuthService<U, H, T, M, C> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
            tokens: Arc::clone(&self.tokens),
            mailer: Arc::clone(&self.mailer),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U: ?Sized, H: ?Sized, T: ?Sized, M: ?Sized, C: ?Sized> AuthService<U, H, T, M, C> {
    pub fn new(ports: AuthServicePorts<U, H, T, M, C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: ports.users,
            hasher: ports.hasher,
            tokens: ports.tokens,
            mailer: ports.mailer,
            cache: ports.cache,
            clock,
        }
    }
}

impl<U: ?Sized, H: ?Sized, T: ?Sized, M: ?Sized, C: ?Sized> AuthService<U, H, T, M, C>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenCodec,
    M: ConfirmationMailer,
    C: UserCache,
{
    /// Mint a verification token and mail the link. Failures are logged, not
    /// returned.
    async fn send_confirmation(&self, email: &EmailAddress, username: &Username, base_url: &str) {
        let token = match self.tokens.issue(
            email.as_ref(),
            TokenScope::EmailVerification,
            self.clock.utc(),
        ) {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "failed to mint email verification token");
                return;
            }
        };
        let message = ConfirmationEmail {
            recipient: email.clone(),
            username: username.clone(),
            confirmation_link: confirmation_link(base_url, &token),
        };
        if let Err(error) = self.mailer.send_confirmation(&message).await {
            warn!(%error, recipient = %email, "failed to send confirmation email");
        }
    }

    async fn ensure_available(&self, registration: &Registration) -> Result<(), Error> {
        if self
            .users
            .find_by_email(registration.email())
            .await
            .map_err(map_user_persistence_error)?
            .is_some()
        {
            return Err(Error::conflict("account already exists"));
        }
        if self
            .users
            .username_exists(registration.username())
            .await
            .map_err(map_user_persistence_error)?
        {
            return Err(Error::conflict("username already taken"));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: ?Sized, H: ?Sized, T: ?Sized, M: ?Sized, C: ?Sized> AuthCommand
    for AuthService<U, H, T, M, C>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenCodec,
    M: ConfirmationMailer,
    C: UserCache,
{
    async fn register(&self, registration: Registration, base_url: &str) -> Result<User, Error> {
        self.ensure_available(&registration).await?;

        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hash_error)?;
        let avatar = gravatar_url(registration.email())?;
        let user = User::new(
            UserId::random(),
            registration.username().clone(),
            registration.email().clone(),
            self.clock.utc(),
        )
        .with_avatar(Some(avatar));

        self.users
            .insert(&StoredUser {
                user: user.clone(),
                password_hash,
            })
            .await
            .map_err(map_user_persistence_error)?;
        debug!(user_id = %user.id(), "registered user");

        self.send_confirmation(user.email(), user.username(), base_url)
            .await;
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        let Some(stored) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_persistence_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        if !stored.user.is_confirmed() {
            return Err(Error::unauthorized("email not confirmed"));
        }

        let token = self
            .tokens
            .issue(
                &stored.user.id().to_string(),
                TokenScope::Access,
                self.clock.utc(),
            )
            .map_err(map_signing_error)?;
        Ok(AccessToken::bearer(token))
    }

    async fn request_confirmation(
        &self,
        email: &EmailAddress,
        base_url: &str,
    ) -> Result<ConfirmationOutcome, Error> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_persistence_error)?;
        match user {
            Some(user) if user.is_confirmed() => Ok(ConfirmationOutcome::AlreadyConfirmed),
            Some(user) => {
                self.send_confirmation(user.email(), user.username(), base_url)
                    .await;
                Ok(ConfirmationOutcome::EmailSent)
            }
            None => {
                debug!("confirmation requested for unknown address");
                Ok(ConfirmationOutcome::EmailSent)
            }
        }
    }

    async fn confirm_email(&self, token: &str) -> Result<ConfirmationOutcome, Error> {
        let claims = self
            .tokens
            .verify(token, TokenScope::EmailVerification)
            .map_err(|error| match error {
                signing @ TokenError::Signing { .. } => map_signing_error(signing),
                other => {
                    debug!(error = %other, "rejected email verification token");
                    Error::invalid_request("invalid token for email verification")
                }
            })?;
        let email = EmailAddress::new(claims.subject)
            .map_err(|_| Error::invalid_request("invalid token for email verification"))?;

        let Some(user) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?
        else {
            return Err(Error::invalid_request("verification error"));
        };
        if user.is_confirmed() {
            return Ok(ConfirmationOutcome::AlreadyConfirmed);
        }

        let changed = self
            .users
            .mark_confirmed(&email)
            .await
            .map_err(map_user_persistence_error)?;
        if !changed {
            return Ok(ConfirmationOutcome::AlreadyConfirmed);
        }
        if let Err(error) = self.cache.invalidate(user.id()).await {
            warn!(%error, user_id = %user.id(), "failed to invalidate cached user");
        }
        Ok(ConfirmationOutcome::Confirmed)
    }
}

/// Resolves bearer tokens through the look-through user cache.
pub struct CurrentUserService<U: ?Sized, T: ?Sized, C: ?Sized> {
    users: Arc<U>,
    tokens: Arc<T>,
    cache: Arc<C>,
}

impl<U: ?Sized, T: ?Sized, C: ?Sized> Clone for CurrentUserService<U, T, C> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tokens: Arc::clone(&self.tokens),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<U: ?Sized, T: ?Sized, C: ?Sized> CurrentUserService<U, T, C> {
    pub fn new(users: Arc<U>, tokens: Arc<T>, cache: Arc<C>) -> Self {
        Self {
            users,
            tokens,
            cache,
        }
    }
}

#[async_trait]
impl<U: ?Sized, T: ?Sized, C: ?Sized> CurrentUserResolver for CurrentUserService<U, T, C>
where
    U: UserRepository,
    T: TokenCodec,
    C: UserCache,
{
    async fn resolve(&self, bearer_token: &str) -> Result<User, Error> {
        let claims = self
            .tokens
            .verify(bearer_token, TokenScope::Access)
            .map_err(|error| {
                debug!(%error, "rejected bearer token");
                Error::unauthorized(INVALID_BEARER)
            })?;
        let user_id =
            UserId::new(&claims.subject).map_err(|_| Error::unauthorized(INVALID_BEARER))?;

        match self.cache.get(&user_id).await {
            Ok(Some(user)) => return Ok(user),
            Ok(None) => {}
            Err(error) => warn!(%error, %user_id, "user cache read failed"),
        }

        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_BEARER))?;
        if let Err(error) = self.cache.put(&user).await {
            warn!(%error, %user_id, "user cache write failed");
        }
        Ok(user)
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
