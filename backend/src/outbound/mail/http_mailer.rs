//! Reqwest-backed confirmation mailer for Postmark-style HTTP APIs.
//!
//! The adapter owns transport details only: rendering the message body,
//! authenticating with the server token and mapping HTTP failures.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::domain::EmailAddress;
use crate::domain::ports::{ConfirmationEmail, ConfirmationMailer, MailerError};

const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";
const SUBJECT: &str = "Confirm your email";

/// Connection settings for the mail provider.
pub struct HttpMailerSettings {
    /// Provider base URL; messages are posted to `{base}/email`.
    pub base_url: Url,
    pub server_token: Zeroizing<String>,
    pub sender: EmailAddress,
    pub timeout: Duration,
}

impl fmt::Debug for HttpMailerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMailerSettings")
            .field("base_url", &self.base_url)
            .field("server_token", &"<redacted>")
            .field("sender", &self.sender)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone)]
pub struct HttpConfirmationMailer {
    client: Client,
    endpoint: Url,
    server_token: Zeroizing<String>,
    sender: EmailAddress,
}

impl HttpConfirmationMailer {
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot be derived or the reqwest
    /// client cannot be constructed.
    pub fn new(settings: HttpMailerSettings) -> Result<Self, MailerError> {
        let endpoint = settings
            .base_url
            .join("email")
            .map_err(|err| MailerError::transport(format!("invalid mail API url: {err}")))?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| MailerError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            server_token: settings.server_token,
            sender: settings.sender,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: String,
    text_body: String,
}

fn render_text(email: &ConfirmationEmail) -> String {
    format!(
        "Hi {username},\n\nThanks for signing up. Confirm your email address by opening:\n{link}\n",
        username = email.username,
        link = email.confirmation_link,
    )
}

fn render_html(email: &ConfirmationEmail) -> String {
    format!(
        "<p>Hi {username},</p><p>Thanks for signing up. \
         <a href=\"{link}\">Confirm your email address</a>.</p>",
        username = email.username,
        link = email.confirmation_link,
    )
}

fn map_transport_error(error: reqwest::Error) -> MailerError {
    MailerError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &str) -> MailerError {
    let preview: String = body.chars().take(160).collect();
    MailerError::rejected(status.as_u16(), preview)
}

#[async_trait]
impl ConfirmationMailer for HttpConfirmationMailer {
    async fn send_confirmation(&self, email: &ConfirmationEmail) -> Result<(), MailerError> {
        let request = SendEmailRequest {
            from: self.sender.as_ref(),
            to: email.recipient.as_ref(),
            subject: SUBJECT,
            html_body: render_html(email),
            text_body: render_text(email),
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(SERVER_TOKEN_HEADER, self.server_token.as_str())
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}
