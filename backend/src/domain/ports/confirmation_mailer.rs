//! Port for delivering account confirmation emails.

use async_trait::async_trait;
use tracing::info;

use crate::domain::{EmailAddress, Username};

use super::define_port_error;

define_port_error! {
    /// Delivery failures. Registration logs these rather than failing.
    pub enum MailerError {
        /// The mail provider could not be reached.
        Transport { message: String } => "mail transport failed: {message}",
        /// The provider answered but refused the message.
        Rejected { status: u16, message: String } => "mail provider rejected message ({status}): {message}",
    }
}

/// A confirmation message ready to be rendered and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationEmail {
    pub recipient: EmailAddress,
    pub username: Username,
    /// Absolute link the recipient follows to confirm.
    pub confirmation_link: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send_confirmation(&self, email: &ConfirmationEmail) -> Result<(), MailerError>;
}

/// Mailer used when no provider is configured: records the link in the log so
/// local users can still confirm their account.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingConfirmationMailer;

#[async_trait]
impl ConfirmationMailer for LoggingConfirmationMailer {
    async fn send_confirmation(&self, email: &ConfirmationEmail) -> Result<(), MailerError> {
        info!(
            recipient = %email.recipient,
            username = %email.username,
            link = %email.confirmation_link,
            "mail provider not configured; confirmation link logged instead"
        );
        Ok(())
    }
}
