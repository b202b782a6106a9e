//! Outbound mail delivery.

mod http_mailer;

pub use http_mailer::{HttpConfirmationMailer, HttpMailerSettings};
