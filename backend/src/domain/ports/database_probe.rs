//! Port used by the health checker to confirm the database answers queries.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    pub enum DatabaseProbeError {
        /// Could not obtain a connection.
        Connection { message: String } => "database connection failed: {message}",
        /// The probe query failed or returned an unexpected value.
        Query { message: String } => "database probe query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Run a trivial round-trip query.
    async fn ping(&self) -> Result<(), DatabaseProbeError>;
}

/// Probe for runs without a database; always healthy.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDatabaseProbe;

#[async_trait]
impl DatabaseProbe for FixtureDatabaseProbe {
    async fn ping(&self) -> Result<(), DatabaseProbeError> {
        Ok(())
    }
}
