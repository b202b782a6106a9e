//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin translators between Diesel rows (`models.rs`,
//! `schema.rs`) and domain types. Connections come from a `bb8` pool driven
//! by `diesel-async`; all database failures are mapped into the port error
//! enums.
//!
//! # Example
//!
//! ```ignore
//! use contacts_api::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/contacts")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_contact_repository;
mod diesel_database_probe;
mod diesel_error_mapping;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_contact_repository::DieselContactRepository;
pub use diesel_database_probe::DieselDatabaseProbe;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
