//! In-process adapters used when no database is configured.
//!
//! They honour the same constraints as the Diesel repositories (unique email
//! and username, owner-scoped contacts, creation ordering) so the HTTP surface
//! behaves identically during local development and in integration tests.

mod contact_repository;
mod user_repository;

pub use contact_repository::InMemoryContactRepository;
pub use user_repository::InMemoryUserRepository;
