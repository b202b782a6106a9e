//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories used when no database is configured
//! - **cache**: Redis-backed look-through user cache
//! - **security**: Argon2 password hashing and JWT signing
//! - **mail**: HTTP transactional email delivery
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod mail;
pub mod memory;
pub mod persistence;
pub mod security;
