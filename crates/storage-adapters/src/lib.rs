//! # storage-adapters
//!
//! Relational implementations of the `domains` persistence ports.

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;
