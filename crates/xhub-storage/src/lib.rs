//! Ordered key-value storage and the resource repository for xhub.
//!
//! Provides the [`OrderedStore`] trait defining the byte-level contract that
//! every backend implements, the [`InMemoryStore`] and [`SqliteStore`]
//! backends, and the [`ResourceRepository`] that maps studies, trials and
//! files onto one shared ordered keyspace.
//!
//! # Architecture
//!
//! - **Store layer** (`OrderedStore`): point get/put/delete, ascending prefix
//!   scans and an atomic write batch. Knows nothing about resources.
//! - **Repository layer** (`ResourceRepository`): derives keys through
//!   `xhub_core::keys`, assembles envelopes, maintains the creation index and
//!   runs cascading deletes driven by the table in [`cascade`].
//!
//! # Modules
//!
//! - [`error`]: StorageError with all failure modes
//! - [`types`]: KeyValue and WriteOp
//! - [`traits`]: OrderedStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQLite migrations and connection setup
//! - [`sqlite`]: SqliteStore implementation
//! - [`cascade`]: which keys and prefixes a delete must cover
//! - [`repository`]: ResourceRepository

pub mod cascade;
pub mod error;
pub mod memory;
pub mod repository;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use cascade::{cascade_plan, CascadePlan};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStore;
pub use repository::{ResourceRepository, WriteMode};
pub use sqlite::SqliteStore;
pub use traits::OrderedStore;
pub use types::{KeyValue, WriteOp};
