//! Core types for the xhub resource store.
//!
//! Studies own trials and files; trials own files. This crate defines the
//! identity of those resources and how that identity is laid out in a flat,
//! lexicographically ordered keyspace. Nothing here performs I/O.
//!
//! # Modules
//!
//! - [`error`]: CoreError for malformed identities and keys
//! - [`keys`]: ResourcePath/Scope key encoding, decoding and prefix bounds
//! - [`model`]: the versioned JSON resource envelope

pub mod error;
pub mod keys;
pub mod model;

pub use error::CoreError;
pub use keys::{prefix_end, ResourcePath, Scope};
pub use model::{Resource, ResourceKind, RESOURCE_VERSION};
