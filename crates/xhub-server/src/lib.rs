//! HTTP/JSON API server for the xhub study/trial/file hierarchy.
//!
//! Exposes studies, trials and files as flat REST collections. Handlers are
//! thin: they turn a route into a `Scope` or `ResourcePath`, call the
//! [`ResourceRepository`](xhub_storage::ResourceRepository), and shape the
//! response. Key layout and cascading deletes live in `xhub-storage`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod state;
