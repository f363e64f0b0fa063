//! Core error types for xhub-core.
//!
//! Every failure here is a caller mistake (a malformed identity or a key that
//! does not belong to the resource keyspace), never an I/O fault.

use thiserror::Error;

/// Errors produced while building or parsing resource identities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An id component cannot be placed in a key.
    #[error("invalid identity component '{component}': {reason}")]
    InvalidIdentity {
        component: String,
        reason: &'static str,
    },

    /// A byte string or id does not decode to any resource path.
    #[error("not a resource key: '{key}'")]
    InvalidKey { key: String },

    /// A resource id was supplied for a collection it does not belong to.
    #[error("'{id}' does not belong to {scope}")]
    ScopeMismatch { id: String, scope: String },
}
