//! Request types for the HTTP API.
//!
//! Responses reuse [`xhub_core::Resource`] directly.

use serde::Deserialize;
use serde_json::value::RawValue;

/// Body of every create request.
///
/// Clients post the full envelope; only `id` and `data` are read. The other
/// envelope fields (`version`, `resource`, `url`, `created`) are derived by
/// the server and ignored here.
#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    /// A full id such as `/studies/S1/trials/T1`, or a bare name (`T1`).
    pub id: String,
    /// Opaque JSON payload, kept byte for byte.
    pub data: Box<RawValue>,
}

impl CreateResourceRequest {
    pub fn payload(&self) -> bytes::Bytes {
        bytes::Bytes::copy_from_slice(self.data.get().as_bytes())
    }
}
