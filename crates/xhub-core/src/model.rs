//! The versioned resource envelope exchanged with clients.
//!
//! A [`Resource`] is a plain value: identity, derived URL, opaque payload and
//! an optional creation timestamp. The payload is carried as raw JSON text so
//! the bytes a client posted are the bytes stored and the bytes served back.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::ResourcePath;

/// Schema version tag written into every envelope.
pub const RESOURCE_VERSION: &str = "1";

/// The kinds of resource in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Study,
    Trial,
    File,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Study => "study",
            ResourceKind::Trial => "trial",
            ResourceKind::File => "file",
        }
    }

    /// Top-level resources carry a creation timestamp in the creation index.
    pub fn is_top_level(&self) -> bool {
        matches!(self, ResourceKind::Study)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored resource as presented to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(rename = "resource")]
    pub kind: ResourceKind,
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "data", with = "raw_payload")]
    pub payload: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
}

fn default_version() -> String {
    RESOURCE_VERSION.to_string()
}

impl Resource {
    /// Builds the envelope for `path`; the URL is `base_url` followed by the id.
    pub fn new(
        path: &ResourcePath,
        base_url: &str,
        payload: Bytes,
        created: Option<DateTime<Utc>>,
    ) -> Self {
        let id = path.id();
        Resource {
            version: RESOURCE_VERSION.to_string(),
            kind: path.kind(),
            url: format!("{}{}", base_url.trim_end_matches('/'), id),
            id,
            payload,
            created,
        }
    }
}

/// Renders a timestamp the way the creation index stores it.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses a creation index value.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc))
}

/// Serializes payload bytes as embedded raw JSON.
mod raw_payload {
    use bytes::Bytes;
    use serde::de::Deserializer;
    use serde::ser::{Error, Serializer};
    use serde::{Deserialize, Serialize};
    use serde_json::value::RawValue;

    pub fn serialize<S: Serializer>(payload: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        let text = std::str::from_utf8(payload).map_err(S::Error::custom)?;
        let raw = RawValue::from_string(text.to_owned()).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Bytes::copy_from_slice(raw.get().as_bytes()))
    }
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::de::{Deserializer, Error};
    use serde::ser::Serializer;
    use serde::Deserialize;

    pub fn serialize<S: Serializer>(
        at: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => serializer.serialize_str(&super::format_timestamp(at)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse_timestamp(&raw).map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
