//! The [`OrderedStore`] trait defining the byte-level storage contract.
//!
//! Keys and values are opaque bytes. Keys are ordered lexicographically, and
//! a prefix scan returns every key starting with the prefix in ascending
//! order. Backends are shared across request tasks, so every method takes
//! `&self` and implementations synchronize internally.

use bytes::Bytes;

use crate::error::StorageResult;
use crate::types::{KeyValue, WriteOp};

/// The storage contract consumed by the resource repository.
///
/// The trait is synchronous: both shipped backends complete every call
/// without awaiting I/O readiness, and handlers call it directly.
pub trait OrderedStore: Send + Sync {
    /// Point lookup. `Ok(None)` when the key is absent.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: Vec<u8>, value: Bytes) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &[u8]) -> StorageResult<()>;

    /// Every entry whose key starts with `prefix`, in ascending key order.
    /// Empty when nothing matches.
    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<KeyValue>>;

    /// Applies all operations or none of them.
    fn write_batch(&self, ops: Vec<WriteOp>) -> StorageResult<()>;
}
