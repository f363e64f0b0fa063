//! Resource repository over an [`OrderedStore`].
//!
//! [`ResourceRepository`] is the only component that knows how studies,
//! trials and files map onto keys. It holds no state besides the store handle
//! and its configuration, so clones can be used from any number of tasks.
//!
//! Writes come in two flavours selected by [`WriteMode`]:
//! - **BestEffort**: independent single-key writes. A study create writes the
//!   payload and then the creation index entry; a failure between the two
//!   leaves the payload without an index entry. A cascading delete attempts
//!   every delete even after one fails, reports the first failure, and never
//!   rolls back deletes that succeeded.
//! - **Atomic**: the key set of a create or a cascading delete is applied in
//!   one [`OrderedStore::write_batch`].
//!
//! In both modes a resource created under a subtree while that subtree is
//! being deleted may or may not be caught by the delete's scan.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, warn};
use xhub_core::model::{format_timestamp, parse_timestamp};
use xhub_core::{Resource, ResourcePath, Scope};

use crate::cascade::cascade_plan;
use crate::error::{StorageError, StorageResult};
use crate::traits::OrderedStore;
use crate::types::WriteOp;

/// Not a valid resource root; scans under it are always empty.
const HEALTH_PROBE_PREFIX: &[u8] = b"/health/";

/// How multi-key writes reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    BestEffort,
    Atomic,
}

/// Create/get/list/delete for every resource kind.
#[derive(Clone)]
pub struct ResourceRepository {
    store: Arc<dyn OrderedStore>,
    base_url: String,
    mode: WriteMode,
}

impl ResourceRepository {
    /// `base_url` is prepended to resource ids to form their URLs.
    pub fn new(store: Arc<dyn OrderedStore>, base_url: impl Into<String>) -> Self {
        ResourceRepository {
            store,
            base_url: base_url.into(),
            mode: WriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn write_mode(&self) -> WriteMode {
        self.mode
    }

    /// Round-trips the store with a scan over a range no resource lives in.
    pub fn check_health(&self) -> StorageResult<()> {
        self.store.scan_prefix(HEALTH_PROBE_PREFIX).map(|_| ())
    }

    /// Stores a client-supplied resource under its `id`.
    pub fn create(&self, resource: &Resource) -> StorageResult<Resource> {
        let path = ResourcePath::parse(&resource.id)?;
        self.put(&path, resource.payload.clone())
    }

    /// Writes `payload` under `path`, replacing any previous payload.
    ///
    /// Studies also get a fresh creation timestamp. Returns the envelope as a
    /// subsequent listing would show it.
    pub fn put(&self, path: &ResourcePath, payload: Bytes) -> StorageResult<Resource> {
        let key = path.encode()?;
        let Some(index_key) = path.creation_key()? else {
            debug!(id = %path, bytes = payload.len(), "put resource");
            self.store.put(key, payload.clone())?;
            return Ok(Resource::new(path, &self.base_url, payload, None));
        };

        let created = Utc::now();
        let stamp = Bytes::from(format_timestamp(&created));
        debug!(id = %path, bytes = payload.len(), mode = ?self.mode, "put top-level resource");
        match self.mode {
            WriteMode::BestEffort => {
                self.store.put(key, payload.clone())?;
                self.store.put(index_key, stamp)?;
            }
            WriteMode::Atomic => {
                self.store.write_batch(vec![
                    WriteOp::put(key, payload.clone()),
                    WriteOp::put(index_key, stamp),
                ])?;
            }
        }
        Ok(Resource::new(path, &self.base_url, payload, Some(created)))
    }

    /// The stored payload of `path`, or `None` when it does not exist.
    pub fn get(&self, path: &ResourcePath) -> StorageResult<Option<Bytes>> {
        let key = path.encode()?;
        let payload = self.store.get(&key)?;
        debug!(id = %path, found = payload.is_some(), "get resource");
        Ok(payload)
    }

    /// Every direct child of `scope`, in ascending id order.
    ///
    /// Keys nested deeper under the scope prefix (a trial's own subtree, for
    /// instance) are skipped. Studies carry their creation timestamp.
    pub fn list(&self, scope: &Scope) -> StorageResult<Vec<Resource>> {
        let prefix = scope.prefix()?;
        let entries = self.store.scan_prefix(&prefix)?;
        let top_level = scope.kind().is_top_level();

        let mut resources = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = match ResourcePath::decode(&entry.key) {
                Ok(path) if scope.contains(&path) => path,
                _ => continue,
            };
            let created = if top_level {
                self.created_at(&path)?
            } else {
                None
            };
            resources.push(Resource::new(&path, &self.base_url, entry.value, created));
        }
        debug!(scope = %scope, scanned_prefix = %String::from_utf8_lossy(&prefix), count = resources.len(), "list resources");
        Ok(resources)
    }

    fn created_at(&self, path: &ResourcePath) -> StorageResult<Option<chrono::DateTime<Utc>>> {
        let Some(index_key) = path.creation_key()? else {
            return Ok(None);
        };
        let Some(raw) = self.store.get(&index_key)? else {
            return Ok(None);
        };
        let parsed = std::str::from_utf8(&raw)
            .ok()
            .and_then(|text| parse_timestamp(text).ok());
        if parsed.is_none() {
            warn!(id = %path, "unreadable creation index entry");
        }
        Ok(parsed)
    }

    /// Deletes `path` and everything filed beneath it under any root.
    ///
    /// Deleting an absent resource succeeds.
    pub fn delete(&self, path: &ResourcePath) -> StorageResult<()> {
        let plan = cascade_plan(path)?;
        match self.mode {
            WriteMode::Atomic => {
                let mut ops: Vec<WriteOp> = plan.exact.into_iter().map(WriteOp::delete).collect();
                for prefix in &plan.prefixes {
                    for entry in self.store.scan_prefix(prefix)? {
                        ops.push(WriteOp::delete(entry.key.to_vec()));
                    }
                }
                debug!(id = %path, keys = ops.len(), "atomic cascade delete");
                self.store.write_batch(ops)
            }
            WriteMode::BestEffort => {
                let mut cascade = Cascade::new(path);
                for key in &plan.exact {
                    cascade.attempt(key, self.store.delete(key));
                }
                for prefix in &plan.prefixes {
                    match self.store.scan_prefix(prefix) {
                        Ok(entries) => {
                            for entry in entries {
                                cascade.attempt(&entry.key, self.store.delete(&entry.key));
                            }
                        }
                        Err(err) => cascade.attempt(prefix, Err(err)),
                    }
                }
                cascade.finish()
            }
        }
    }
}

/// Bookkeeping for a best-effort cascade: counts operations and keeps the
/// first failure.
struct Cascade {
    target: String,
    attempted: usize,
    failed: usize,
    first: Option<(String, StorageError)>,
}

impl Cascade {
    fn new(path: &ResourcePath) -> Self {
        Cascade {
            target: path.id(),
            attempted: 0,
            failed: 0,
            first: None,
        }
    }

    fn attempt(&mut self, key: &[u8], result: StorageResult<()>) {
        self.attempted += 1;
        if let Err(err) = result {
            let key = String::from_utf8_lossy(key).into_owned();
            warn!(target_id = %self.target, key = %key, error = %err, "cascade step failed");
            self.failed += 1;
            if self.first.is_none() {
                self.first = Some((key, err));
            }
        }
    }

    fn finish(self) -> StorageResult<()> {
        debug!(id = %self.target, attempted = self.attempted, failed = self.failed, "cascade delete");
        match self.first {
            None => Ok(()),
            Some((key, source)) => Err(StorageError::Cascade {
                target: self.target,
                key,
                failed: self.failed,
                attempted: self.attempted,
                source: Box::new(source),
            }),
        }
    }
}
