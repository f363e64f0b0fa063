//! SQLite implementation of [`OrderedStore`].
//!
//! [`SqliteStore`] keeps the whole keyspace in one `kv` table with BLOB keys.
//! SQLite compares BLOBs with `memcmp`, so `ORDER BY key` is the same
//! lexicographic byte order the in-memory backend uses, and a prefix scan is
//! the half-open range `[prefix, prefix_end(prefix))`.

use bytes::Bytes;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use xhub_core::prefix_end;

use crate::error::StorageResult;
use crate::traits::OrderedStore;
use crate::types::{KeyValue, WriteOp};

const UPSERT: &str =
    "INSERT INTO kv (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value";
const DELETE: &str = "DELETE FROM kv WHERE key = ?1";

/// SQLite-backed ordered store.
///
/// `rusqlite::Connection` is `Send` but not `Sync`; the mutex serializes all
/// calls on the single connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> StorageResult<Self> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> StorageResult<Self> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }
}

fn collect_rows(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> StorageResult<Vec<KeyValue>> {
    let rows = stmt.query_map(params, |row| {
        let key: Vec<u8> = row.get(0)?;
        let value: Vec<u8> = row.get(1)?;
        Ok(KeyValue::new(key, value))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

impl OrderedStore for SqliteStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        let conn = self.conn.lock();
        let value: Option<Vec<u8>> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value.map(Bytes::from))
    }

    fn put(&self, key: Vec<u8>, value: Bytes) -> StorageResult<()> {
        let conn = self.conn.lock();
        conn.execute(UPSERT, params![key, value.as_ref()])?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        let conn = self.conn.lock();
        conn.execute(DELETE, params![key])?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<KeyValue>> {
        let conn = self.conn.lock();
        match prefix_end(prefix) {
            Some(end) => {
                let mut stmt = conn.prepare_cached(
                    "SELECT key, value FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key",
                )?;
                collect_rows(&mut stmt, params![prefix, end])
            }
            None => {
                let mut stmt =
                    conn.prepare_cached("SELECT key, value FROM kv WHERE key >= ?1 ORDER BY key")?;
                collect_rows(&mut stmt, params![prefix])
            }
        }
    }

    fn write_batch(&self, ops: Vec<WriteOp>) -> StorageResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut upsert = tx.prepare_cached(UPSERT)?;
            let mut delete = tx.prepare_cached(DELETE)?;
            for op in &ops {
                match op {
                    WriteOp::Put { key, value } => {
                        upsert.execute(params![key, value.as_ref()])?;
                    }
                    WriteOp::Delete { key } => {
                        delete.execute(params![key])?;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
