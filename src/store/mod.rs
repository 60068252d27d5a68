//! Key-status stores and the facade over them.
//!
//! Two backings share one contract: a relational table of encoded keys
//! and an append-only log of mark/unmark records. [`Dones`] wraps
//! whichever backing it was built with, chosen at construction and never
//! switched.

pub mod db;
pub mod log;

use std::path::PathBuf;

use serde::Serialize;

use crate::db::ConnectionProvider;
use crate::encode::encode_key;
use crate::error::Result;

pub use db::{DbBackend, KeyStore};
pub use log::LogStore;

/// Capability set shared by both store backings. Keys arrive already in
/// their canonical encoding; [`Dones`] is the single encoding point, so
/// both backings see identical bytes for equal keys.
pub trait StatusBackend: Send + Sync {
    /// Mark a key as done. Marking twice is a no-op.
    fn mark(&self, encoded: &str) -> Result<()>;
    /// Mark a key as not done. Unmarking an unmarked key is a no-op.
    fn unmark(&self, encoded: &str) -> Result<()>;
    /// True iff the key is currently marked done.
    fn done(&self, encoded: &str) -> Result<bool>;
    /// Status of each key, in input order.
    fn are_done(&self, encoded: &[String]) -> Result<Vec<bool>>;
    /// Remove every done marker in the namespace.
    fn clear(&self) -> Result<()>;
}

impl StatusBackend for LogStore {
    fn mark(&self, encoded: &str) -> Result<()> {
        self.mark_encoded(encoded)
    }

    fn unmark(&self, encoded: &str) -> Result<()> {
        self.unmark_encoded(encoded)
    }

    fn done(&self, encoded: &str) -> Result<bool> {
        self.done_encoded(encoded)
    }

    fn are_done(&self, encoded: &[String]) -> Result<Vec<bool>> {
        self.are_done_encoded(encoded)
    }

    fn clear(&self) -> Result<()> {
        LogStore::clear(self)
    }
}

/// Tracks whether keys are "done" within one namespace.
///
/// Keys can be marked, unmarked, and checked; clearing unmarks everything
/// at once by dropping the namespace's persisted state. Any serializable
/// value is usable as a key.
pub struct Dones {
    backend: Box<dyn StatusBackend>,
}

impl std::fmt::Debug for Dones {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dones").finish_non_exhaustive()
    }
}

impl Dones {
    /// Wrap an already-built backend.
    pub fn with_backend(backend: Box<dyn StatusBackend>) -> Self {
        Self { backend }
    }

    /// Dones backed by a relational table named `ns`. The table is created
    /// lazily on first use.
    pub fn database(provider: ConnectionProvider, ns: &str) -> Result<Self> {
        let store = KeyStore::new(provider, ns)?;
        Ok(Self::with_backend(Box::new(DbBackend::new(store))))
    }

    /// Dones backed by an append-only log file at `path`.
    pub fn append_log(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(Box::new(LogStore::new(path)))
    }

    /// Mark a key as done.
    pub fn mark<K: Serialize + ?Sized>(&self, key: &K) -> Result<()> {
        self.backend.mark(&encode_key(key)?)
    }

    /// Mark a key as not done, so it is no longer "done".
    pub fn unmark<K: Serialize + ?Sized>(&self, key: &K) -> Result<()> {
        self.backend.unmark(&encode_key(key)?)
    }

    /// True iff `key` is marked done.
    pub fn done<K: Serialize + ?Sized>(&self, key: &K) -> Result<bool> {
        self.backend.done(&encode_key(key)?)
    }

    /// Status of each key, in input order, using the backend's batch path.
    pub fn are_done<K: Serialize>(&self, keys: &[K]) -> Result<Vec<bool>> {
        let encoded = keys.iter().map(encode_key).collect::<Result<Vec<_>>>()?;
        self.backend.are_done(&encoded)
    }

    /// True iff every key is done. Stops at the first key that is not.
    pub fn all_done<K: Serialize>(&self, keys: &[K]) -> Result<bool> {
        for key in keys {
            if !self.done(key)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True iff at least one key is done. Stops at the first key that is.
    pub fn any_done<K: Serialize>(&self, keys: &[K]) -> Result<bool> {
        for key in keys {
            if self.done(key)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Remove all existing done markers. Useful for resetting the dones
    /// or cleaning up when all done.
    pub fn clear(&self) -> Result<()> {
        self.backend.clear()
    }
}
