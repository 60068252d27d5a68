//! Append-log key store.
//!
//! Marks are persisted by appending `DONE <key>` / `UNDONE <key>` lines to
//! a flat UTF-8 file; the file is the namespace. Reading reconstructs a
//! key's status by scanning every line in order, last write wins, so
//! checking N keys against a file of M marks costs O(N*M). That is fine
//! for thousands of marks, not millions. Writing is a constant-time
//! append.
//!
//! Concurrent appenders are safe as long as each append is a single
//! flushed write, which is how [`LogStore`] writes. Reading while another
//! process writes has no isolation guarantee: a reader may observe a
//! partial or stale view. That trade-off is accepted here; use the
//! relational store when it matters.
//!
//! Useful when setting up a database is not worth it, or when the done
//! markers should live next to the data files they describe.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::encode::encode_key;
use crate::error::Result;

const DONE_PREFIX: &str = "DONE ";
const UNDONE_PREFIX: &str = "UNDONE ";

/// Key store backed by an append-only file of mark/unmark records.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    /// `path` is where the marks are stored; it doubles as the namespace.
    /// The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mark a key as done.
    pub fn mark<K: Serialize + ?Sized>(&self, key: &K) -> Result<()> {
        self.mark_encoded(&encode_key(key)?)
    }

    /// Mark a key as not done. Unmarking a key that was never marked is a
    /// no-op.
    pub fn unmark<K: Serialize + ?Sized>(&self, key: &K) -> Result<()> {
        self.unmark_encoded(&encode_key(key)?)
    }

    /// True iff the last record for this key is a mark.
    pub fn done<K: Serialize + ?Sized>(&self, key: &K) -> Result<bool> {
        self.done_encoded(&encode_key(key)?)
    }

    /// Status of each key, in input order, from a single pass over the
    /// file. Cheaper than calling [`LogStore::done`] per key once there is
    /// more than one key to check.
    pub fn are_done<K: Serialize>(&self, keys: &[K]) -> Result<Vec<bool>> {
        let encoded = keys.iter().map(encode_key).collect::<Result<Vec<_>>>()?;
        self.are_done_encoded(&encoded)
    }

    /// Remove every done marker by deleting the backing file.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            debug!("removing done log {:?}", self.path);
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Not implemented. Would rewrite the file dropping records superseded
    /// by a later unmark. Kept as a declared no-op until the rewrite
    /// semantics are worth pinning down.
    pub fn compact(&self) -> Result<()> {
        Ok(())
    }

    pub(crate) fn mark_encoded(&self, encoded: &str) -> Result<()> {
        self.persist(&done_line(encoded))
    }

    pub(crate) fn unmark_encoded(&self, encoded: &str) -> Result<()> {
        self.persist(&undone_line(encoded))
    }

    pub(crate) fn done_encoded(&self, encoded: &str) -> Result<bool> {
        // Key is not done: the file does not even exist yet.
        if !self.path.exists() {
            return Ok(false);
        }

        // `lines()` strips the terminator, so compare without it.
        let done = format!("{DONE_PREFIX}{encoded}");
        let undone = format!("{UNDONE_PREFIX}{encoded}");

        let mut is_done = false;
        let reader = BufReader::new(File::open(&self.path)?);
        for line in reader.lines() {
            let line = line?;
            if line == done {
                is_done = true;
            } else if line == undone {
                is_done = false;
            }
        }
        Ok(is_done)
    }

    pub(crate) fn are_done_encoded(&self, encoded: &[String]) -> Result<Vec<bool>> {
        if !self.path.exists() {
            return Ok(vec![false; encoded.len()]);
        }

        let requested: HashSet<&str> = encoded.iter().map(String::as_str).collect();
        let mut status: HashMap<String, bool> = HashMap::new();

        let reader = BufReader::new(File::open(&self.path)?);
        for line in reader.lines() {
            let line = line?;
            if let Some(rest) = line.strip_prefix(DONE_PREFIX) {
                if requested.contains(rest) {
                    status.insert(rest.to_string(), true);
                }
            } else if let Some(rest) = line.strip_prefix(UNDONE_PREFIX) {
                if requested.contains(rest) {
                    status.insert(rest.to_string(), false);
                }
            }
        }

        Ok(encoded
            .iter()
            .map(|key| status.get(key.as_str()).copied().unwrap_or(false))
            .collect())
    }

    /// Append one record as a single flushed write, so concurrent
    /// appenders interleave whole lines and a fresh reader sees the
    /// record immediately.
    fn persist(&self, record: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

fn done_line(encoded: &str) -> String {
    format!("{DONE_PREFIX}{encoded}\n")
}

fn undone_line(encoded: &str) -> String {
    format!("{UNDONE_PREFIX}{encoded}\n")
}
