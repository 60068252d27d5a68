//! Relational key store.
//!
//! One table per namespace, one row per encoded key. Every operation
//! opens its own connection, runs a single statement (inside a
//! transaction for writes), and drops the connection on exit, so no locks
//! are held between calls. The `name` uniqueness constraint plus
//! insert-or-ignore makes concurrent identical adds safe: no duplicate
//! rows, no error.

use parking_lot::Mutex;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::debug;

use crate::db::{with_transaction, ConnectionProvider, TxBehavior};
use crate::encode::encode_key;
use crate::error::{DonesError, Result};
use crate::store::StatusBackend;

/// Key store backed by a relational table of encoded keys.
///
/// Call [`KeyStore::create`] before first use of a namespace and
/// [`KeyStore::drop_table`] when done with it; [`DbBackend`] does both
/// transparently.
#[derive(Debug, Clone)]
pub struct KeyStore {
    provider: ConnectionProvider,
    table: String,
    tx: TxBehavior,
}

impl KeyStore {
    /// `table` is the namespace of the keys and must be a valid SQL
    /// identifier; anything else is rejected up front since identifiers
    /// cannot be bound as statement parameters.
    pub fn new(provider: ConnectionProvider, table: &str) -> Result<Self> {
        validate_identifier(table)?;
        Ok(Self {
            provider,
            table: table.to_string(),
            tx: TxBehavior::sqlite(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the backing table if it does not exist yet. Idempotent.
    pub fn create(&self) -> Result<()> {
        let table_sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT NOT NULL UNIQUE,
                 create_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
             )",
            table = self.table
        );
        let index_sql = format!(
            "CREATE INDEX IF NOT EXISTS {table}_name_index ON {table} (name)",
            table = self.table
        );

        debug!("ensuring table {} exists", self.table);
        let conn = self.provider.connection()?;
        with_transaction(&conn, &self.tx, |conn| {
            conn.execute_batch(&table_sql)?;
            conn.execute_batch(&index_sql)?;
            Ok(())
        })
    }

    /// Drop the backing table if it exists. Idempotent.
    pub fn drop_table(&self) -> Result<()> {
        debug!("dropping table {}", self.table);
        let conn = self.provider.connection()?;
        with_transaction(&conn, &self.tx, |conn| {
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", self.table))?;
            Ok(())
        })
    }

    /// Drop and recreate the backing table.
    pub fn reset(&self) -> Result<()> {
        self.drop_table()?;
        self.create()
    }

    /// True iff `key` is in the namespace.
    pub fn exists<K: Serialize + ?Sized>(&self, key: &K) -> Result<bool> {
        self.exists_encoded(&encode_key(key)?)
    }

    /// Add `key` to the namespace. Returns the new row id, or `None` when
    /// the key was already present; adding twice is a no-op, not an error.
    pub fn add<K: Serialize + ?Sized>(&self, key: &K) -> Result<Option<i64>> {
        self.add_encoded(&encode_key(key)?)
    }

    /// Remove `key` from the namespace, returning the number of rows
    /// removed. Removing an absent key is a no-op, not an error.
    pub fn remove<K: Serialize + ?Sized>(&self, key: &K) -> Result<usize> {
        self.remove_encoded(&encode_key(key)?)
    }

    pub(crate) fn exists_encoded(&self, encoded: &str) -> Result<bool> {
        let conn = self.provider.connection()?;
        let sql = format!("SELECT id FROM {} WHERE name = ?1", self.table);
        let id: Option<i64> = conn
            .query_row(&sql, params![encoded], |row| row.get(0))
            .optional()?;
        Ok(id.is_some())
    }

    pub(crate) fn add_encoded(&self, encoded: &str) -> Result<Option<i64>> {
        let conn = self.provider.connection()?;
        with_transaction(&conn, &self.tx, |conn| {
            let sql = format!("INSERT OR IGNORE INTO {} (name) VALUES (?1)", self.table);
            let inserted = conn.execute(&sql, params![encoded])?;
            if inserted == 0 {
                Ok(None)
            } else {
                Ok(Some(conn.last_insert_rowid()))
            }
        })
    }

    pub(crate) fn remove_encoded(&self, encoded: &str) -> Result<usize> {
        let conn = self.provider.connection()?;
        with_transaction(&conn, &self.tx, |conn| {
            let sql = format!("DELETE FROM {} WHERE name = ?1", self.table);
            Ok(conn.execute(&sql, params![encoded])?)
        })
    }
}

fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DonesError::InvalidNamespace(format!(
            "'{name}' is not usable as a table name"
        )))
    }
}

/// Relational [`StatusBackend`]: a [`KeyStore`] plus lazy schema
/// readiness.
///
/// The table is created on the first operation, not at construction;
/// after [`StatusBackend::clear`] the next operation recreates it.
#[derive(Debug)]
pub struct DbBackend {
    store: KeyStore,
    ready: Mutex<bool>,
}

impl DbBackend {
    pub fn new(store: KeyStore) -> Self {
        Self {
            store,
            ready: Mutex::new(false),
        }
    }

    /// The store, with its schema guaranteed to exist. The flag only
    /// caches schema existence in memory; creation itself is idempotent,
    /// so racing processes are harmless.
    fn store(&self) -> Result<&KeyStore> {
        let mut ready = self.ready.lock();
        if !*ready {
            self.store.create()?;
            *ready = true;
        }
        Ok(&self.store)
    }
}

impl StatusBackend for DbBackend {
    fn mark(&self, encoded: &str) -> Result<()> {
        self.store()?.add_encoded(encoded)?;
        Ok(())
    }

    fn unmark(&self, encoded: &str) -> Result<()> {
        self.store()?.remove_encoded(encoded)?;
        Ok(())
    }

    fn done(&self, encoded: &str) -> Result<bool> {
        self.store()?.exists_encoded(encoded)
    }

    fn are_done(&self, encoded: &[String]) -> Result<Vec<bool>> {
        let store = self.store()?;
        encoded
            .iter()
            .map(|key| store.exists_encoded(key))
            .collect()
    }

    fn clear(&self) -> Result<()> {
        let mut ready = self.ready.lock();
        self.store.drop_table()?;
        // The next operation recreates the table.
        *ready = false;
        Ok(())
    }
}
