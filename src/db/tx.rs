//! Transaction wrapper for units of work on one connection.
//!
//! Every invocation issues exactly one of commit or rollback: commit when
//! the unit of work succeeds, rollback when the start statement or the
//! unit of work fails. The original failure is re-raised unchanged; the
//! rollback itself never masks it.

use rusqlite::Connection;
use tracing::warn;

use crate::error::{DonesError, Result};

/// How a transaction is opened on a given backend.
#[derive(Debug, Clone)]
pub struct TxBehavior {
    /// Issue the start statement before the unit of work. Needed on
    /// connections that are autocommit by default.
    pub explicit_start: bool,
    /// Override when `START TRANSACTION` is not accepted by the backend
    /// dialect.
    pub start_sql: String,
}

impl Default for TxBehavior {
    fn default() -> Self {
        Self {
            explicit_start: true,
            start_sql: "START TRANSACTION".to_string(),
        }
    }
}

impl TxBehavior {
    /// SQLite dialect: transactions open with `BEGIN`.
    pub fn sqlite() -> Self {
        Self {
            explicit_start: true,
            start_sql: "BEGIN".to_string(),
        }
    }
}

/// Run `body` inside a transaction on `conn`.
///
/// On success the transaction is committed and the body's value returned.
/// On failure the transaction is rolled back and the body's error is
/// returned as-is. A failing rollback is logged; the original error still
/// wins.
pub fn with_transaction<T, F>(conn: &Connection, behavior: &TxBehavior, body: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    if behavior.explicit_start {
        if let Err(err) = conn.execute_batch(&behavior.start_sql) {
            rollback(conn);
            return Err(err.into());
        }
    }

    match body(conn) {
        Ok(value) => {
            conn.execute_batch("COMMIT")
                .map_err(|err| DonesError::Transaction(format!("commit: {err}")))?;
            Ok(value)
        }
        Err(err) => {
            rollback(conn);
            Err(err)
        }
    }
}

fn rollback(conn: &Connection) {
    if let Err(err) = conn.execute_batch("ROLLBACK") {
        warn!("rollback failed: {err}");
    }
}
