//! Relational backend plumbing.
//!
//! Connection factory with bounded retry, and the transaction wrapper the
//! key store runs its statements under.

pub mod conn;
pub mod tx;

pub use conn::{
    ConnectionProvider, Connector, DbUrl, SqliteConnector, DEFAULT_CONNECT_DELAY,
    DEFAULT_CONNECT_RETRIES,
};
pub use tx::{with_transaction, TxBehavior};
