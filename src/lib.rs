//! Mark whether a key is "done" and check whether a key has been marked
//! "done". Keys can also be unmarked, so that they are no longer done, and
//! all keys can be unmarked at once by clearing. Keys live in namespaces
//! to avoid conflicts between unrelated sets of keys and to make clearing
//! cheap.
//!
//! The typical use is coordinating batch or queue processing: has this
//! work item already been processed? Two backings are provided behind one
//! facade: a relational table ([`KeyStore`] via [`Dones::database`]) that
//! scales to millions of keys and handles concurrent readers and writers
//! well, and an append-only log file ([`LogStore`] via
//! [`Dones::append_log`]) for when a database is not worth setting up.

pub mod config;
pub mod db;
pub mod encode;
pub mod error;
pub mod registry;
pub mod store;

pub use config::Config;
pub use db::{ConnectionProvider, Connector, DbUrl, SqliteConnector, TxBehavior};
pub use encode::encode_key;
pub use error::{DonesError, Result};
pub use registry::{Registry, StoreTarget};
pub use store::{DbBackend, Dones, KeyStore, LogStore, StatusBackend};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
