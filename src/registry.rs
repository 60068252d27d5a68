//! Registry of dones instances.
//!
//! A [`Registry`] memoizes one [`Dones`] per `(namespace, target)` pair
//! for the life of the process, so repeated lookups share a single store
//! object. It is an explicit value to construct once and pass around;
//! there is no process-global cache. Entries are never evicted; persisted
//! state is only destroyed by `clear()` on the facade itself.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::Config;
use crate::db::{ConnectionProvider, DbUrl, SqliteConnector};
use crate::error::{DonesError, Result};
use crate::store::Dones;

/// Where a namespace's done markers are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreTarget {
    /// A relational database reachable by connection url.
    Database { url: String },
    /// A directory of append-only log files, one per namespace.
    LogDir { dir: PathBuf },
}

/// Memoized mapping from `(namespace, target)` to a shared [`Dones`].
#[derive(Debug)]
pub struct Registry {
    default_target: StoreTarget,
    retries: usize,
    delay: Duration,
    entries: Mutex<HashMap<(String, StoreTarget), Arc<Dones>>>,
}

impl Registry {
    pub fn new(default_target: StoreTarget) -> Self {
        Self {
            default_target,
            retries: crate::db::DEFAULT_CONNECT_RETRIES,
            delay: crate::db::DEFAULT_CONNECT_DELAY,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Registry whose default target comes from configuration: the
    /// database url when one is set, otherwise the log directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let default_target = if let Some(url) = &config.db_url {
            StoreTarget::Database { url: url.clone() }
        } else if let Some(dir) = &config.log_dir {
            StoreTarget::LogDir { dir: dir.clone() }
        } else {
            return Err(DonesError::Config(
                "neither db_url nor log_dir is configured".to_string(),
            ));
        };

        Ok(Self {
            retries: config.connect_retries,
            delay: config.connect_delay(),
            ..Self::new(default_target)
        })
    }

    /// Override the connection retry policy for stores built after this
    /// call.
    #[must_use]
    pub fn with_retry(mut self, retries: usize, delay: Duration) -> Self {
        self.retries = retries;
        self.delay = delay;
        self
    }

    /// The dones for `ns` on the default target. The first call builds
    /// and caches the instance; later calls return the same one.
    pub fn get(&self, ns: &str) -> Result<Arc<Dones>> {
        self.get_with_target(ns, self.default_target.clone())
    }

    /// The dones for `ns` on an explicit target. The lock spans the
    /// check-and-insert, so concurrent first calls build the instance
    /// exactly once.
    pub fn get_with_target(&self, ns: &str, target: StoreTarget) -> Result<Arc<Dones>> {
        let mut entries = self.entries.lock();
        let cache_key = (ns.to_string(), target.clone());
        if let Some(existing) = entries.get(&cache_key) {
            return Ok(Arc::clone(existing));
        }

        debug!("building dones for namespace '{ns}'");
        let dones = Arc::new(self.build(ns, &target)?);
        entries.insert(cache_key, Arc::clone(&dones));
        Ok(dones)
    }

    fn build(&self, ns: &str, target: &StoreTarget) -> Result<Dones> {
        // The namespace is prefixed to keep dones tables and files apart
        // from anything else living in the same database or directory.
        let ident = format!("dones_{ns}");
        match target {
            StoreTarget::Database { url } => {
                let parsed = DbUrl::parse(url)?;
                let connector = SqliteConnector::from_url(&parsed)?;
                let provider =
                    ConnectionProvider::new(Arc::new(connector), self.retries, self.delay);
                Dones::database(provider, &ident)
            }
            StoreTarget::LogDir { dir } => Ok(Dones::append_log(dir.join(format!("{ident}.log")))),
        }
    }
}
