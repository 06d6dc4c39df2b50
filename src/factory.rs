use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::ConnectionParams;
use crate::connection::Connection;
use crate::dialect::Dialect;
use crate::driver::Driver;
use crate::error::SqlMiddlewareDbError;
use crate::signal::{ConnectionSignal, NoopSignal};

/// A constructible connection type: the dialect to render with and the driver to open.
#[derive(Clone, Debug)]
pub struct Adapter {
    pub dialect: Dialect,
    pub driver: Arc<dyn Driver>,
}

/// Builds connections from symbolic adapter names.
///
/// `ConnectionFactory::default()` knows `"sqlite"` when the `sqlite` feature is on. Other
/// backends are registered with their own `Driver`.
#[derive(Clone)]
pub struct ConnectionFactory {
    adapters: HashMap<String, Adapter>,
    signal: Arc<dyn ConnectionSignal>,
}

impl ConnectionFactory {
    /// A factory with no adapters registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
            signal: Arc::new(NoopSignal),
        }
    }

    /// Register (or replace) an adapter under `name`.
    #[must_use]
    pub fn with_adapter(
        mut self,
        name: impl Into<String>,
        dialect: Dialect,
        driver: Arc<dyn Driver>,
    ) -> Self {
        self.register(name, dialect, driver);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, dialect: Dialect, driver: Arc<dyn Driver>) {
        self.adapters.insert(name.into(), Adapter { dialect, driver });
    }

    /// Hook handed to every connection this factory builds.
    #[must_use]
    pub fn with_signal(mut self, signal: Arc<dyn ConnectionSignal>) -> Self {
        self.signal = signal;
        self
    }

    #[must_use]
    pub fn adapter(&self, name: &str) -> Option<&Adapter> {
        self.adapters.get(name)
    }

    /// Construct a connection for adapter `name`. Nothing is opened yet.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` if no adapter is registered under `name`.
    pub fn new_instance(
        &self,
        name: &str,
        params: ConnectionParams,
    ) -> Result<Connection, SqlMiddlewareDbError> {
        let adapter = self.adapters.get(name).ok_or_else(|| {
            SqlMiddlewareDbError::ConfigError(format!("no connection adapter named '{name}'"))
        })?;
        Ok(Connection::new(
            adapter.dialect,
            params,
            Arc::clone(&adapter.driver),
            Arc::clone(&self.signal),
        ))
    }
}

impl Default for ConnectionFactory {
    fn default() -> Self {
        #[allow(unused_mut)]
        let mut factory = Self::empty();
        #[cfg(feature = "sqlite")]
        factory.register("sqlite", Dialect::Sqlite, Arc::new(crate::sqlite::SqliteDriver));
        factory
    }
}

impl fmt::Debug for ConnectionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.adapters.keys().collect();
        names.sort();
        f.debug_struct("ConnectionFactory")
            .field("adapters", &names)
            .finish_non_exhaustive()
    }
}
