use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::debug;

use crate::config::{ConnectionConfig, PartialConnectionConfig, ReplicaConfig};
use crate::connection::Connection;
use crate::error::SqlMiddlewareDbError;
use crate::factory::ConnectionFactory;
use crate::random::{RandomSource, RngSource};

/// Which configured target a connection belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionRole {
    Default,
    Master(String),
    Slave(String),
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionRole::Default => write!(f, "default"),
            ConnectionRole::Master(name) => write!(f, "master:{name}"),
            ConnectionRole::Slave(name) => write!(f, "slave:{name}"),
        }
    }
}

/// Routes reads and writes across a default connection, named masters and named slaves.
///
/// Connections are constructed on first request and cached for the life of the manager;
/// at most one `Connection` (and so one driver connection) exists per role.
///
/// Writes pick uniformly among the default and the masters. Reads pick among the default
/// and the slaves when any slave is configured, otherwise among the default and the masters.
pub struct ConnectionManager {
    factory: ConnectionFactory,
    default: ConnectionConfig,
    masters: IndexMap<String, ConnectionConfig>,
    slaves: IndexMap<String, ConnectionConfig>,
    cache: Mutex<HashMap<ConnectionRole, Arc<Connection>>>,
    random: Mutex<Box<dyn RandomSource>>,
}

impl ConnectionManager {
    /// Each master and slave override is merged over `default` here, once.
    #[must_use]
    pub fn new(
        factory: ConnectionFactory,
        default: ConnectionConfig,
        masters: IndexMap<String, PartialConnectionConfig>,
        slaves: IndexMap<String, PartialConnectionConfig>,
    ) -> Self {
        let merge = |overrides: IndexMap<String, PartialConnectionConfig>| {
            overrides
                .into_iter()
                .map(|(name, partial)| {
                    let merged = default.merged(&partial);
                    (name, merged)
                })
                .collect::<IndexMap<_, _>>()
        };
        let masters = merge(masters);
        let slaves = merge(slaves);

        Self {
            factory,
            default,
            masters,
            slaves,
            cache: Mutex::new(HashMap::new()),
            random: Mutex::new(Box::new(RngSource::default())),
        }
    }

    #[must_use]
    pub fn from_config(factory: ConnectionFactory, config: ReplicaConfig) -> Self {
        Self::new(factory, config.default, config.masters, config.slaves)
    }

    /// Replace the random source used by `get_read` and `get_write`.
    #[must_use]
    pub fn with_random_source(self, source: impl RandomSource + 'static) -> Self {
        Self {
            random: Mutex::new(Box::new(source)),
            ..self
        }
    }

    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` if the default adapter is unknown.
    pub fn get_default(&self) -> Result<Arc<Connection>, SqlMiddlewareDbError> {
        self.instance(ConnectionRole::Default)
    }

    /// # Errors
    /// Returns `SqlMiddlewareDbError::NoSuchMaster` if `name` is not configured, or
    /// `ConfigError` if its adapter is unknown.
    pub fn get_master(&self, name: &str) -> Result<Arc<Connection>, SqlMiddlewareDbError> {
        if !self.masters.contains_key(name) {
            return Err(SqlMiddlewareDbError::NoSuchMaster(name.to_string()));
        }
        self.instance(ConnectionRole::Master(name.to_string()))
    }

    /// # Errors
    /// Returns `SqlMiddlewareDbError::NoSuchSlave` if `name` is not configured, or
    /// `ConfigError` if its adapter is unknown.
    pub fn get_slave(&self, name: &str) -> Result<Arc<Connection>, SqlMiddlewareDbError> {
        if !self.slaves.contains_key(name) {
            return Err(SqlMiddlewareDbError::NoSuchSlave(name.to_string()));
        }
        self.instance(ConnectionRole::Slave(name.to_string()))
    }

    /// A connection for writing: the default or a master, chosen at random.
    ///
    /// # Errors
    /// Returns `ConfigError` if the chosen connection's adapter is unknown.
    pub fn get_write(&self) -> Result<Arc<Connection>, SqlMiddlewareDbError> {
        let role = self.choose(self.write_pool());
        self.instance(role)
    }

    /// A connection for reading, chosen at random from the read pool.
    ///
    /// # Errors
    /// Returns `ConfigError` if the chosen connection's adapter is unknown.
    pub fn get_read(&self) -> Result<Arc<Connection>, SqlMiddlewareDbError> {
        let role = self.choose(self.read_pool());
        self.instance(role)
    }

    /// Roles eligible for writes: the default, then masters in configuration order.
    #[must_use]
    pub fn write_pool(&self) -> Vec<ConnectionRole> {
        let mut pool = vec![ConnectionRole::Default];
        pool.extend(self.masters.keys().cloned().map(ConnectionRole::Master));
        pool
    }

    /// Roles eligible for reads: slaves take precedence over masters; slaves never write.
    #[must_use]
    pub fn read_pool(&self) -> Vec<ConnectionRole> {
        if self.slaves.is_empty() {
            return self.write_pool();
        }
        let mut pool = vec![ConnectionRole::Default];
        pool.extend(self.slaves.keys().cloned().map(ConnectionRole::Slave));
        pool
    }

    /// The merged configuration behind a role, if the role is configured.
    #[must_use]
    pub fn config_for(&self, role: &ConnectionRole) -> Option<&ConnectionConfig> {
        match role {
            ConnectionRole::Default => Some(&self.default),
            ConnectionRole::Master(name) => self.masters.get(name),
            ConnectionRole::Slave(name) => self.slaves.get(name),
        }
    }

    fn choose(&self, mut pool: Vec<ConnectionRole>) -> ConnectionRole {
        let idx = lock(&self.random).pick(pool.len());
        debug!(pool = pool.len(), pick = idx, "selecting connection");
        pool.swap_remove(idx.min(pool.len() - 1))
    }

    // The cache lock is held across check-then-insert so concurrent first requests for a
    // role share one instance.
    fn instance(&self, role: ConnectionRole) -> Result<Arc<Connection>, SqlMiddlewareDbError> {
        let mut cache = lock(&self.cache);
        if let Some(conn) = cache.get(&role) {
            return Ok(Arc::clone(conn));
        }

        let config = self.config_for(&role).ok_or_else(|| match &role {
            ConnectionRole::Master(name) => SqlMiddlewareDbError::NoSuchMaster(name.clone()),
            ConnectionRole::Slave(name) => SqlMiddlewareDbError::NoSuchSlave(name.clone()),
            ConnectionRole::Default => {
                SqlMiddlewareDbError::ConfigError("default connection is not configured".into())
            }
        })?;
        let conn = Arc::new(self.factory.new_instance(&config.adapter, config.params())?);
        debug!(role = %role, adapter = %config.adapter, "constructed connection");
        cache.insert(role, Arc::clone(&conn));
        Ok(conn)
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("factory", &self.factory)
            .field("masters", &self.masters.keys().collect::<Vec<_>>())
            .field("slaves", &self.slaves.keys().collect::<Vec<_>>())
            .field("cached", &lock(&self.cache).len())
            .finish_non_exhaustive()
    }
}
