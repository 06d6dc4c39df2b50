//! Database-access middleware: dialect-correct identifier and value quoting, `:name`
//! placeholder binding, and read/write routing across a default connection, masters and
//! slaves.
//!
//! ```rust,no_run
//! use sql_replica_middleware::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlMiddlewareDbError> {
//! let config = ReplicaConfig::from_json_str(r#"{
//!     "default": {"adapter": "sqlite", "dsn": {"database": "app.db"}},
//!     "slaves": {"replica": {"dsn": {"database": "replica.db"}}}
//! }"#)?;
//! let manager = ConnectionManager::from_config(ConnectionFactory::default(), config);
//!
//! let reader = manager.get_read()?;
//! let rows = reader.fetch_all("SELECT * FROM users WHERE id = :id", &BindData::from([
//!     ("id".to_string(), RowValues::Int(1)),
//! ])).await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod config;
pub mod connection;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod factory;
pub mod manager;
pub mod quoting;
pub mod random;
pub mod results;
pub mod select;
pub mod signal;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod types;

pub use config::{ConnectionConfig, PartialConnectionConfig, ReplicaConfig};
pub use connection::Connection;
pub use error::SqlMiddlewareDbError;
pub use factory::ConnectionFactory;
pub use manager::{ConnectionManager, ConnectionRole};
