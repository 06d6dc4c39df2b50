// SQLite module - the bundled `Driver` implementation, backed by rusqlite
//
// - config: connection-string parsing and driver options
// - params: value conversion between middleware and SQLite types
// - query: result extraction and building
// - connection: the open connection and blocking-call plumbing
// - prepared: statements that bind by name and buffer their rows

pub mod config;
pub mod connection;
pub mod params;
pub mod prepared;
pub mod query;

use async_trait::async_trait;

use crate::config::OptionsMap;
use crate::driver::{Driver, DriverConnection};
use crate::error::SqlMiddlewareDbError;

pub use config::SqliteOptions;
pub use connection::SqliteConnection;
pub use prepared::SqlitePreparedStatement;
pub use query::build_result_set;

/// Opens rusqlite connections from `sqlite:` connection strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

#[async_trait]
impl Driver for SqliteDriver {
    async fn open(
        &self,
        dsn: &str,
        _username: Option<&str>,
        _password: Option<&str>,
        options: &OptionsMap,
    ) -> Result<Box<dyn DriverConnection>, SqlMiddlewareDbError> {
        let opts = SqliteOptions::parse(dsn, options)?;
        let conn = SqliteConnection::open(opts).await?;
        Ok(Box::new(conn))
    }
}
