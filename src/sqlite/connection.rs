use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::driver::{DriverConnection, DriverStatement};
use crate::error::SqlMiddlewareDbError;
use crate::types::RowValues;

use super::config::SqliteOptions;
use super::params::row_value_to_sqlite_value;
use super::prepared::SqlitePreparedStatement;

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// An open rusqlite connection. Calls run on the blocking pool, one at a time.
pub struct SqliteConnection {
    conn: SharedSqliteConnection,
    db_path: String,
}

impl SqliteConnection {
    /// Open the database described by `opts`.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::SqliteError` if the file cannot be opened or configured.
    pub async fn open(opts: SqliteOptions) -> Result<Self, SqlMiddlewareDbError> {
        let path = opts.db_path.clone();
        let conn = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&opts.db_path)?;
            if let Some(timeout) = opts.busy_timeout {
                conn.busy_timeout(timeout)?;
            }
            Ok::<_, SqlMiddlewareDbError>(conn)
        })
        .await
        .map_err(|e| {
            SqlMiddlewareDbError::ConnectionError(format!("sqlite spawn_blocking join error: {e}"))
        })??;

        debug!(path = %path, "opened sqlite database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: path,
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Run `func` against the raw rusqlite connection on the blocking pool.
    ///
    /// # Errors
    /// Returns whatever `func` returns, or `ExecutionError` if the blocking task panics.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, SqlMiddlewareDbError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlMiddlewareDbError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(Arc::clone(&self.conn), func).await
    }
}

#[async_trait]
impl DriverConnection for SqliteConnection {
    async fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>, SqlMiddlewareDbError> {
        // compile once up front so syntax errors surface at prepare time
        let sql_owned = sql.to_owned();
        self.with_connection(move |conn| {
            conn.prepare_cached(&sql_owned)?;
            Ok(())
        })
        .await?;
        Ok(Box::new(SqlitePreparedStatement::new(
            Arc::clone(&self.conn),
            sql.to_owned(),
        )))
    }

    async fn quote_scalar(&self, value: &RowValues) -> Result<String, SqlMiddlewareDbError> {
        let value = row_value_to_sqlite_value(value);
        self.with_connection(move |conn| {
            conn.query_row("SELECT quote(?1)", [value], |row| row.get::<_, String>(0))
                .map_err(SqlMiddlewareDbError::SqliteError)
        })
        .await
    }

    async fn last_insert_id(&self) -> Result<String, SqlMiddlewareDbError> {
        self.with_connection(|conn| Ok(conn.last_insert_rowid().to_string()))
            .await
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlMiddlewareDbError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlMiddlewareDbError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| {
        SqlMiddlewareDbError::ExecutionError(format!("sqlite spawn_blocking join error: {e}"))
    })?
}
