//! The driver capability the middleware consumes.
//!
//! A driver opens sockets/files and runs statements; this crate only renders text, binds
//! values and routes. Implement these traits to plug in a backend (see `sqlite` for the
//! bundled one).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::OptionsMap;
use crate::error::SqlMiddlewareDbError;
use crate::results::CustomDbRow;
use crate::types::RowValues;

/// Opens driver connections.
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Open a connection for a rendered `prefix:key=val;...` connection string.
    ///
    /// # Errors
    /// Returns the driver's error unmodified if the connection cannot be opened.
    async fn open(
        &self,
        dsn: &str,
        username: Option<&str>,
        password: Option<&str>,
        options: &OptionsMap,
    ) -> Result<Box<dyn DriverConnection>, SqlMiddlewareDbError>;
}

/// One open driver connection.
#[async_trait]
pub trait DriverConnection: Send + Sync {
    /// Prepare `sql` for binding and execution.
    ///
    /// # Errors
    /// Returns the driver's error if the text cannot be prepared.
    async fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>, SqlMiddlewareDbError>;

    /// Quote a scalar as a literal, safely for this connection's charset.
    ///
    /// # Errors
    /// Returns the driver's error if the value cannot be quoted.
    async fn quote_scalar(&self, value: &RowValues) -> Result<String, SqlMiddlewareDbError>;

    /// The id generated by the most recent insert on this connection.
    ///
    /// # Errors
    /// Returns the driver's error if the id cannot be read.
    async fn last_insert_id(&self) -> Result<String, SqlMiddlewareDbError>;
}

/// A prepared statement: bind, execute once, then fetch.
#[async_trait]
pub trait DriverStatement: Send {
    /// The SQL text this statement was prepared from.
    fn query_string(&self) -> &str;

    /// Bind `value` to the placeholder slot `name` (without the leading `:`).
    ///
    /// # Errors
    /// Returns an error if the driver rejects the slot or value.
    fn bind_value(&mut self, name: &str, value: RowValues) -> Result<(), SqlMiddlewareDbError>;

    /// # Errors
    /// Returns the driver's error if execution fails.
    async fn execute(&mut self) -> Result<(), SqlMiddlewareDbError>;

    /// Column names of the result, once executed.
    fn column_names(&self) -> Option<Arc<Vec<String>>>;

    /// Next row of the result, or `None` when exhausted.
    fn fetch_row(&mut self) -> Option<CustomDbRow>;

    /// All remaining rows.
    fn fetch_all(&mut self) -> Vec<CustomDbRow> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_row() {
            rows.push(row);
        }
        rows
    }

    /// Rows affected by the last execution.
    fn row_count(&self) -> usize;
}

/// An executed statement handle, as returned by `Connection::query`.
pub type StatementHandle = Box<dyn DriverStatement>;
