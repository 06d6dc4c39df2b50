// Connection module: one lazily-opened driver connection plus the helpers built on it.
//
// - core (this file): lifecycle, rendering, binding, quoting
// - fetch: row-shaped helpers layered on `query`
// - dml: insert/update/delete builders
// - schema: table and column introspection

mod dml;
mod fetch;
mod schema;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::config::{ConnectionParams, render_dsn};
use crate::dialect::Dialect;
use crate::driver::{Driver, DriverConnection, DriverStatement, StatementHandle};
use crate::error::SqlMiddlewareDbError;
use crate::quoting::{self, IdentifierQuoter, QuoteScalar, bind_plan};
use crate::select::QuerySpec;
use crate::signal::ConnectionSignal;
use crate::types::{BindData, Condition, QuoteArg, RowValues};

/// A database connection that opens its driver connection on first use.
///
/// The driver connection is opened at most once; every later `connect` returns it.
pub struct Connection {
    dialect: Dialect,
    quoter: IdentifierQuoter,
    params: ConnectionParams,
    driver: Arc<dyn Driver>,
    signal: Arc<dyn ConnectionSignal>,
    handle: OnceCell<Box<dyn DriverConnection>>,
}

impl Connection {
    #[must_use]
    pub fn new(
        dialect: Dialect,
        params: ConnectionParams,
        driver: Arc<dyn Driver>,
        signal: Arc<dyn ConnectionSignal>,
    ) -> Self {
        Self {
            dialect,
            quoter: IdentifierQuoter::for_dialect(dialect),
            params,
            driver,
            signal,
            handle: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The parameters this connection was constructed with.
    #[must_use]
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Value of one dsn key, if present and not null.
    #[must_use]
    pub fn dsn_value(&self, key: &str) -> Option<&str> {
        self.params.dsn.get(key).and_then(|v| v.as_deref())
    }

    /// The rendered connection string, e.g. `mysql:host=localhost;dbname=test`.
    #[must_use]
    pub fn dsn_string(&self) -> String {
        render_dsn(self.dialect.dsn_prefix(), &self.params.dsn)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }

    /// Open the driver connection if it is not open yet and return it.
    ///
    /// Concurrent first calls open a single connection; the others wait for it.
    ///
    /// # Errors
    /// Returns the driver's error unmodified if the connection cannot be opened. A failed
    /// attempt leaves the connection unopened, so a later call tries again.
    pub async fn connect(&self) -> Result<&dyn DriverConnection, SqlMiddlewareDbError> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                let dsn = self.dsn_string();
                self.signal.pre_connect(self);
                debug!(dsn = %dsn, "opening driver connection");
                let conn = self
                    .driver
                    .open(
                        &dsn,
                        self.params.username.as_deref(),
                        self.params.password.as_deref(),
                        &self.params.options,
                    )
                    .await?;
                self.signal.post_connect(self);
                Ok::<_, SqlMiddlewareDbError>(conn)
            })
            .await?;
        Ok(handle.as_ref())
    }

    /// Render a query spec to SQL text, applying the dialect's paging to builders.
    #[must_use]
    pub fn render(&self, spec: &QuerySpec) -> String {
        match spec {
            QuerySpec::Text(text) => text.clone(),
            QuerySpec::Select(select) => {
                self.dialect
                    .limit_offset()
                    .render(&select.body(), select.limit(), select.offset())
            }
        }
    }

    /// Prepare, bind and execute a statement, returning the executed handle.
    ///
    /// # Errors
    /// Returns the driver's error if connecting, preparing, binding or executing fails.
    pub async fn query(
        &self,
        spec: impl Into<QuerySpec>,
        data: &BindData,
    ) -> Result<StatementHandle, SqlMiddlewareDbError> {
        let sql = self.render(&spec.into());
        self.query_text(&sql, data).await
    }

    pub(crate) async fn query_text(
        &self,
        sql: &str,
        data: &BindData,
    ) -> Result<StatementHandle, SqlMiddlewareDbError> {
        let conn = self.connect().await?;
        self.signal.pre_query(self, sql, data);
        trace!(sql = %sql, "preparing statement");
        let mut stmt = conn.prepare(sql).await?;
        Self::bind(stmt.as_mut(), data)?;
        stmt.execute().await?;
        self.signal.post_query(self, stmt.as_ref());
        Ok(stmt)
    }

    /// Bind `data` into a prepared statement by scanning its text for `:name` placeholders.
    ///
    /// # Errors
    /// Returns an error if the driver rejects a slot or value.
    pub fn bind(stmt: &mut dyn DriverStatement, data: &BindData) -> Result<(), SqlMiddlewareDbError> {
        if data.is_empty() {
            return Ok(());
        }
        let plan = bind_plan(stmt.query_string(), data);
        trace!(slots = plan.len(), "binding placeholders");
        for (slot, value) in plan {
            stmt.bind_value(&slot, value)?;
        }
        Ok(())
    }

    /// Quote a value (or list of values) as SQL literal text.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be opened or the driver refuses a value.
    pub async fn quote(&self, value: impl Into<QuoteArg>) -> Result<String, SqlMiddlewareDbError> {
        quoting::quote(self, &value.into()).await
    }

    /// Quote `data` into `text` at `?` placeholders.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::NotEnoughValues` if `text` has more placeholders than
    /// values, or a connection/driver error.
    pub async fn quote_into(
        &self,
        text: &str,
        data: impl Into<QuoteArg>,
    ) -> Result<String, SqlMiddlewareDbError> {
        quoting::quote_into(self, text, data.into()).await
    }

    /// Build a clause from literal and bound conditions joined by `separator`.
    ///
    /// # Errors
    /// Propagates errors from `quote_into`.
    pub async fn quote_multi(
        &self,
        conditions: &[Condition],
        separator: &str,
    ) -> Result<String, SqlMiddlewareDbError> {
        quoting::quote_multi(self, conditions, separator).await
    }

    #[must_use]
    pub fn quote_name(&self, spec: &str) -> String {
        self.quoter.quote_name(spec)
    }

    pub fn quote_names<I, S>(&self, specs: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.quoter.quote_names(specs)
    }

    #[must_use]
    pub fn quote_names_in(&self, text: &str) -> String {
        self.quoter.quote_names_in(text)
    }

    /// # Errors
    /// Returns an error if the connection cannot be opened or the driver cannot report the id.
    pub async fn last_insert_id(&self) -> Result<String, SqlMiddlewareDbError> {
        self.connect().await?.last_insert_id().await
    }

    /// Render `conditions` as a WHERE body: quoted values, then quoted `table.col` names.
    async fn where_clause(&self, conditions: &[Condition]) -> Result<String, SqlMiddlewareDbError> {
        let clause = self.quote_multi(conditions, " AND ").await?;
        Ok(self.quote_names_in(&clause))
    }
}

#[async_trait]
impl QuoteScalar for Connection {
    async fn quote_scalar(&self, value: &RowValues) -> Result<String, SqlMiddlewareDbError> {
        self.connect().await?.quote_scalar(value).await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.dialect)
            .field("dsn", &self.dsn_string())
            .field("username", &self.params.username)
            .field("driver", &self.driver)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
