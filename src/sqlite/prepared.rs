use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;

use crate::driver::DriverStatement;
use crate::error::SqlMiddlewareDbError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::RowValues;

use super::connection::{SharedSqliteConnection, run_blocking};
use super::params::row_value_to_sqlite_value;
use super::query::build_result_set;

/// A statement bound by placeholder name and executed on the owning connection.
///
/// Rows are read in full on `execute` and handed out by `fetch_row`.
pub struct SqlitePreparedStatement {
    conn: SharedSqliteConnection,
    query: String,
    binds: Vec<(String, RowValues)>,
    column_names: Option<Arc<Vec<String>>>,
    rows: VecDeque<CustomDbRow>,
    rows_affected: usize,
}

impl SqlitePreparedStatement {
    pub(crate) fn new(conn: SharedSqliteConnection, query: String) -> Self {
        Self {
            conn,
            query,
            binds: Vec::new(),
            column_names: None,
            rows: VecDeque::new(),
            rows_affected: 0,
        }
    }
}

#[async_trait]
impl DriverStatement for SqlitePreparedStatement {
    fn query_string(&self) -> &str {
        &self.query
    }

    fn bind_value(&mut self, name: &str, value: RowValues) -> Result<(), SqlMiddlewareDbError> {
        self.binds.push((name.to_string(), value));
        Ok(())
    }

    async fn execute(&mut self) -> Result<(), SqlMiddlewareDbError> {
        let query = self.query.clone();
        let binds = self.binds.clone();
        let result = run_blocking(Arc::clone(&self.conn), move |conn| {
            execute_bound(conn, &query, &binds)
        })
        .await?;

        self.column_names = result.get_column_names().cloned();
        self.rows_affected = result.rows_affected;
        self.rows = result.results.into();
        Ok(())
    }

    fn column_names(&self) -> Option<Arc<Vec<String>>> {
        self.column_names.clone()
    }

    fn fetch_row(&mut self) -> Option<CustomDbRow> {
        self.rows.pop_front()
    }

    fn row_count(&self) -> usize {
        self.rows_affected
    }
}

fn execute_bound(
    conn: &mut rusqlite::Connection,
    query: &str,
    binds: &[(String, RowValues)],
) -> Result<ResultSet, SqlMiddlewareDbError> {
    let mut stmt = conn.prepare_cached(query)?;
    // every `:name` occurrence shares one parameter; the first bind to it wins
    let mut bound = HashSet::with_capacity(binds.len());
    for (name, value) in binds {
        let idx = resolve_slot(&stmt, name)?;
        if bound.insert(idx) {
            stmt.raw_bind_parameter(idx, row_value_to_sqlite_value(value))?;
        }
    }

    if stmt.column_count() > 0 {
        build_result_set(&mut stmt)
    } else {
        let mut result = ResultSet::with_capacity(0);
        result.rows_affected = stmt.raw_execute()?;
        Ok(result)
    }
}

/// Find the 1-based parameter index for slot `name`.
///
/// SQLite gives every occurrence of `:name` one shared parameter, while the binder numbers
/// repeats as `name2`, `name3`, ... A slot with no literal placeholder of its own is mapped
/// back to the longest prefix that has one, provided the stripped suffix is a repeat number.
fn resolve_slot(stmt: &rusqlite::Statement<'_>, name: &str) -> Result<usize, SqlMiddlewareDbError> {
    if let Some(idx) = stmt.parameter_index(&format!(":{name}"))? {
        return Ok(idx);
    }

    for (split, _) in name.char_indices().rev() {
        let (base, suffix) = name.split_at(split);
        if base.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        let repeat_number = suffix.parse::<usize>().is_ok_and(|n| n >= 2);
        if repeat_number && !suffix.starts_with('0') {
            if let Some(idx) = stmt.parameter_index(&format!(":{base}"))? {
                return Ok(idx);
            }
        }
    }

    Err(SqlMiddlewareDbError::ParameterError(format!(
        "statement has no placeholder for :{name}"
    )))
}
