use super::Connection;
use crate::error::SqlMiddlewareDbError;
use crate::types::{BindData, Condition};

impl Connection {
    /// Insert one row; column names come from the keys of `data`.
    ///
    /// Returns the number of rows affected.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ParameterError` if `data` is empty, or the driver's
    /// error if the statement fails.
    pub async fn insert(&self, table: &str, data: &BindData) -> Result<usize, SqlMiddlewareDbError> {
        if data.is_empty() {
            return Err(SqlMiddlewareDbError::ParameterError(format!(
                "insert into {table} needs at least one column"
            )));
        }

        let cols = self.quote_names(data.keys()).join(", ");
        // placeholders use the unquoted key names
        let placeholders = data
            .keys()
            .map(|key| format!(":{key}"))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "INSERT INTO {} ({cols}) VALUES ({placeholders})",
            self.quote_name(table)
        );

        let stmt = self.query_text(&text, data).await?;
        Ok(stmt.row_count())
    }

    /// Update rows with `data`, limited by `conditions` joined with AND.
    ///
    /// An empty `conditions` slice updates every row.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ParameterError` if `data` is empty, or a quoting or
    /// driver error.
    pub async fn update(
        &self,
        table: &str,
        data: &BindData,
        conditions: &[Condition],
    ) -> Result<usize, SqlMiddlewareDbError> {
        if data.is_empty() {
            return Err(SqlMiddlewareDbError::ParameterError(format!(
                "update of {table} needs at least one column"
            )));
        }

        let sets = data
            .keys()
            .map(|col| format!("{} = :{col}", self.quote_name(col)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut text = format!("UPDATE {} SET {sets}", self.quote_name(table));

        if !conditions.is_empty() {
            let clause = self.where_clause(conditions).await?;
            text.push_str(" WHERE ");
            text.push_str(&clause);
        }

        let stmt = self.query_text(&text, data).await?;
        Ok(stmt.row_count())
    }

    /// Delete rows matching `conditions` joined with AND.
    ///
    /// Callers must supply at least one condition. Deleting every row needs an explicit
    /// literal such as `Condition::literal("1 = 1")`.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ParameterError` if `conditions` is empty, or a quoting
    /// or driver error.
    pub async fn delete(
        &self,
        table: &str,
        conditions: &[Condition],
    ) -> Result<usize, SqlMiddlewareDbError> {
        if conditions.is_empty() {
            return Err(SqlMiddlewareDbError::ParameterError(format!(
                "delete from {table} needs a WHERE condition"
            )));
        }

        let clause = self.where_clause(conditions).await?;
        let text = format!("DELETE FROM {} WHERE {clause}", self.quote_name(table));
        let stmt = self.query_text(&text, &BindData::new()).await?;
        Ok(stmt.row_count())
    }
}
