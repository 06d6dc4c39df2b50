use indexmap::IndexMap;

use super::Connection;
use crate::error::SqlMiddlewareDbError;
use crate::results::CustomDbRow;
use crate::select::QuerySpec;
use crate::types::{BindData, RowValues};

impl Connection {
    /// Fetch all rows, in result order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn fetch_all(
        &self,
        spec: impl Into<QuerySpec>,
        data: &BindData,
    ) -> Result<Vec<CustomDbRow>, SqlMiddlewareDbError> {
        let mut stmt = self.query(spec, data).await?;
        Ok(stmt.fetch_all())
    }

    /// Fetch all rows keyed by the value of their first column.
    ///
    /// If several rows share a first-column value, the last one wins; its position is that
    /// of the first row with the key.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn fetch_assoc(
        &self,
        spec: impl Into<QuerySpec>,
        data: &BindData,
    ) -> Result<IndexMap<String, CustomDbRow>, SqlMiddlewareDbError> {
        let mut stmt = self.query(spec, data).await?;
        let mut keyed = IndexMap::new();
        while let Some(row) = stmt.fetch_row() {
            let key = row.first().map(RowValues::to_key_string).unwrap_or_default();
            keyed.insert(key, row);
        }
        Ok(keyed)
    }

    /// Fetch the first column of every row.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn fetch_col(
        &self,
        spec: impl Into<QuerySpec>,
        data: &BindData,
    ) -> Result<Vec<RowValues>, SqlMiddlewareDbError> {
        let mut stmt = self.query(spec, data).await?;
        let mut col = Vec::new();
        while let Some(row) = stmt.fetch_row() {
            col.push(row.rows.into_iter().next().unwrap_or(RowValues::Null));
        }
        Ok(col)
    }

    /// Fetch the first column of the first row. Builders are limited to one row.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn fetch_value(
        &self,
        spec: impl Into<QuerySpec>,
        data: &BindData,
    ) -> Result<Option<RowValues>, SqlMiddlewareDbError> {
        let mut spec = spec.into();
        spec.limit_one();
        let mut stmt = self.query(spec, data).await?;
        Ok(stmt
            .fetch_row()
            .and_then(|row| row.rows.into_iter().next()))
    }

    /// Fetch `first column => second column` pairs. Later duplicate keys overwrite earlier.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn fetch_pairs(
        &self,
        spec: impl Into<QuerySpec>,
        data: &BindData,
    ) -> Result<IndexMap<String, RowValues>, SqlMiddlewareDbError> {
        let mut stmt = self.query(spec, data).await?;
        let mut pairs = IndexMap::new();
        while let Some(row) = stmt.fetch_row() {
            let mut values = row.rows.into_iter();
            let key = values.next().map(|v| v.to_key_string()).unwrap_or_default();
            pairs.insert(key, values.next().unwrap_or(RowValues::Null));
        }
        Ok(pairs)
    }

    /// Fetch the first row. Builders are limited to one row.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn fetch_one(
        &self,
        spec: impl Into<QuerySpec>,
        data: &BindData,
    ) -> Result<Option<CustomDbRow>, SqlMiddlewareDbError> {
        let mut spec = spec.into();
        spec.limit_one();
        let mut stmt = self.query(spec, data).await?;
        Ok(stmt.fetch_row())
    }
}
