use indexmap::IndexMap;

use super::Connection;
use crate::dialect::{ColumnInfo, Dialect, parse_type_size_scope};
use crate::error::SqlMiddlewareDbError;
use crate::results::CustomDbRow;
use crate::types::{BindData, RowValues};

impl Connection {
    /// Names of the tables in the current database.
    ///
    /// # Errors
    /// Returns an error if the listing query fails.
    pub async fn fetch_table_list(&self) -> Result<Vec<String>, SqlMiddlewareDbError> {
        let names = self
            .fetch_col(self.dialect.table_list_sql(), &BindData::new())
            .await?;
        Ok(names.iter().map(RowValues::to_key_string).collect())
    }

    /// Column descriptions for `table`, keyed by column name.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::Unimplemented` for dialects without introspection
    /// support, or an error if the query fails.
    pub async fn fetch_table_cols(
        &self,
        table: &str,
    ) -> Result<IndexMap<String, ColumnInfo>, SqlMiddlewareDbError> {
        let (sql, describe): (String, fn(&CustomDbRow) -> ColumnInfo) = match self.dialect {
            Dialect::Sqlite => (
                format!("PRAGMA table_info({})", self.quote_name(table)),
                sqlite_column,
            ),
            Dialect::Mysql => (
                format!("SHOW COLUMNS FROM {}", self.quote_name(table)),
                mysql_column,
            ),
            other => {
                return Err(SqlMiddlewareDbError::Unimplemented(format!(
                    "column introspection for {other:?}"
                )));
            }
        };

        let rows = self.fetch_all(sql, &BindData::new()).await?;
        Ok(rows
            .iter()
            .map(describe)
            .map(|col| (col.name.clone(), col))
            .collect())
    }
}

fn text_of(row: &CustomDbRow, column: &str) -> String {
    row.get(column).map(RowValues::to_key_string).unwrap_or_default()
}

fn default_of(row: &CustomDbRow, column: &str) -> Option<String> {
    row.get(column)
        .filter(|v| !v.is_null())
        .map(RowValues::to_key_string)
}

// PRAGMA table_info: cid, name, type, notnull, dflt_value, pk
fn sqlite_column(row: &CustomDbRow) -> ColumnInfo {
    let declared = text_of(row, "type");
    let (col_type, size, scope) = parse_type_size_scope(&declared);
    let primary = row.get("pk").and_then(RowValues::as_int).is_some_and(|pk| *pk > 0);
    ColumnInfo {
        name: text_of(row, "name"),
        // an INTEGER PRIMARY KEY aliases the rowid and autoincrements
        autoinc: primary && col_type == "integer",
        col_type,
        size,
        scope,
        default: default_of(row, "dflt_value"),
        require: row.get("notnull").and_then(RowValues::as_bool).copied().unwrap_or(false),
        primary,
    }
}

// SHOW COLUMNS: Field, Type, Null, Key, Default, Extra
fn mysql_column(row: &CustomDbRow) -> ColumnInfo {
    let (col_type, size, scope) = parse_type_size_scope(&text_of(row, "Type"));
    ColumnInfo {
        name: text_of(row, "Field"),
        col_type,
        size,
        scope,
        default: default_of(row, "Default"),
        require: text_of(row, "Null").eq_ignore_ascii_case("no"),
        primary: text_of(row, "Key").eq_ignore_ascii_case("pri"),
        autoinc: text_of(row, "Extra")
            .to_ascii_lowercase()
            .contains("auto_increment"),
    }
}
