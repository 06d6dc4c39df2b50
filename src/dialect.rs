use clap::ValueEnum;

/// SQL dialects the quoting engine knows how to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Dialect {
    /// `MySQL` / `MariaDB`, backtick identifiers
    Mysql,
    /// `PostgreSQL`, double-quoted identifiers
    Pgsql,
    /// `SQLite`, double-quoted identifiers
    Sqlite,
    /// SQL Server, bracketed identifiers, `LIMIT`/`OFFSET` style paging
    Sqlsrv,
    /// SQL Server 2012+ ("Denali"), `OFFSET … ROWS FETCH NEXT … ROWS ONLY` paging
    SqlsrvDenali,
}

impl Dialect {
    /// Parse a dialect name such as `"mysql"` or `"sqlsrv-denali"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }

    /// Prefix of the rendered connection string.
    #[must_use]
    pub fn dsn_prefix(self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Pgsql => "pgsql",
            Dialect::Sqlite => "sqlite",
            Dialect::Sqlsrv | Dialect::SqlsrvDenali => "sqlsrv",
        }
    }

    /// Identifier quote prefix and suffix.
    #[must_use]
    pub fn ident_quotes(self) -> (&'static str, &'static str) {
        match self {
            Dialect::Mysql => ("`", "`"),
            Dialect::Pgsql | Dialect::Sqlite => ("\"", "\""),
            Dialect::Sqlsrv | Dialect::SqlsrvDenali => ("[", "]"),
        }
    }

    /// How this dialect appends paging to a rendered SELECT.
    #[must_use]
    pub fn limit_offset(self) -> &'static dyn LimitOffset {
        match self {
            Dialect::SqlsrvDenali => &OffsetFetch,
            _ => &TrailingLimitOffset,
        }
    }

    /// Statement listing the tables of the current database, one name per row.
    #[must_use]
    pub fn table_list_sql(self) -> &'static str {
        match self {
            Dialect::Mysql => "SHOW TABLES",
            Dialect::Pgsql => {
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = current_schema() ORDER BY table_name"
            }
            Dialect::Sqlite => {
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            }
            Dialect::Sqlsrv | Dialect::SqlsrvDenali => {
                "SELECT name FROM sysobjects WHERE type = 'U' ORDER BY name"
            }
        }
    }
}

/// Dialect-specific paging for a rendered SELECT body.
pub trait LimitOffset: Send + Sync {
    /// Append paging for `limit`/`offset` to `body`; zero means "not set".
    fn render(&self, body: &str, limit: u64, offset: u64) -> String;
}

/// `LIMIT n` then `OFFSET n` after the body, each only when non-zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingLimitOffset;

impl LimitOffset for TrailingLimitOffset {
    fn render(&self, body: &str, limit: u64, offset: u64) -> String {
        let mut text = body.trim_end().to_string();
        if limit != 0 {
            text.push_str(&format!("\nLIMIT {limit}"));
        }
        if offset != 0 {
            text.push_str(&format!("\nOFFSET {offset}"));
        }
        text
    }
}

/// `OFFSET n ROWS` / `FETCH NEXT n ROWS ONLY`.
///
/// Both are sub-clauses of ORDER BY, so the body must end with one. FETCH is invalid
/// without OFFSET, hence `OFFSET 0 ROWS` when only a limit is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetFetch;

impl LimitOffset for OffsetFetch {
    fn render(&self, body: &str, limit: u64, offset: u64) -> String {
        let mut text = body.trim_end().to_string();
        if limit == 0 && offset == 0 {
            return text;
        }
        text.push_str(&format!("\nOFFSET {offset} ROWS"));
        if limit != 0 {
            text.push_str(&format!("\nFETCH NEXT {limit} ROWS ONLY"));
        }
        text
    }
}

/// Column description returned by `Connection::fetch_table_cols`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub col_type: String,
    pub size: Option<u32>,
    pub scope: Option<u32>,
    pub default: Option<String>,
    pub require: bool,
    pub primary: bool,
    pub autoinc: bool,
}

/// Split a declared column type such as `"NUMERIC(10,2)"` into `("numeric", Some(10), Some(2))`.
#[must_use]
pub fn parse_type_size_scope(spec: &str) -> (String, Option<u32>, Option<u32>) {
    let spec = spec.trim().to_lowercase();
    let Some(pos) = spec.find('(') else {
        return (spec, None, None);
    };
    let col_type = spec[..pos].trim().to_string();
    let inner = spec[pos..].trim_matches(|c| c == '(' || c == ')');
    match inner.split_once(',') {
        Some((size, scope)) => (
            col_type,
            size.trim().parse().ok(),
            scope.trim().parse().ok(),
        ),
        None => (col_type, inner.trim().parse().ok(), None),
    }
}
