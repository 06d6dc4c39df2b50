use std::time::Duration;

use crate::config::OptionsMap;
use crate::error::SqlMiddlewareDbError;

/// Where and how to open a `SQLite` database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteOptions {
    pub db_path: String,
    pub busy_timeout: Option<Duration>,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            busy_timeout: None,
        }
    }

    /// Parse a rendered connection string.
    ///
    /// The body after `sqlite:` is either `key=value;...` pairs with a `database` (or `path`)
    /// key, or a bare path. Recognised options: `busy_timeout` in milliseconds.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` if no path is given or an option is invalid.
    pub fn parse(dsn: &str, options: &OptionsMap) -> Result<Self, SqlMiddlewareDbError> {
        let body = dsn.strip_prefix("sqlite:").unwrap_or(dsn);

        let db_path = if body.contains('=') {
            body.split(';')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| matches!(key.trim(), "database" | "path"))
                .map(|(_, value)| value.trim().to_string())
                .unwrap_or_default()
        } else {
            body.trim().to_string()
        };

        if db_path.is_empty() {
            return Err(SqlMiddlewareDbError::ConfigError(format!(
                "sqlite connection string has no database path: {dsn}"
            )));
        }

        let busy_timeout = match options.get("busy_timeout") {
            Some(ms) => Some(Duration::from_millis(ms.trim().parse().map_err(|e| {
                SqlMiddlewareDbError::ConfigError(format!("invalid busy_timeout '{ms}': {e}"))
            })?)),
            None => None,
        };

        Ok(Self {
            db_path,
            busy_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keyed_and_bare_paths() {
        let none = OptionsMap::new();
        assert_eq!(
            SqliteOptions::parse("sqlite:database=:memory:", &none).unwrap().db_path,
            ":memory:"
        );
        assert_eq!(
            SqliteOptions::parse("sqlite:mode=rwc;path=/tmp/x.db", &none)
                .unwrap()
                .db_path,
            "/tmp/x.db"
        );
        assert_eq!(
            SqliteOptions::parse("sqlite:/tmp/y.db", &none).unwrap().db_path,
            "/tmp/y.db"
        );
    }

    #[test]
    fn missing_path_is_a_config_error() {
        let err = SqliteOptions::parse("sqlite:", &OptionsMap::new()).unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ConfigError(_)));
        let err = SqliteOptions::parse("sqlite:host=x", &OptionsMap::new()).unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ConfigError(_)));
    }

    #[test]
    fn reads_busy_timeout() {
        let mut options = OptionsMap::new();
        options.insert("busy_timeout".into(), "250".into());
        let opts = SqliteOptions::parse("sqlite::memory:", &options).unwrap();
        assert_eq!(opts.busy_timeout, Some(Duration::from_millis(250)));

        options.insert("busy_timeout".into(), "soon".into());
        assert!(SqliteOptions::parse("sqlite::memory:", &options).is_err());
    }
}
