use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlMiddlewareDbError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No such master connection: {0}")]
    NoSuchMaster(String),

    #[error("No such slave connection: {0}")]
    NoSuchSlave(String),

    #[error("Not enough values: {placeholders} placeholders but only {values} values")]
    NotEnoughValues { placeholders: usize, values: usize },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for SqlMiddlewareDbError {
    fn from(err: serde_json::Error) -> Self {
        SqlMiddlewareDbError::ConfigError(format!("invalid configuration document: {err}"))
    }
}
