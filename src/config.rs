use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SqlMiddlewareDbError;

/// Driver-specific connection-string pairs. `None` values are kept for ordering but never
/// rendered.
pub type DsnMap = IndexMap<String, Option<String>>;

/// Driver options, passed through to the driver untouched.
pub type OptionsMap = IndexMap<String, String>;

/// Complete settings for one connection: which adapter to build and what to hand it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Symbolic adapter name looked up in the `ConnectionFactory`.
    pub adapter: String,
    pub dsn: DsnMap,
    pub username: Option<String>,
    pub password: Option<String>,
    pub options: OptionsMap,
}

/// Overrides for a named master or slave, applied on top of the default config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConnectionConfig {
    pub adapter: Option<String>,
    pub dsn: DsnMap,
    pub username: Option<String>,
    pub password: Option<String>,
    pub options: Option<OptionsMap>,
}

/// What a factory needs to construct a connection; the adapter name has been consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    pub dsn: DsnMap,
    pub username: Option<String>,
    pub password: Option<String>,
    pub options: OptionsMap,
}

impl ConnectionConfig {
    #[must_use]
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dsn(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dsn.insert(key.into(), Some(value.into()));
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Overlay `overrides` on this config.
    ///
    /// Only `dsn` merges key by key; keys keep their first-insertion position and new keys
    /// are appended. Every other field is replaced wholesale when the override sets it.
    #[must_use]
    pub fn merged(&self, overrides: &PartialConnectionConfig) -> ConnectionConfig {
        let mut merged = self.clone();
        for (key, value) in &overrides.dsn {
            merged.dsn.insert(key.clone(), value.clone());
        }
        if let Some(adapter) = &overrides.adapter {
            merged.adapter.clone_from(adapter);
        }
        if let Some(username) = &overrides.username {
            merged.username = Some(username.clone());
        }
        if let Some(password) = &overrides.password {
            merged.password = Some(password.clone());
        }
        if let Some(options) = &overrides.options {
            merged.options.clone_from(options);
        }
        merged
    }

    /// Value of one dsn key, if present and not null.
    #[must_use]
    pub fn dsn_value(&self, key: &str) -> Option<&str> {
        self.dsn.get(key).and_then(|v| v.as_deref())
    }

    #[must_use]
    pub fn params(&self) -> ConnectionParams {
        ConnectionParams {
            dsn: self.dsn.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            options: self.options.clone(),
        }
    }
}

impl PartialConnectionConfig {
    #[must_use]
    pub fn with_dsn(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dsn.insert(key.into(), Some(value.into()));
        self
    }

    #[must_use]
    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }
}

/// Default, master and slave blocks as they appear in a configuration document.
///
/// ```rust
/// use sql_replica_middleware::prelude::*;
///
/// let cfg = ReplicaConfig::from_json_str(r#"{
///     "default": {"adapter": "sqlite", "dsn": {"database": ":memory:"}},
///     "slaves": {"s1": {}}
/// }"#).unwrap();
/// assert_eq!(cfg.slaves.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    pub default: ConnectionConfig,
    pub masters: IndexMap<String, PartialConnectionConfig>,
    pub slaves: IndexMap<String, PartialConnectionConfig>,
}

impl ReplicaConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` if the document is not valid JSON or does
    /// not have the expected shape.
    pub fn from_json_str(text: &str) -> Result<Self, SqlMiddlewareDbError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Render `"<prefix>:key1=val1;key2=val2"`, skipping null values.
#[must_use]
pub fn render_dsn(prefix: &str, dsn: &DsnMap) -> String {
    let mut out = format!("{prefix}:");
    for (key, value) in dsn {
        if let Some(value) = value {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push(';');
        }
    }
    out.trim_end_matches(';').to_string()
}
