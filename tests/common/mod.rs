#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sql_replica_middleware::prelude::*;

/// Driver that opens nothing and records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub opened: Mutex<Vec<String>>,
    pub executed: Arc<Mutex<Vec<(String, Vec<(String, RowValues)>)>>>,
    pub fail_opens: AtomicUsize,
}

impl RecordingDriver {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn executed(&self) -> Vec<(String, Vec<(String, RowValues)>)> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    async fn open(
        &self,
        dsn: &str,
        _username: Option<&str>,
        _password: Option<&str>,
        _options: &OptionsMap,
    ) -> Result<Box<dyn DriverConnection>, SqlMiddlewareDbError> {
        if self
            .fail_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SqlMiddlewareDbError::ConnectionError(format!(
                "refused {dsn}"
            )));
        }
        self.opened.lock().unwrap().push(dsn.to_string());
        Ok(Box::new(RecordingConnection {
            executed: Arc::clone(&self.executed),
        }))
    }
}

struct RecordingConnection {
    executed: Arc<Mutex<Vec<(String, Vec<(String, RowValues)>)>>>,
}

#[async_trait]
impl DriverConnection for RecordingConnection {
    async fn prepare(&self, sql: &str) -> Result<Box<dyn DriverStatement>, SqlMiddlewareDbError> {
        Ok(Box::new(RecordingStatement {
            sql: sql.to_string(),
            binds: Vec::new(),
            executed: Arc::clone(&self.executed),
        }))
    }

    async fn quote_scalar(&self, value: &RowValues) -> Result<String, SqlMiddlewareDbError> {
        Ok(match value {
            RowValues::Null => "NULL".to_string(),
            RowValues::Int(i) => i.to_string(),
            other => format!("'{}'", other.to_key_string().replace('\'', "''")),
        })
    }

    async fn last_insert_id(&self) -> Result<String, SqlMiddlewareDbError> {
        Ok("0".to_string())
    }
}

struct RecordingStatement {
    sql: String,
    binds: Vec<(String, RowValues)>,
    executed: Arc<Mutex<Vec<(String, Vec<(String, RowValues)>)>>>,
}

#[async_trait]
impl DriverStatement for RecordingStatement {
    fn query_string(&self) -> &str {
        &self.sql
    }

    fn bind_value(&mut self, name: &str, value: RowValues) -> Result<(), SqlMiddlewareDbError> {
        self.binds.push((name.to_string(), value));
        Ok(())
    }

    async fn execute(&mut self) -> Result<(), SqlMiddlewareDbError> {
        self.executed
            .lock()
            .unwrap()
            .push((self.sql.clone(), self.binds.clone()));
        Ok(())
    }

    fn column_names(&self) -> Option<Arc<Vec<String>>> {
        None
    }

    fn fetch_row(&mut self) -> Option<CustomDbRow> {
        None
    }

    fn row_count(&self) -> usize {
        1
    }
}

pub fn host(name: &str) -> PartialConnectionConfig {
    PartialConnectionConfig::default().with_dsn("host", format!("{name}.example.com"))
}

/// Factory with a `mock` adapter speaking the MySQL dialect.
pub fn mock_factory(driver: Arc<RecordingDriver>) -> ConnectionFactory {
    ConnectionFactory::empty().with_adapter("mock", Dialect::Mysql, driver)
}

pub fn default_config() -> ConnectionConfig {
    ConnectionConfig::new("mock")
        .with_dsn("host", "default.example.com")
        .with_dsn("dbname", "test")
}
