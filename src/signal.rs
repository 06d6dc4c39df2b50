use crate::connection::Connection;
use crate::driver::DriverStatement;
use crate::types::BindData;

/// Notifications fired around connect and query.
///
/// Hooks observe only; they cannot change or stop the operation.
pub trait ConnectionSignal: Send + Sync {
    fn pre_connect(&self, _conn: &Connection) {}

    fn post_connect(&self, _conn: &Connection) {}

    fn pre_query(&self, _conn: &Connection, _sql: &str, _data: &BindData) {}

    fn post_query(&self, _conn: &Connection, _stmt: &dyn DriverStatement) {}
}

/// Signal hook that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSignal;

impl ConnectionSignal for NoopSignal {}
