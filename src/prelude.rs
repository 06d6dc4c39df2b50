//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{
    ConnectionConfig, ConnectionParams, DsnMap, OptionsMap, PartialConnectionConfig,
    ReplicaConfig, render_dsn,
};
pub use crate::connection::Connection;
pub use crate::dialect::{ColumnInfo, Dialect, LimitOffset, OffsetFetch, TrailingLimitOffset};
pub use crate::driver::{Driver, DriverConnection, DriverStatement, StatementHandle};
pub use crate::error::SqlMiddlewareDbError;
pub use crate::factory::{Adapter, ConnectionFactory};
pub use crate::manager::{ConnectionManager, ConnectionRole};
pub use crate::quoting::{BindPlan, IdentifierQuoter, QuoteScalar, bind_plan};
pub use crate::random::{RandomSource, RngSource, SequenceSource};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::select::{QuerySpec, SelectStatement, SimpleSelect};
pub use crate::signal::{ConnectionSignal, NoopSignal};
pub use crate::types::{BindData, Condition, QuoteArg, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteDriver;
