//! Text transforms that turn identifiers, values and named placeholders into
//! dialect-correct SQL.
//!
//! - `identifier`: quoting of table/column/alias names, and of `table.col` names inside a
//!   larger fragment without touching string literals
//! - `values`: quoting values straight into text at `?` placeholders
//! - `binder`: matching `:name` placeholders against bind data

pub mod binder;
pub mod identifier;
pub mod values;

pub use binder::{BindPlan, bind_plan};
pub use identifier::IdentifierQuoter;
pub use values::{QuoteScalar, quote, quote_into, quote_multi};
