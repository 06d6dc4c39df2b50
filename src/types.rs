use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or bound into a statement.
///
/// The same enum is used for every driver so helpers never branch on driver types:
/// ```rust
/// use sql_replica_middleware::prelude::*;
///
/// let mut data = BindData::new();
/// data.insert("id".into(), RowValues::Int(1));
/// data.insert("name".into(), RowValues::Text("alice".into()));
/// # let _ = data;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Render the value as a map key.
    ///
    /// Keyed fetches (`fetch_assoc`, `fetch_pairs`) index rows by their first column; this is
    /// the text form used for that index. `Null` becomes the empty string.
    #[must_use]
    pub fn to_key_string(&self) -> String {
        match self {
            RowValues::Int(i) => i.to_string(),
            RowValues::Float(f) => f.to_string(),
            RowValues::Text(s) => s.clone(),
            RowValues::Bool(b) => i64::from(*b).to_string(),
            RowValues::Timestamp(dt) => dt.format("%F %T%.f").to_string(),
            RowValues::Null => String::new(),
            RowValues::JSON(j) => j.to_string(),
            RowValues::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

/// Named values for `:name` placeholders, in caller order.
pub type BindData = IndexMap<String, RowValues>;

/// A value to be quoted directly into SQL text.
///
/// A `List` renders as a comma-separated run of quoted values, which is what an
/// `IN (...)` list needs.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteArg {
    Scalar(RowValues),
    List(Vec<RowValues>),
}

impl QuoteArg {
    /// Coerce into a sequence of scalars; a scalar becomes a one-element list.
    #[must_use]
    pub fn into_values(self) -> Vec<RowValues> {
        match self {
            QuoteArg::Scalar(value) => vec![value],
            QuoteArg::List(values) => values,
        }
    }
}

macro_rules! scalar_quote_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for QuoteArg {
                fn from(value: $ty) -> Self {
                    QuoteArg::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_quote_arg!(RowValues, i64, i32, f64, bool, &str, String, NaiveDateTime);

impl<T: Into<RowValues>> From<Vec<T>> for QuoteArg {
    fn from(values: Vec<T>) -> Self {
        QuoteArg::List(values.into_iter().map(Into::into).collect())
    }
}

/// One piece of a compound clause built by `quote_multi`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Text used as-is: no quoting and no placeholder substitution.
    Literal(String),
    /// Text with `?` placeholders and the value(s) quoted into them.
    Bound(String, QuoteArg),
}

impl Condition {
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Condition::Literal(text.into())
    }

    #[must_use]
    pub fn bound(text: impl Into<String>, value: impl Into<QuoteArg>) -> Self {
        Condition::Bound(text.into(), value.into())
    }
}
