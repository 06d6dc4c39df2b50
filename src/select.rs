use std::fmt;

/// What the connection needs from a query builder: a rendered body plus paging fields.
///
/// Paging is rendered by the connection's dialect, so `body` must not include it.
pub trait SelectStatement: Send + Sync + fmt::Debug {
    /// The statement text without LIMIT/OFFSET.
    fn body(&self) -> String;
    /// Row limit; zero means none.
    fn limit(&self) -> u64;
    /// Row offset; zero means none.
    fn offset(&self) -> u64;
    fn set_limit(&mut self, limit: u64);
}

/// A SELECT whose body is already written as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleSelect {
    pub body: String,
    pub limit: u64,
    pub offset: u64,
}

impl SimpleSelect {
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

impl SelectStatement for SimpleSelect {
    fn body(&self) -> String {
        self.body.clone()
    }

    fn limit(&self) -> u64 {
        self.limit
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
    }
}

/// Either literal SQL text or a query builder to be rendered by the connection.
#[derive(Debug)]
pub enum QuerySpec {
    Text(String),
    Select(Box<dyn SelectStatement>),
}

impl QuerySpec {
    /// Force a one-row limit on builders; text is left alone.
    pub(crate) fn limit_one(&mut self) {
        if let QuerySpec::Select(select) = self {
            select.set_limit(1);
        }
    }
}

impl From<&str> for QuerySpec {
    fn from(text: &str) -> Self {
        QuerySpec::Text(text.to_string())
    }
}

impl From<String> for QuerySpec {
    fn from(text: String) -> Self {
        QuerySpec::Text(text)
    }
}

impl From<&String> for QuerySpec {
    fn from(text: &String) -> Self {
        QuerySpec::Text(text.clone())
    }
}

impl From<SimpleSelect> for QuerySpec {
    fn from(select: SimpleSelect) -> Self {
        QuerySpec::Select(Box::new(select))
    }
}

impl From<Box<dyn SelectStatement>> for QuerySpec {
    fn from(select: Box<dyn SelectStatement>) -> Self {
        QuerySpec::Select(select)
    }
}
