use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::dialect::Dialect;

// `table.col` with a word boundary on both sides.
static QUALIFIED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z_][a-z0-9_]*)\.([a-z_][a-z0-9_]*)\b")
        .expect("qualified-name pattern is valid")
});

/// Quotes identifier names with a dialect's prefix/suffix pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierQuoter {
    prefix: String,
    suffix: String,
}

impl IdentifierQuoter {
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    #[must_use]
    pub fn for_dialect(dialect: Dialect) -> Self {
        let (prefix, suffix) = dialect.ident_quotes();
        Self::new(prefix, suffix)
    }

    /// Quote one identifier spec (table, column, alias, index).
    ///
    /// `a AS b` and `a b` quote the original (which may itself be `table.col`) and the
    /// alias separately; the alias is taken as-is. `table.col` quotes both halves. `*`
    /// is never quoted.
    ///
    /// ```rust
    /// use sql_replica_middleware::prelude::*;
    ///
    /// let q = IdentifierQuoter::for_dialect(Dialect::Mysql);
    /// assert_eq!(q.quote_name("t.col AS c"), "`t`.`col` AS `c`");
    /// assert_eq!(q.quote_name("t.*"), "`t`.*");
    /// ```
    #[must_use]
    pub fn quote_name(&self, spec: &str) -> String {
        let spec = spec.trim();

        // rightmost " AS ", any case; ASCII lowercasing keeps byte offsets
        if let Some(pos) = spec.to_ascii_lowercase().rfind(" as ") {
            if pos > 0 {
                let orig = self.quote_name(&spec[..pos]);
                let alias = self.replace_name(&spec[pos + 4..]);
                return format!("{orig} AS {alias}");
            }
        }

        if let Some(pos) = spec.rfind(' ') {
            if pos > 0 {
                let orig = self.quote_name(&spec[..pos]);
                let alias = self.replace_name(&spec[pos + 1..]);
                return format!("{orig} {alias}");
            }
        }

        if let Some(pos) = spec.rfind('.') {
            if pos > 0 {
                let table = self.replace_name(&spec[..pos]);
                let col = self.replace_name(&spec[pos + 1..]);
                return format!("{table}.{col}");
            }
        }

        self.replace_name(spec)
    }

    /// Quote each spec independently, preserving order.
    pub fn quote_names<I, S>(&self, specs: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        specs
            .into_iter()
            .map(|spec| self.quote_name(spec.as_ref()))
            .collect()
    }

    /// Quote every `table.col` inside an SQL fragment, leaving string literals alone.
    ///
    /// A trailing ` AS alias` in the last non-literal piece is quoted too. This is a
    /// best-effort text transform: comments and dialect-specific escapes are not
    /// understood.
    ///
    /// ```rust
    /// use sql_replica_middleware::prelude::*;
    ///
    /// let q = IdentifierQuoter::for_dialect(Dialect::Pgsql);
    /// assert_eq!(
    ///     q.quote_names_in("t.a = 'x.y' AND t.b = 1"),
    ///     "\"t\".\"a\" = 'x.y' AND \"t\".\"b\" = 1"
    /// );
    /// ```
    #[must_use]
    pub fn quote_names_in(&self, text: &str) -> String {
        let segments = split_literals(text);
        let last = segments.len() - 1;
        let mut out = String::with_capacity(text.len() + 16);

        for (idx, segment) in segments.into_iter().enumerate() {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                // an unmatched quote leaves the rest of the piece alone
                Segment::Sql(sql) if sql.contains(['\'', '"']) => out.push_str(sql),
                Segment::Sql(sql) if idx == last => {
                    let aliased = self.quote_trailing_alias(sql);
                    out.push_str(&self.replace_names_in(&aliased));
                }
                Segment::Sql(sql) => out.push_str(&self.replace_names_in(sql)),
            }
        }

        out
    }

    /// Quote a single raw identifier, with no further parsing.
    #[must_use]
    pub fn replace_name(&self, name: &str) -> String {
        let name = name.trim();
        if name == "*" {
            name.to_string()
        } else {
            format!("{}{}{}", self.prefix, name, self.suffix)
        }
    }

    fn replace_names_in(&self, text: &str) -> String {
        QUALIFIED_NAME
            .replace_all(text, |caps: &Captures<'_>| {
                format!(
                    "{p}{}{s}.{p}{}{s}",
                    &caps[1],
                    &caps[2],
                    p = self.prefix,
                    s = self.suffix
                )
            })
            .into_owned()
    }

    fn quote_trailing_alias(&self, sql: &str) -> String {
        match sql.to_ascii_lowercase().rfind(" as ") {
            Some(pos) if pos > 0 => {
                let alias = self.replace_name(&sql[pos + 4..]);
                format!("{} AS {alias}", &sql[..pos])
            }
            _ => sql.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Sql(&'a str),
    Literal(&'a str),
}

/// Split `text` into alternating SQL and string-literal pieces.
///
/// A literal opens with a run of `'` or `"` (optionally preceded by a backslash) and closes
/// at the nearest identical run, which may be on a later line. The longest opening run is
/// tried first.
/// Always ends with an `Sql` piece, which may be empty.
fn split_literals(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut sql_start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if let Some(end) = match_literal(bytes, idx) {
            segments.push(Segment::Sql(&text[sql_start..idx]));
            segments.push(Segment::Literal(&text[idx..end]));
            idx = end;
            sql_start = end;
        } else {
            idx += 1;
        }
    }

    segments.push(Segment::Sql(&text[sql_start..]));
    segments
}

fn match_literal(bytes: &[u8], start: usize) -> Option<usize> {
    let quote_pos = if bytes[start] == b'\\' { start + 1 } else { start };
    let quote = *bytes.get(quote_pos)?;
    if quote != b'\'' && quote != b'"' {
        return None;
    }

    let mut run = 0;
    while bytes.get(quote_pos + run) == Some(&quote) {
        run += 1;
    }

    for len in (1..=run).rev() {
        let open_end = quote_pos + len;
        let delim = &bytes[start..open_end];
        let mut pos = open_end;
        while pos + delim.len() <= bytes.len() {
            if bytes[pos..].starts_with(delim) {
                return Some(pos + delim.len());
            }
            pos += 1;
        }
    }

    None
}
