use async_trait::async_trait;

use crate::error::SqlMiddlewareDbError;
use crate::types::{Condition, QuoteArg, RowValues};

/// Native scalar quoting, safe for the connection's charset and dialect.
#[async_trait]
pub trait QuoteScalar: Send + Sync {
    /// Quote one scalar as an SQL literal.
    ///
    /// # Errors
    /// Returns an error if the underlying connection cannot be established or refuses the value.
    async fn quote_scalar(&self, value: &RowValues) -> Result<String, SqlMiddlewareDbError>;
}

/// Quote a value; a list quotes each element and joins them with `", "`.
///
/// # Errors
/// Propagates errors from the scalar quoter.
pub async fn quote<Q>(quoter: &Q, value: &QuoteArg) -> Result<String, SqlMiddlewareDbError>
where
    Q: QuoteScalar + ?Sized,
{
    match value {
        QuoteArg::Scalar(scalar) => quoter.quote_scalar(scalar).await,
        QuoteArg::List(values) => {
            let mut quoted = Vec::with_capacity(values.len());
            for v in values {
                quoted.push(quoter.quote_scalar(v).await?);
            }
            Ok(quoted.join(", "))
        }
    }
}

/// Quote `data` into `text` at `?` placeholders.
///
/// With one placeholder, `data` is quoted whole (a list becomes an `IN` list). With several,
/// `data` is treated as a sequence and its values fill the placeholders left to right;
/// scanning resumes after each inserted value, so a `?` inside a quoted value is never
/// taken as the next placeholder.
///
/// # Errors
/// Returns `SqlMiddlewareDbError::NotEnoughValues` if there are more placeholders than
/// values, or propagates errors from the scalar quoter.
pub async fn quote_into<Q>(
    quoter: &Q,
    text: &str,
    data: QuoteArg,
) -> Result<String, SqlMiddlewareDbError>
where
    Q: QuoteScalar + ?Sized,
{
    let count = text.matches('?').count();
    if count == 0 {
        return Ok(text.to_string());
    }

    if count == 1 {
        let quoted = quote(quoter, &data).await?;
        return Ok(text.replacen('?', &quoted, 1));
    }

    let values = data.into_values();
    if values.len() < count {
        return Err(SqlMiddlewareDbError::NotEnoughValues {
            placeholders: count,
            values: values.len(),
        });
    }

    let mut text = text.to_string();
    let mut offset = 0;
    for value in &values {
        let Some(found) = text[offset..].find('?') else {
            break;
        };
        let pos = offset + found;
        let quoted = quoter.quote_scalar(value).await?;
        text.replace_range(pos..=pos, &quoted);
        offset = pos + quoted.len();
    }

    Ok(text)
}

/// Build a compound clause from conditions joined by `separator`.
///
/// `Condition::Literal` text is used as-is; `Condition::Bound` text goes through
/// `quote_into` with its value.
///
/// # Errors
/// Propagates errors from `quote_into`.
pub async fn quote_multi<Q>(
    quoter: &Q,
    conditions: &[Condition],
    separator: &str,
) -> Result<String, SqlMiddlewareDbError>
where
    Q: QuoteScalar + ?Sized,
{
    let mut parts = Vec::with_capacity(conditions.len());
    for condition in conditions {
        match condition {
            Condition::Literal(text) => parts.push(text.clone()),
            Condition::Bound(text, value) => {
                parts.push(quote_into(quoter, text, value.clone()).await?);
            }
        }
    }
    Ok(parts.join(separator))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-quotes everything, doubling embedded quotes.
    struct AnsiQuoter;

    #[async_trait]
    impl QuoteScalar for AnsiQuoter {
        async fn quote_scalar(&self, value: &RowValues) -> Result<String, SqlMiddlewareDbError> {
            Ok(format!("'{}'", value.to_key_string().replace('\'', "''")))
        }
    }

    #[tokio::test]
    async fn quotes_scalars_and_lists() {
        let q = AnsiQuoter;
        assert_eq!(quote(&q, &QuoteArg::from(5)).await.unwrap(), "'5'");
        assert_eq!(quote(&q, &QuoteArg::from("it's")).await.unwrap(), "'it''s'");
        assert_eq!(
            quote(&q, &QuoteArg::from(vec!["a", "b", "c"])).await.unwrap(),
            "'a', 'b', 'c'"
        );
    }

    #[tokio::test]
    async fn no_placeholder_returns_text() {
        let out = quote_into(&AnsiQuoter, "WHERE 1 = 1", 5.into()).await.unwrap();
        assert_eq!(out, "WHERE 1 = 1");
    }

    #[tokio::test]
    async fn single_placeholder_takes_whole_value() {
        let q = AnsiQuoter;
        assert_eq!(
            quote_into(&q, "WHERE id = ?", 5.into()).await.unwrap(),
            "WHERE id = '5'"
        );
        assert_eq!(
            quote_into(&q, "WHERE id IN (?)", vec![1, 2, 3].into())
                .await
                .unwrap(),
            "WHERE id IN ('1', '2', '3')"
        );
    }

    #[tokio::test]
    async fn multiple_placeholders_in_order() {
        let out = quote_into(&AnsiQuoter, "a=? AND b=?", vec![1, 2].into())
            .await
            .unwrap();
        assert_eq!(out, "a='1' AND b='2'");
    }

    #[tokio::test]
    async fn extra_values_are_ignored() {
        let out = quote_into(&AnsiQuoter, "a=? AND b=?", vec![1, 2, 3].into())
            .await
            .unwrap();
        assert_eq!(out, "a='1' AND b='2'");
    }

    #[tokio::test]
    async fn question_mark_inside_value_is_not_a_placeholder() {
        let out = quote_into(&AnsiQuoter, "a=? AND b=?", vec!["what?", "x"].into())
            .await
            .unwrap();
        assert_eq!(out, "a='what?' AND b='x'");
    }

    #[tokio::test]
    async fn not_enough_values() {
        let err = quote_into(&AnsiQuoter, "a=? AND b=?", vec![1].into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SqlMiddlewareDbError::NotEnoughValues {
                placeholders: 2,
                values: 1
            }
        ));

        let err = quote_into(&AnsiQuoter, "a=? AND b=?", 1.into())
            .await
            .unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::NotEnoughValues { .. }));
    }

    #[tokio::test]
    async fn multi_mixes_literals_and_bound_text() {
        let conditions = vec![
            Condition::bound("date > ?", "2005-01-01"),
            Condition::literal("deleted = 0"),
            Condition::bound("type IN (?)", vec!["a", "b"]),
        ];
        let out = quote_multi(&AnsiQuoter, &conditions, " AND ").await.unwrap();
        assert_eq!(
            out,
            "date > '2005-01-01' AND deleted = 0 AND type IN ('a', 'b')"
        );
    }
}
