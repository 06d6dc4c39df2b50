use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{BindData, RowValues};

// `:name` preceded by a non-word character.
static NAMED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\W:([a-zA-Z_][a-zA-Z0-9_]*)").expect("placeholder pattern is valid")
});

/// Ordered `(slot name, value)` pairs ready to hand to a driver statement.
pub type BindPlan = Vec<(String, RowValues)>;

/// Match `:name` placeholders in `sql` against `data`, in text order.
///
/// Placeholders without a data entry are skipped. Drivers number repeated uses of one
/// placeholder as separate slots (`name`, `name2`, `name3`, ...), so the second and later
/// occurrences of a key are planned under those slot names with the same value.
///
/// The scan does not know about string literals; text is expected to carry no `:name`
/// sequences other than real placeholders.
///
/// ```rust
/// use sql_replica_middleware::prelude::*;
///
/// let mut data = BindData::new();
/// data.insert("name".into(), RowValues::Text("x".into()));
/// let plan = bind_plan("SELECT * FROM t WHERE a = :name OR b = :name", &data);
/// let slots: Vec<&str> = plan.iter().map(|(slot, _)| slot.as_str()).collect();
/// assert_eq!(slots, ["name", "name2"]);
/// ```
#[must_use]
pub fn bind_plan(sql: &str, data: &BindData) -> BindPlan {
    if data.is_empty() {
        return Vec::new();
    }

    // trailing newline lets a placeholder at the very end still match
    let text = format!("{sql}\n");
    let mut repeat: HashMap<&str, usize> = HashMap::new();
    let mut plan = Vec::new();

    for caps in NAMED_PLACEHOLDER.captures_iter(&text) {
        let Some(key) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Some(value) = data.get(key) else {
            continue;
        };

        let count = repeat.entry(key).or_insert(0);
        *count += 1;
        let slot = if *count == 1 {
            key.to_string()
        } else {
            format!("{key}{count}")
        };
        plan.push((slot, value.clone()));
    }

    plan
}
