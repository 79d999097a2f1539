//! Collision-free display names for generated subdatasets

use std::collections::HashMap;
use std::fmt::Display;

/// Assign a display name to each raw name, preserving order and length
///
/// The first occurrence of a raw name is kept as is; later occurrences get
/// `" (2)"`, `" (3)"`, ... appended. Counters are keyed by the raw name, so
/// `["A", "A", "A"]` becomes `["A", "A (2)", "A (3)"]`.
///
/// Generated names are not checked against the remaining raw input: a raw
/// list holding `"A"` twice and a literal `"A (2)"` yields `"A (2)"` twice.
/// Registries refuse such a list with a duplicate name error.
pub fn assign_unique_names<I>(raw_names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut counters: HashMap<String, usize> = HashMap::new();
    raw_names
        .into_iter()
        .map(|raw| {
            let name = raw.to_string();
            match counters.get_mut(&name) {
                Some(count) => {
                    *count += 1;
                    format!("{} ({})", name, count)
                }
                None => {
                    counters.insert(name.clone(), 1);
                    name
                }
            }
        })
        .collect()
}
