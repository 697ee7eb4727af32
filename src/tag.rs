//! Tag normalization. Stories may declare their tags either as a YAML list
//! or as a single comma-delimited string; both forms normalize to the same
//! ordered list of tag names.

use crate::frontmatter;
use serde_yaml::Value;
use std::collections::BTreeSet;

/// Normalizes a raw `tags` frontmatter value.
///
/// * A string is split on commas; each piece is trimmed and empty pieces are
///   dropped.
/// * A list passes through in order, with each scalar item rendered as text.
/// * Anything absent yields no tags.
pub fn normalize(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect(),
        Some(Value::Sequence(items)) => items.iter().filter_map(frontmatter::text).collect(),
        Some(scalar) => frontmatter::text(scalar).into_iter().collect(),
    }
}

/// Returns the sorted, de-duplicated union of several tag lists.
pub fn union<'a, I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    lists
        .into_iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}
