//! Matched-field reconciliation
//!
//! A hit explains why it matched in two ways: highlight fragments keyed by
//! the (sub-)field that produced them, and the names of the named queries
//! that matched it. Both are merged into one set of `(field, value)` pairs
//! per entity.

use crate::response::{value_to_string, RawHit};
use docsearch_core::search_models::MatchedField;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Known field a highlight key belongs to
///
/// A key belongs to a known field when that field name is a prefix of the
/// key (`title.delimited` belongs to `title`). When several known fields
/// qualify, the longest one wins.
pub fn resolve_base_field<'a>(key: &str, known_fields: &'a BTreeSet<String>) -> Option<&'a str> {
    known_fields
        .iter()
        .filter(|field| key.starts_with(field.as_str()))
        .max_by_key(|field| field.len())
        .map(String::as_str)
}

pub fn extract_matched_fields(
    hit: &RawHit,
    default_fields: &BTreeSet<String>,
) -> BTreeSet<MatchedField> {
    let mut values_by_field: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (key, fragments) in &hit.highlight {
        match resolve_base_field(key, default_fields) {
            Some(field) => values_by_field
                .entry(field.to_string())
                .or_default()
                .extend(fragments.iter().cloned()),
            None => trace!(key = %key, "Discarding highlight for unknown field"),
        }
    }
    let highlighted = values_by_field.keys().cloned().collect::<BTreeSet<_>>();

    for name in hit.matched_queries.names() {
        if highlighted.contains(name) {
            continue;
        }
        let values = values_by_field.entry(name.to_string()).or_default();
        match hit.fields.get(name).filter(|stored| !stored.is_empty()) {
            Some(stored) => values.extend(stored.iter().map(value_to_string)),
            // matched, but nothing to show for it
            None => {
                values.insert(String::new());
            }
        }
    }

    values_by_field
        .into_iter()
        .flat_map(|(field, values)| {
            values
                .into_iter()
                .map(move |value| MatchedField::new(field.clone(), value))
        })
        .collect()
}
