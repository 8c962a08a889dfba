//! Field-name and field-type helpers shared by the request builders

use docsearch_core::entities::{EntityTypeSpec, FieldType};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Field name to every index type any requested entity type declares for it
pub type FieldTypeMap = HashMap<String, BTreeSet<FieldType>>;

pub const KEYWORD_SUFFIX: &str = ".keyword";

/// Fields indexed as keywords regardless of schema
const ALWAYS_KEYWORD_FIELDS: &[&str] = &["urn", "runId", "_index"];

/// Union of the per-entity-type field type sets
///
/// A field declared by several entity types keeps every type any of them
/// declares, so filters can pick a clause shape valid for all of them.
pub fn merge_field_types(entity_types: &[Arc<EntityTypeSpec>]) -> FieldTypeMap {
    let mut merged = FieldTypeMap::new();
    for spec in entity_types {
        for (field, types) in spec.searchable_field_types() {
            merged.entry(field).or_default().extend(types);
        }
    }
    merged
}

/// Fields searched and highlighted by default; always includes the identifier
pub fn default_query_field_names(
    entity_types: &[Arc<EntityTypeSpec>],
    identifier_field: &str,
) -> BTreeSet<String> {
    entity_types
        .iter()
        .flat_map(|spec| spec.default_query_fields())
        .map(|field| field.name.clone())
        .chain(std::iter::once(identifier_field.to_string()))
        .collect()
}

/// Name of the exact-value variant of `field`
///
/// Analyzed fields are matched exactly through their `.keyword` sub-field;
/// keyword-typed fields, sub-fields and well-known keyword fields are used
/// as they are.
pub fn to_keyword_field(field: &str, field_types: &FieldTypeMap) -> String {
    if field.contains('.') || ALWAYS_KEYWORD_FIELDS.contains(&field) {
        return field.to_string();
    }

    let exact = field_types
        .get(field)
        .is_some_and(|types| !types.is_empty() && types.iter().all(|t| t.is_exact()));

    if exact {
        field.to_string()
    } else {
        format!("{field}{KEYWORD_SUFFIX}")
    }
}
