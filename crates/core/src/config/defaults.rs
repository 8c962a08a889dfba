//! Default values and functions for configuration

// Default constants
pub const DEFAULT_IDENTIFIER_FIELD: &str = "urn";
pub const DEFAULT_SOFT_DELETE_FIELD: &str = "removed";
pub const DEFAULT_SUGGESTION_FIELD: &str = "name";

pub(crate) fn default_fulltext() -> bool {
    false
}

pub(crate) fn default_max_agg_values() -> u32 {
    20
}

pub(crate) fn default_skip_cache() -> bool {
    false
}

pub(crate) fn default_skip_aggregates() -> bool {
    false
}

pub(crate) fn default_skip_highlighting() -> bool {
    false
}

pub(crate) fn default_get_suggestions() -> bool {
    false
}

pub(crate) fn default_max_term_bucket_size() -> u32 {
    20
}

pub(crate) fn default_identifier_field() -> String {
    DEFAULT_IDENTIFIER_FIELD.to_string()
}

pub(crate) fn default_soft_delete_field() -> String {
    DEFAULT_SOFT_DELETE_FIELD.to_string()
}

pub(crate) fn default_suggestion_field() -> String {
    DEFAULT_SUGGESTION_FIELD.to_string()
}
