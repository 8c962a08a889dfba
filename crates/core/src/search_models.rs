//! Request and response models for search operations
//!
//! These types form the public contract between callers, the query layer
//! and its front ends.

use crate::urn::Urn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum_macros::{Display, EnumString};

/// Feature key under which the backend relevance score is reported
pub const SEARCH_BACKEND_SCORE_FEATURE: &str = "SEARCH_BACKEND_SCORE";

/// Caller-supplied search flags
///
/// Every field is optional; unset fields are filled in by the flag resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchFlags {
    pub fulltext: Option<bool>,
    pub max_agg_values: Option<u32>,
    pub skip_cache: Option<bool>,
    pub skip_aggregates: Option<bool>,
    pub skip_highlighting: Option<bool>,
    pub get_suggestions: Option<bool>,
}

impl SearchFlags {
    pub fn fulltext(mut self, value: bool) -> Self {
        self.fulltext = Some(value);
        self
    }

    pub fn max_agg_values(mut self, value: u32) -> Self {
        self.max_agg_values = Some(value);
        self
    }

    pub fn skip_cache(mut self, value: bool) -> Self {
        self.skip_cache = Some(value);
        self
    }

    pub fn skip_aggregates(mut self, value: bool) -> Self {
        self.skip_aggregates = Some(value);
        self
    }

    pub fn skip_highlighting(mut self, value: bool) -> Self {
        self.skip_highlighting = Some(value);
        self
    }

    pub fn get_suggestions(mut self, value: bool) -> Self {
        self.get_suggestions = Some(value);
        self
    }
}

/// Comparison applied by a filter criterion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    #[default]
    Equal,
    In,
    Contain,
    StartWith,
    EndWith,
    Exists,
    IsNull,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
}

/// A single field/value condition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Criterion {
    pub field: String,

    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default)]
    pub condition: Condition,

    #[serde(default)]
    pub negated: bool,
}

impl Criterion {
    pub fn new(field: impl Into<String>, condition: Condition, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            values,
            condition,
            negated: false,
        }
    }

    /// Shorthand for an `EQUAL` criterion on a single value
    pub fn equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Condition::Equal, vec![value.into()])
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

/// A conjunction of criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConjunctiveCriterion {
    #[serde(default)]
    pub and: Vec<Criterion>,
}

/// Boolean predicate tree in disjunctive normal form
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub or: Vec<ConjunctiveCriterion>,
}

impl Filter {
    /// Filter consisting of a single conjunction
    pub fn all_of(criteria: Vec<Criterion>) -> Self {
        Self {
            or: vec![ConjunctiveCriterion { and: criteria }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.criteria().next().is_none()
    }

    pub fn criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.or.iter().flat_map(|conjunction| conjunction.and.iter())
    }

    /// Whether any criterion constrains `field` or its `.keyword` sub-field
    pub fn references_field(&self, field: &str) -> bool {
        self.criteria().any(|criterion| {
            criterion.field == field
                || criterion
                    .field
                    .strip_prefix(field)
                    .is_some_and(|rest| rest == ".keyword")
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Backend spelling of the direction
    pub fn as_backend_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// A (field, value) pair explaining why an entity matched
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchedField {
    pub name: String,
    pub value: String,
}

impl MatchedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One entity in a search result page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntity {
    pub entity: Urn,
    pub matched_fields: BTreeSet<MatchedField>,
    pub score: f64,
    pub features: BTreeMap<String, f64>,
}

/// Spelling correction offered by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub text: String,
    pub frequency: u64,
    pub score: f64,
}

/// One bucket value of a facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValue {
    pub value: String,
    pub facet_count: u64,
    /// Whether the caller's filter already selects this value
    pub filtered: bool,
}

/// Bucketed counts for one facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationMetadata {
    pub name: String,
    pub display_name: String,
    pub aggregations: BTreeMap<String, u64>,
    pub filter_values: Vec<FilterValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultMetadata {
    pub aggregations: Vec<AggregationMetadata>,
    pub suggestions: Vec<SearchSuggestion>,
}

/// Result of an offset-paginated search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub entities: Vec<SearchEntity>,
    pub metadata: SearchResultMetadata,
    pub from: usize,
    pub page_size: usize,
    pub num_entities: u64,
}

/// Result of a cursor-paginated search
///
/// `scroll_id` is absent once the backend returned a short page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollResult {
    pub entities: Vec<SearchEntity>,
    pub metadata: SearchResultMetadata,
    pub page_size: usize,
    pub num_entities: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,
}
