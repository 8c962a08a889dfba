//! Raw backend response model
//!
//! Mirrors the subset of an Elasticsearch/OpenSearch search response the
//! extractor reads. Every section is optional on the wire; absent sections
//! deserialize to empty values.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub hits: RawHits,

    #[serde(default)]
    pub aggregations: BTreeMap<String, RawAggregation>,

    #[serde(default)]
    pub suggest: BTreeMap<String, Vec<RawSuggestEntry>>,

    /// Session id returned when the request was bound to a point in time
    #[serde(default)]
    pub pit_id: Option<String>,
}

impl RawSearchResponse {
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn total_hits(&self) -> u64 {
        self.hits.total.as_ref().map_or(0, RawTotal::value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHits {
    #[serde(default)]
    pub total: Option<RawTotal>,

    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// Total hit count, either a bare number or `{value, relation}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTotal {
    Count(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

impl RawTotal {
    pub fn value(&self) -> u64 {
        match self {
            RawTotal::Count(value) | RawTotal::Object { value, .. } => *value,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,

    #[serde(rename = "_score", default)]
    pub score: Option<f64>,

    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,

    /// Highlight fragments keyed by (sub-)field name
    #[serde(default)]
    pub highlight: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub matched_queries: MatchedQueries,

    /// Stored/doc-value fields returned alongside the source
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<Value>>,

    #[serde(default)]
    pub sort: Vec<Value>,
}

/// Names of the named queries a hit matched
///
/// Backends return either a plain list or, when query scores are requested,
/// a map from name to score.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MatchedQueries {
    Names(Vec<String>),
    Scored(BTreeMap<String, f64>),
}

impl Default for MatchedQueries {
    fn default() -> Self {
        MatchedQueries::Names(Vec::new())
    }
}

impl MatchedQueries {
    pub fn names(&self) -> Vec<&str> {
        match self {
            MatchedQueries::Names(names) => names.iter().map(String::as_str).collect(),
            MatchedQueries::Scored(scores) => scores.keys().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAggregation {
    #[serde(default)]
    pub buckets: Vec<RawBucket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBucket {
    pub key: Value,
    pub doc_count: u64,
}

impl RawBucket {
    /// Bucket key as text; numeric and boolean keys are stringified
    pub fn key_string(&self) -> String {
        value_to_string(&self.key)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSuggestEntry {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub options: Vec<RawSuggestOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSuggestOption {
    pub text: String,

    #[serde(default)]
    pub freq: u64,

    #[serde(default)]
    pub score: f64,
}

/// Render a JSON scalar the way it reads, without quoting strings
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
