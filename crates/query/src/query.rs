//! Abstract query model
//!
//! Requests are assembled as plain values and rendered to the backend's
//! JSON query dialect only at the edge, so every builder step stays
//! inspectable in tests.

use docsearch_core::search_models::SortOrder;
use serde_json::{json, Map, Value};

/// Bound of a range clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeOp {
    fn as_str(self) -> &'static str {
        match self {
            RangeOp::Gt => "gt",
            RangeOp::Gte => "gte",
            RangeOp::Lt => "lt",
            RangeOp::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    Bool(BoolQuery),
    /// Exact value match; `name` surfaces in the hit's matched queries
    Term {
        field: String,
        value: Value,
        name: Option<String>,
        boost: Option<f32>,
    },
    Terms {
        field: String,
        values: Vec<String>,
    },
    Match {
        field: String,
        value: Value,
    },
    Range {
        field: String,
        op: RangeOp,
        value: String,
    },
    Wildcard {
        field: String,
        pattern: String,
    },
    Exists {
        field: String,
    },
    SimpleQueryString {
        query: String,
        fields: Vec<String>,
    },
    QueryString {
        query: String,
        fields: Vec<String>,
    },
}

/// Boolean composition of clauses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub filter: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }

    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn must_not(mut self, query: Query) -> Self {
        self.must_not.push(query);
        self
    }

    pub fn minimum_should_match(mut self, count: u32) -> Self {
        self.minimum_should_match = Some(count);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.filter.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (key, clauses) in [
            ("must", &self.must),
            ("filter", &self.filter),
            ("should", &self.should),
            ("must_not", &self.must_not),
        ] {
            if !clauses.is_empty() {
                body.insert(
                    key.to_string(),
                    Value::Array(clauses.iter().map(Query::to_json).collect()),
                );
            }
        }
        if let Some(count) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(count));
        }
        json!({ "bool": body })
    }
}

impl From<BoolQuery> for Query {
    fn from(query: BoolQuery) -> Self {
        Query::Bool(query)
    }
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
            name: None,
            boost: None,
        }
    }

    /// Term clause reported back under `name` when it matches
    pub fn named_term(
        field: impl Into<String>,
        value: impl Into<Value>,
        name: impl Into<String>,
        boost: Option<f32>,
    ) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
            name: Some(name.into()),
            boost,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Bool(bool_query) => bool_query.to_json(),
            Query::Term {
                field,
                value,
                name,
                boost,
            } => {
                let mut body = Map::new();
                body.insert("value".to_string(), value.clone());
                if let Some(name) = name {
                    body.insert("_name".to_string(), json!(name));
                }
                if let Some(boost) = boost {
                    body.insert("boost".to_string(), json!(boost));
                }
                json!({ "term": { field.as_str(): body } })
            }
            Query::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Query::Match { field, value } => json!({ "match": { field.as_str(): value } }),
            Query::Range { field, op, value } => {
                json!({ "range": { field.as_str(): { op.as_str(): value } } })
            }
            Query::Wildcard { field, pattern } => {
                json!({ "wildcard": { field.as_str(): { "value": pattern } } })
            }
            Query::Exists { field } => json!({ "exists": { "field": field } }),
            Query::SimpleQueryString { query, fields } => {
                json!({ "simple_query_string": string_query_body(query, fields) })
            }
            Query::QueryString { query, fields } => {
                json!({ "query_string": string_query_body(query, fields) })
            }
        }
    }
}

/// An empty field list falls back to the index's default fields
fn string_query_body(query: &str, fields: &[String]) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), json!(query));
    if !fields.is_empty() {
        body.insert("fields".to_string(), json!(fields));
    }
    body.insert("default_operator".to_string(), json!("and"));
    Value::Object(body)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub field: String,
    pub order: SortOrder,
}

impl SortClause {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// Terms aggregation bucketing `field` under the name `name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub name: String,
    pub field: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    pub pre_tags: Vec<String>,
    pub post_tags: Vec<String>,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub name: String,
    pub text: String,
    pub field: String,
}

/// Backend session binding for cursor pagination
///
/// `id` is `None` on the first page: the backend client is expected to open
/// a session with `keep_alive` before executing the request. A continuation
/// without a keep-alive stays bound to its session and leaves the
/// session's expiry unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointInTime {
    pub id: Option<String>,
    pub keep_alive: Option<String>,
}

/// Fully assembled search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: Query,
    pub from: Option<usize>,
    pub size: usize,
    /// Source fields to return; `None` returns the whole document
    pub source_includes: Option<Vec<String>>,
    pub sort: Vec<SortClause>,
    pub aggregations: Vec<AggregationRequest>,
    pub highlight: Option<HighlightConfig>,
    pub suggest: Option<SuggestionRequest>,
    pub search_after: Option<Vec<Value>>,
    pub point_in_time: Option<PointInTime>,
}

impl SearchRequest {
    pub fn new(query: Query, size: usize) -> Self {
        Self {
            query,
            from: None,
            size,
            source_includes: None,
            sort: Vec::new(),
            aggregations: Vec::new(),
            highlight: None,
            suggest: None,
            search_after: None,
            point_in_time: None,
        }
    }

    /// Whether the backend client must open a new session before executing
    pub fn requires_new_session(&self) -> bool {
        self.point_in_time
            .as_ref()
            .is_some_and(|pit| pit.id.is_none())
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_json());
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        body.insert("size".to_string(), json!(self.size));

        if let Some(includes) = &self.source_includes {
            body.insert("_source".to_string(), json!({ "includes": includes }));
        }

        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|clause| {
                    json!({ clause.field.as_str(): { "order": clause.order.as_backend_str() } })
                })
                .collect::<Vec<_>>();
            body.insert("sort".to_string(), Value::Array(sort));
        }

        if !self.aggregations.is_empty() {
            let aggs = self
                .aggregations
                .iter()
                .map(|agg| {
                    (
                        agg.name.clone(),
                        json!({ "terms": { "field": agg.field, "size": agg.size } }),
                    )
                })
                .collect::<Map<_, _>>();
            body.insert("aggs".to_string(), Value::Object(aggs));
        }

        if let Some(highlight) = &self.highlight {
            let fields = highlight
                .fields
                .iter()
                .map(|field| (field.clone(), json!({})))
                .collect::<Map<_, _>>();
            body.insert(
                "highlight".to_string(),
                json!({
                    "pre_tags": highlight.pre_tags,
                    "post_tags": highlight.post_tags,
                    "fields": fields,
                }),
            );
        }

        if let Some(suggest) = &self.suggest {
            body.insert(
                "suggest".to_string(),
                json!({
                    suggest.name.as_str(): {
                        "text": suggest.text,
                        "term": { "field": suggest.field },
                    }
                }),
            );
        }

        if let Some(search_after) = &self.search_after {
            body.insert("search_after".to_string(), Value::Array(search_after.clone()));
        }

        if let Some(PointInTime {
            id: Some(id),
            keep_alive,
        }) = &self.point_in_time
        {
            let mut pit = Map::new();
            pit.insert("id".to_string(), json!(id));
            if let Some(keep_alive) = keep_alive {
                pit.insert("keep_alive".to_string(), json!(keep_alive));
            }
            body.insert("pit".to_string(), Value::Object(pit));
        }

        Value::Object(body)
    }
}
