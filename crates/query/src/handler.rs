//! Search request handler
//!
//! A [`SearchRequestHandler`] is bound to one ordered list of entity types.
//! It precomputes the default query fields, the merged field-type map and
//! the highlighter once, then builds requests and extracts results for any
//! number of concurrent calls without mutating itself.

use crate::aggregation::{AggregationBuilder, TermsAggregationBuilder};
use crate::cursor::ScrollCursor;
use crate::fields::{default_query_field_names, merge_field_types, to_keyword_field, FieldTypeMap};
use crate::filter::{compile_filter_query, FilterCompiler, TermFilterCompiler};
use crate::flags::{EffectiveSearchFlags, FlagResolver};
use crate::keep_alive::KeepAlive;
use crate::matched_fields::extract_matched_fields;
use crate::query::{AggregationRequest, BoolQuery, HighlightConfig, PointInTime, SearchRequest};
use crate::response::{RawHit, RawSearchResponse};
use crate::sort::{DefaultSortOrder, SortOrderBuilder};
use crate::suggestion::{extract_search_suggestions, NameSuggestionBuilder, SuggestionBuilder};
use crate::text_query::{DefaultTextQueryBuilder, TextQueryBuilder};
use docsearch_core::config::{CustomSearchConfig, SearchConfig};
use docsearch_core::entities::EntityTypeSpec;
use docsearch_core::error::{Error, Result};
use docsearch_core::search_models::{
    Filter, ScrollResult, SearchEntity, SearchFlags, SearchResult, SearchResultMetadata,
    SortCriterion, SEARCH_BACKEND_SCORE_FEATURE,
};
use docsearch_core::urn::Urn;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// The pluggable pieces a handler delegates to
#[derive(Clone)]
pub struct Collaborators {
    pub text_query: Arc<dyn TextQueryBuilder>,
    pub filter_compiler: Arc<dyn FilterCompiler>,
    pub aggregation: Arc<dyn AggregationBuilder>,
    pub sort: Arc<dyn SortOrderBuilder>,
    pub suggestion: Arc<dyn SuggestionBuilder>,
}

impl Collaborators {
    pub fn defaults(
        entity_types: &[Arc<EntityTypeSpec>],
        config: &SearchConfig,
        custom: &CustomSearchConfig,
    ) -> Self {
        Self {
            text_query: Arc::new(DefaultTextQueryBuilder::new(
                custom.clone(),
                config.identifier_field.as_str(),
            )),
            filter_compiler: Arc::new(TermFilterCompiler),
            aggregation: Arc::new(TermsAggregationBuilder::new(
                entity_types,
                config.max_term_bucket_size,
            )),
            sort: Arc::new(DefaultSortOrder::new(config.identifier_field.as_str())),
            suggestion: Arc::new(NameSuggestionBuilder::new(config.suggestion_field.as_str())),
        }
    }
}

/// What the caller is searching for, independent of pagination
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchSpec<'a> {
    pub input: &'a str,
    pub filter: Option<&'a Filter>,
    pub sort: Option<&'a SortCriterion>,
    pub flags: Option<&'a SearchFlags>,
    /// `None` requests the default facets, an empty slice requests none
    pub facets: Option<&'a [String]>,
}

impl<'a> SearchSpec<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: &'a Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: &'a SortCriterion) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn flags(mut self, flags: &'a SearchFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn facets(mut self, facets: &'a [String]) -> Self {
        self.facets = Some(facets);
        self
    }
}

/// How a request window is positioned
#[derive(Debug, Clone, Copy)]
enum Pagination<'a> {
    Offset {
        from: usize,
        size: usize,
    },
    Cursor {
        search_after: Option<&'a [Value]>,
        session_id: Option<&'a str>,
        keep_alive: Option<&'a KeepAlive>,
        size: usize,
    },
}

impl Pagination<'_> {
    fn size(&self) -> usize {
        match self {
            Pagination::Offset { size, .. } | Pagination::Cursor { size, .. } => *size,
        }
    }
}

pub struct SearchRequestHandler {
    entity_types: Vec<Arc<EntityTypeSpec>>,
    config: SearchConfig,
    flag_resolver: FlagResolver,
    default_query_fields: BTreeSet<String>,
    field_types: FieldTypeMap,
    highlights: HighlightConfig,
    collaborators: Collaborators,
}

impl SearchRequestHandler {
    /// Handler using the default collaborators
    pub fn new(
        entity_types: Vec<Arc<EntityTypeSpec>>,
        config: SearchConfig,
        custom: &CustomSearchConfig,
    ) -> Self {
        let collaborators = Collaborators::defaults(&entity_types, &config, custom);
        Self::with_collaborators(entity_types, config, collaborators)
    }

    pub fn with_collaborators(
        entity_types: Vec<Arc<EntityTypeSpec>>,
        config: SearchConfig,
        collaborators: Collaborators,
    ) -> Self {
        let default_query_fields =
            default_query_field_names(&entity_types, &config.identifier_field);
        let field_types = merge_field_types(&entity_types);
        let highlights = highlight_config(&default_query_fields);

        Self {
            flag_resolver: FlagResolver::new(config.default_flags),
            entity_types,
            config,
            default_query_fields,
            field_types,
            highlights,
            collaborators,
        }
    }

    pub fn entity_types(&self) -> &[Arc<EntityTypeSpec>] {
        &self.entity_types
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn default_query_fields(&self) -> &BTreeSet<String> {
        &self.default_query_fields
    }

    pub fn field_types(&self) -> &FieldTypeMap {
        &self.field_types
    }

    pub fn highlights(&self) -> &HighlightConfig {
        &self.highlights
    }

    pub fn resolve_flags(&self, flags: Option<&SearchFlags>, input: &str) -> EffectiveSearchFlags {
        self.flag_resolver.resolve(flags, input)
    }

    /// Compiled filter including the soft-delete exclusion
    pub fn get_filter_query(&self, filter: Option<&Filter>) -> Result<BoolQuery> {
        compile_filter_query(
            self.collaborators.filter_compiler.as_ref(),
            filter,
            &self.field_types,
            &self.config.soft_delete_field,
        )
    }

    /// Offset-paginated request for the window `[from, from + size)`
    pub fn build_request(&self, spec: SearchSpec<'_>, from: usize, size: usize) -> Result<SearchRequest> {
        self.assemble(spec, Pagination::Offset { from, size })
    }

    /// Cursor-paginated request
    ///
    /// The first page passes neither `search_after` nor `session_id`; with a
    /// keep-alive the returned request asks the backend client to open a new
    /// session. A session id is always bound, with or without a keep-alive.
    pub fn build_scroll_request(
        &self,
        spec: SearchSpec<'_>,
        search_after: Option<&[Value]>,
        session_id: Option<&str>,
        keep_alive: Option<&str>,
        size: usize,
    ) -> Result<SearchRequest> {
        let keep_alive = self.parse_keep_alive(keep_alive)?;
        self.assemble(
            spec,
            Pagination::Cursor {
                search_after,
                session_id,
                keep_alive: keep_alive.as_ref(),
                size,
            },
        )
    }

    /// Cursor-paginated request continuing from an encoded cursor token
    pub fn build_scroll_request_from_token(
        &self,
        spec: SearchSpec<'_>,
        token: Option<&str>,
        keep_alive: Option<&str>,
        size: usize,
    ) -> Result<SearchRequest> {
        self.build_scroll_request_from_token_at(spec, token, keep_alive, size, now_millis())
    }

    pub fn build_scroll_request_from_token_at(
        &self,
        spec: SearchSpec<'_>,
        token: Option<&str>,
        keep_alive: Option<&str>,
        size: usize,
        now_ms: i64,
    ) -> Result<SearchRequest> {
        let cursor = token.map(ScrollCursor::decode).transpose()?;
        let session_id = cursor.as_ref().and_then(|cursor| {
            let live = cursor.live_session_id(now_ms);
            if live.is_none() && cursor.pit_id().is_some() {
                debug!("Scroll session is about to expire, opening a new one");
            }
            live
        });
        self.build_scroll_request(
            spec,
            cursor.as_ref().map(ScrollCursor::sort),
            session_id,
            keep_alive,
            size,
        )
    }

    /// Filter-only request: no text query, aggregations or highlighting
    pub fn build_filter_request(
        &self,
        filter: Option<&Filter>,
        sort: Option<&SortCriterion>,
        from: usize,
        size: usize,
    ) -> Result<SearchRequest> {
        let mut request = SearchRequest::new(self.get_filter_query(filter)?.into(), size);
        request.from = Some(from);
        request.source_includes = Some(vec![self.config.identifier_field.clone()]);
        self.collaborators
            .sort
            .apply_sort(&mut request, sort, &self.entity_types)?;

        debug!("Built filter request: from={from}, size={size}");
        Ok(request)
    }

    /// Aggregation-only request returning no hits
    ///
    /// Fields the schema declares are bucketed on their exact variant;
    /// undeclared fields are assumed to be keyword-mapped already.
    pub fn build_aggregation_request(
        &self,
        field: &str,
        filter: Option<&Filter>,
        limit: u32,
    ) -> Result<SearchRequest> {
        let bucket_field = if self.field_types.contains_key(field) {
            to_keyword_field(field, &self.field_types)
        } else {
            field.to_string()
        };

        let mut request = SearchRequest::new(self.get_filter_query(filter)?.into(), 0);
        request.aggregations = vec![AggregationRequest {
            name: field.to_string(),
            field: bucket_field,
            size: limit,
        }];

        debug!("Built aggregation request on '{field}' capped at {limit} buckets");
        Ok(request)
    }

    fn assemble(&self, spec: SearchSpec<'_>, pagination: Pagination<'_>) -> Result<SearchRequest> {
        let flags = self.flag_resolver.resolve(spec.flags, spec.input);

        let text_query = self.collaborators.text_query.build_text_query(
            &self.entity_types,
            spec.input,
            flags.fulltext,
        );
        let filter_query = self.get_filter_query(spec.filter)?;
        let query = BoolQuery::new()
            .must(text_query)
            .filter(filter_query.into());

        let mut request = SearchRequest::new(query.into(), pagination.size());
        request.source_includes = Some(vec![self.config.identifier_field.clone()]);

        match pagination {
            Pagination::Offset { from, .. } => request.from = Some(from),
            Pagination::Cursor {
                search_after,
                session_id,
                keep_alive,
                ..
            } => {
                // an empty tuple cannot be matched against the sort clauses
                request.search_after = search_after
                    .filter(|values| !values.is_empty())
                    .map(<[Value]>::to_vec);
                let keep_alive = keep_alive.map(KeepAlive::to_string);
                request.point_in_time = match (session_id, keep_alive) {
                    (Some(id), keep_alive) => Some(PointInTime {
                        id: Some(id.to_string()),
                        keep_alive,
                    }),
                    (None, Some(keep_alive)) => Some(PointInTime {
                        id: None,
                        keep_alive: Some(keep_alive),
                    }),
                    (None, None) => None,
                };
            }
        }

        let wants_aggregations = !flags.skip_aggregates && spec.facets.map_or(true, |f| !f.is_empty());
        if wants_aggregations {
            request.aggregations = self
                .collaborators
                .aggregation
                .build_aggregation_requests(spec.facets, flags.max_agg_values)?;
        }

        if !flags.skip_highlighting {
            request.highlight = Some(self.highlights.clone());
        }

        self.collaborators
            .sort
            .apply_sort(&mut request, spec.sort, &self.entity_types)?;

        // Suggestions are only offered on offset pages
        if matches!(pagination, Pagination::Offset { .. }) && flags.get_suggestions {
            self.collaborators
                .suggestion
                .attach_name_suggestion(&mut request, spec.input);
        }

        debug!(
            "Built {} request: size={}, aggregations={}, highlight={}",
            if request.from.is_some() { "offset" } else { "scroll" },
            request.size,
            request.aggregations.len(),
            request.highlight.is_some()
        );
        Ok(request)
    }

    fn parse_keep_alive(&self, keep_alive: Option<&str>) -> Result<Option<KeepAlive>> {
        keep_alive
            .or(self.config.default_keep_alive.as_deref())
            .map(KeepAlive::parse)
            .transpose()
    }

    /// Typed offset page
    pub fn extract_result(
        &self,
        response: &RawSearchResponse,
        filter: Option<&Filter>,
        from: usize,
        size: usize,
    ) -> Result<SearchResult> {
        Ok(SearchResult {
            entities: self.extract_entities(response)?,
            metadata: self.extract_metadata(response, filter)?,
            from,
            page_size: size,
            num_entities: response.total_hits(),
        })
    }

    /// Typed cursor page with the cursor for the next one
    ///
    /// A next cursor is attached whenever the page is full. A full final
    /// page therefore yields one more, empty, page before the end is seen.
    pub fn extract_scroll_result(
        &self,
        response: &RawSearchResponse,
        filter: Option<&Filter>,
        prior_cursor: Option<&ScrollCursor>,
        keep_alive: Option<&str>,
        size: usize,
        supports_session: bool,
    ) -> Result<ScrollResult> {
        self.extract_scroll_result_at(
            response,
            filter,
            prior_cursor,
            keep_alive,
            size,
            supports_session,
            now_millis(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn extract_scroll_result_at(
        &self,
        response: &RawSearchResponse,
        filter: Option<&Filter>,
        prior_cursor: Option<&ScrollCursor>,
        keep_alive: Option<&str>,
        size: usize,
        supports_session: bool,
        now_ms: i64,
    ) -> Result<ScrollResult> {
        let keep_alive = self.parse_keep_alive(keep_alive)?;
        let entities = self.extract_entities(response)?;
        let metadata = self.extract_metadata(response, filter)?;

        let hits = &response.hits.hits;
        let scroll_id = match hits.last() {
            Some(last) if hits.len() == size => {
                let (pit_id, expiration_time) = if supports_session {
                    let pit_id = response
                        .pit_id
                        .clone()
                        .or_else(|| prior_cursor.and_then(|c| c.pit_id()).map(str::to_string));
                    let expiration_time = keep_alive
                        .as_ref()
                        .map_or(0, |keep_alive| now_ms.saturating_add(keep_alive.as_millis()));
                    (pit_id, expiration_time)
                } else {
                    if keep_alive.is_some() {
                        warn!("Backend does not support scroll sessions, ignoring keep-alive");
                    }
                    (None, 0)
                };

                if last.sort.is_empty() {
                    return Err(Error::corruption(
                        "last hit of a full page carries no sort values",
                    ));
                }
                let cursor = ScrollCursor::new(last.sort.clone(), pit_id, expiration_time)?;
                Some(cursor.encode()?)
            }
            _ => None,
        };

        Ok(ScrollResult {
            entities,
            metadata,
            page_size: size,
            num_entities: response.total_hits(),
            scroll_id,
        })
    }

    fn extract_entities(&self, response: &RawSearchResponse) -> Result<Vec<SearchEntity>> {
        response
            .hits
            .hits
            .iter()
            .map(|hit| self.extract_entity(hit))
            .collect()
    }

    fn extract_entity(&self, hit: &RawHit) -> Result<SearchEntity> {
        let identifier_field = &self.config.identifier_field;
        let raw = hit
            .source
            .get(identifier_field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::corruption(format!(
                    "hit {} has no string '{identifier_field}' field",
                    hit.id.as_deref().unwrap_or("<unknown>")
                ))
            })?;
        let entity = raw.parse::<Urn>().map_err(|e| {
            Error::corruption(format!("hit has a malformed identifier '{raw}': {e}"))
        })?;

        let score = hit.score.unwrap_or(0.0);
        Ok(SearchEntity {
            entity,
            matched_fields: extract_matched_fields(hit, &self.default_query_fields),
            score,
            features: BTreeMap::from([(SEARCH_BACKEND_SCORE_FEATURE.to_string(), score)]),
        })
    }

    fn extract_metadata(
        &self,
        response: &RawSearchResponse,
        filter: Option<&Filter>,
    ) -> Result<SearchResultMetadata> {
        Ok(SearchResultMetadata {
            aggregations: self
                .collaborators
                .aggregation
                .extract_aggregation_metadata(response, filter)?,
            suggestions: extract_search_suggestions(response),
        })
    }
}

impl std::fmt::Debug for SearchRequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRequestHandler")
            .field(
                "entity_types",
                &self.entity_types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            )
            .field("default_query_fields", &self.default_query_fields)
            .finish_non_exhaustive()
    }
}

/// Raw values, no markup, for every default field and its sub-fields
fn highlight_config(default_query_fields: &BTreeSet<String>) -> HighlightConfig {
    HighlightConfig {
        pre_tags: vec![String::new()],
        post_tags: vec![String::new()],
        fields: default_query_fields
            .iter()
            .flat_map(|field| [field.clone(), format!("{field}.*")])
            .collect(),
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
