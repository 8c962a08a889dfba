//! Command implementations
//!
//! Every command reads its inputs from JSON files, runs one handler
//! operation and returns the JSON to print.

use anyhow::{Context, Result};
use clap::Args;
use docsearch_core::entities::EntityTypeSpec;
use docsearch_core::search_models::{Filter, SearchFlags, SortCriterion, SortOrder};
use docsearch_query::{
    HandlerRegistry, RawSearchResponse, ScrollCursor, SearchRequestHandler, SearchSpec,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Search intent shared by the request-building commands
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Free-text input; empty or `*` matches everything
    #[arg(short, long, default_value = "")]
    pub input: String,

    /// Filter JSON file
    #[arg(long, value_name = "FILE")]
    pub filter: Option<PathBuf>,

    /// Field to sort by instead of relevance
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending (with --sort)
    #[arg(long)]
    pub descending: bool,

    /// Facets to aggregate, comma separated; defaults to the schema's facets
    #[arg(long, value_delimiter = ',', conflicts_with = "no_facets")]
    pub facets: Option<Vec<String>>,

    /// Request no aggregations at all
    #[arg(long)]
    pub no_facets: bool,

    #[arg(long)]
    pub fulltext: Option<bool>,

    #[arg(long)]
    pub max_agg_values: Option<u32>,

    #[arg(long)]
    pub skip_aggregates: Option<bool>,

    #[arg(long)]
    pub skip_highlighting: Option<bool>,

    #[arg(long)]
    pub suggestions: Option<bool>,
}

impl QueryArgs {
    fn flags(&self) -> SearchFlags {
        SearchFlags {
            fulltext: self.fulltext,
            max_agg_values: self.max_agg_values,
            skip_cache: None,
            skip_aggregates: self.skip_aggregates,
            skip_highlighting: self.skip_highlighting,
            get_suggestions: self.suggestions,
        }
    }

    fn sort_criterion(&self) -> Option<SortCriterion> {
        let order = if self.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        self.sort
            .as_ref()
            .map(|field| SortCriterion::new(field.as_str(), order))
    }
}

/// Owned pieces a [`SearchSpec`] borrows from
struct ResolvedQuery {
    filter: Option<Filter>,
    sort: Option<SortCriterion>,
    flags: SearchFlags,
    facets: Option<Vec<String>>,
}

impl ResolvedQuery {
    fn load(args: &QueryArgs) -> Result<Self> {
        let facets = if args.no_facets {
            Some(Vec::new())
        } else {
            args.facets.clone()
        };
        Ok(Self {
            filter: load_filter(args.filter.as_deref())?,
            sort: args.sort_criterion(),
            flags: args.flags(),
            facets,
        })
    }

    fn spec<'a>(&'a self, input: &'a str) -> SearchSpec<'a> {
        SearchSpec {
            input,
            filter: self.filter.as_ref(),
            sort: self.sort.as_ref(),
            flags: Some(&self.flags),
            facets: self.facets.as_deref(),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {what} file {}", path.display()))
}

/// Entity types from a JSON array of entity type schemas
pub fn load_entity_types(path: &Path) -> Result<Vec<Arc<EntityTypeSpec>>> {
    let specs: Vec<EntityTypeSpec> = read_json(path, "schema")?;
    if specs.is_empty() {
        anyhow::bail!("Schema file {} declares no entity types", path.display());
    }
    debug!("Loaded {} entity types from {}", specs.len(), path.display());
    Ok(specs.into_iter().map(Arc::new).collect())
}

pub fn load_filter(path: Option<&Path>) -> Result<Option<Filter>> {
    path.map(|path| read_json(path, "filter")).transpose()
}

pub fn load_response(path: &Path) -> Result<RawSearchResponse> {
    read_json(path, "response")
}

pub fn handler_for(registry: &HandlerRegistry, schema: &Path) -> Result<Arc<SearchRequestHandler>> {
    let entity_types = load_entity_types(schema)?;
    Ok(registry.get_handler(&entity_types, None))
}

pub fn build_request(
    handler: &SearchRequestHandler,
    args: &QueryArgs,
    from: usize,
    size: usize,
) -> Result<Value> {
    let query = ResolvedQuery::load(args)?;
    let request = handler.build_request(query.spec(&args.input), from, size)?;
    Ok(request.to_json())
}

pub fn build_scroll_request(
    handler: &SearchRequestHandler,
    args: &QueryArgs,
    cursor: Option<&str>,
    keep_alive: Option<&str>,
    size: usize,
) -> Result<Value> {
    let query = ResolvedQuery::load(args)?;
    let request =
        handler.build_scroll_request_from_token(query.spec(&args.input), cursor, keep_alive, size)?;
    if request.requires_new_session() {
        info!("Open a point in time before executing this request");
    }
    Ok(request.to_json())
}

pub fn build_aggregation_request(
    handler: &SearchRequestHandler,
    field: &str,
    filter: Option<&Path>,
    limit: u32,
) -> Result<Value> {
    let filter = load_filter(filter)?;
    let request = handler.build_aggregation_request(field, filter.as_ref(), limit)?;
    Ok(request.to_json())
}

/// How an extracted page was requested
#[derive(Debug, Clone)]
pub enum ExtractMode {
    Offset {
        from: usize,
        size: usize,
    },
    Scroll {
        cursor: Option<String>,
        keep_alive: Option<String>,
        size: usize,
        supports_session: bool,
    },
}

pub fn extract(
    handler: &SearchRequestHandler,
    response: &Path,
    filter: Option<&Path>,
    mode: ExtractMode,
) -> Result<Value> {
    let response = load_response(response)?;
    let filter = load_filter(filter)?;

    let result = match mode {
        ExtractMode::Offset { from, size } => {
            serde_json::to_value(handler.extract_result(&response, filter.as_ref(), from, size)?)?
        }
        ExtractMode::Scroll {
            cursor,
            keep_alive,
            size,
            supports_session,
        } => {
            let prior = cursor
                .as_deref()
                .map(ScrollCursor::decode)
                .transpose()
                .context("Failed to decode prior cursor")?;
            serde_json::to_value(handler.extract_scroll_result(
                &response,
                filter.as_ref(),
                prior.as_ref(),
                keep_alive.as_deref(),
                size,
                supports_session,
            )?)?
        }
    };
    Ok(result)
}

pub fn decode_cursor(token: &str) -> Result<Value> {
    let cursor = ScrollCursor::decode(token)?;
    Ok(serde_json::to_value(cursor)?)
}
