//! Search request/response translation layer
//!
//! Turns an application-level search intent (text, filter, sort, facets,
//! flags, pagination) into a backend query and turns the backend's raw
//! response back into typed results.
//!
//! - [`flags`]: effective flag resolution
//! - [`filter`]: filter compilation with the soft-delete policy
//! - [`handler`]: request building and result extraction per entity-type list
//! - [`registry`]: one shared handler per entity-type list
//! - [`cursor`]: self-contained scroll cursor tokens

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod aggregation;
pub mod cursor;
pub mod fields;
pub mod filter;
pub mod flags;
pub mod handler;
pub mod keep_alive;
pub mod matched_fields;
pub mod query;
pub mod registry;
pub mod response;
pub mod sort;
pub mod suggestion;
pub mod text_query;

pub use aggregation::{AggregationBuilder, TermsAggregationBuilder};
pub use cursor::ScrollCursor;
pub use filter::{compile_filter_query, FilterCompiler, TermFilterCompiler};
pub use flags::{EffectiveSearchFlags, FlagResolver};
pub use handler::{Collaborators, SearchRequestHandler, SearchSpec};
pub use keep_alive::KeepAlive;
pub use query::{BoolQuery, Query, SearchRequest};
pub use registry::HandlerRegistry;
pub use response::RawSearchResponse;
pub use sort::{DefaultSortOrder, SortOrderBuilder};
pub use suggestion::{NameSuggestionBuilder, SuggestionBuilder};
pub use text_query::{DefaultTextQueryBuilder, TextQueryBuilder};
