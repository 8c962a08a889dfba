//! Core types for the docsearch request/response translation layer
//!
//! This crate provides the foundational abstractions shared by the query
//! layer and its front ends, including:
//!
//! - **Entities**: Searchable entity types and their field descriptors
//! - **Search models**: Flags, filters, sort criteria and typed results
//! - **Identifiers**: The URN identifying every indexed document
//! - **Configuration**: Search defaults and custom query overrides
//! - **Error handling**: Unified error types
//!

pub mod config;
pub mod entities;
pub mod error;
pub mod search_models;
pub mod urn;

// Re-export main types for convenience
pub use config::{Config, CustomSearchConfig, DefaultSearchFlags, SearchConfig};
pub use entities::{EntityTypeSpec, FieldType, SearchableField};
pub use error::{Error, Result, ResultExt};
pub use search_models::{
    AggregationMetadata, ConjunctiveCriterion, Condition, Criterion, FilterValue, MatchedField,
    ScrollResult, SearchEntity, SearchFlags, SearchResult, SearchResultMetadata, SearchSuggestion,
    SortCriterion, SortOrder,
};
pub use search_models::Filter;
pub use urn::Urn;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::SearchConfig;
    pub use crate::entities::{EntityTypeSpec, FieldType};
    pub use crate::error::{Result, ResultExt};
    pub use crate::search_models::{Filter, SearchFlags, SortCriterion};
}
