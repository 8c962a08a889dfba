#![allow(dead_code)]

use docsearch_core::config::{CustomSearchConfig, SearchConfig};
use docsearch_core::entities::{EntityTypeSpec, FieldType, SearchableField};
use docsearch_query::SearchRequestHandler;
use std::sync::Arc;

pub fn dataset() -> Arc<EntityTypeSpec> {
    Arc::new(EntityTypeSpec::new(
        "dataset",
        vec![
            SearchableField::new("name", FieldType::Text).query_by_default(),
            SearchableField::new("title", FieldType::TextPartial).query_by_default(),
            SearchableField::new("platform", FieldType::Keyword).add_to_filters(),
            SearchableField::new("origin", FieldType::Keyword).add_to_filters(),
            SearchableField::new("removed", FieldType::Boolean),
        ],
    ))
}

pub fn chart() -> Arc<EntityTypeSpec> {
    Arc::new(EntityTypeSpec::new(
        "chart",
        vec![
            SearchableField::new("name", FieldType::Keyword).query_by_default(),
            SearchableField::new("platform", FieldType::Keyword).add_to_filters(),
        ],
    ))
}

pub fn handler() -> SearchRequestHandler {
    SearchRequestHandler::new(
        vec![dataset()],
        SearchConfig::default(),
        &CustomSearchConfig::default(),
    )
}
