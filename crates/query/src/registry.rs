//! Handler registry
//!
//! Handlers are memoized per ordered list of entity type names. The first
//! caller for a key builds the handler while holding the map shard's write
//! lock, so concurrent callers for the same key wait for it and then share
//! the same instance.

use crate::handler::SearchRequestHandler;
use dashmap::DashMap;
use docsearch_core::config::{Config, CustomSearchConfig, SearchConfig};
use docsearch_core::entities::EntityTypeSpec;
use std::sync::Arc;
use tracing::debug;

pub struct HandlerRegistry {
    config: SearchConfig,
    custom: CustomSearchConfig,
    handlers: DashMap<Vec<String>, Arc<SearchRequestHandler>>,
}

impl HandlerRegistry {
    pub fn new(config: SearchConfig, custom: CustomSearchConfig) -> Self {
        Self {
            config,
            custom,
            handlers: DashMap::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.search.clone(), config.custom.clone())
    }

    /// Handler for `entity_types`, built on first use
    ///
    /// `custom_override` only takes effect when this call constructs the
    /// handler; an existing handler for the same key is returned unchanged.
    pub fn get_handler(
        &self,
        entity_types: &[Arc<EntityTypeSpec>],
        custom_override: Option<&CustomSearchConfig>,
    ) -> Arc<SearchRequestHandler> {
        let key = entity_types
            .iter()
            .map(|spec| spec.name.clone())
            .collect::<Vec<_>>();

        if let Some(handler) = self.handlers.get(&key) {
            return Arc::clone(handler.value());
        }

        let handler = self.handlers.entry(key).or_insert_with(|| {
            debug!(
                "Building search handler for entity types {:?}",
                entity_types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
            );
            Arc::new(SearchRequestHandler::new(
                entity_types.to_vec(),
                self.config.clone(),
                custom_override.unwrap_or(&self.custom),
            ))
        });
        Arc::clone(handler.value())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsearch_core::entities::{FieldType, SearchableField};

    fn entity(name: &str) -> Arc<EntityTypeSpec> {
        Arc::new(EntityTypeSpec::new(
            name,
            vec![SearchableField::new("name", FieldType::Text).query_by_default()],
        ))
    }

    #[test]
    fn test_same_list_returns_same_instance() {
        let registry = HandlerRegistry::new(SearchConfig::default(), CustomSearchConfig::default());
        let first = registry.get_handler(&[entity("dataset"), entity("chart")], None);
        let second = registry.get_handler(&[entity("dataset"), entity("chart")], None);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_order_is_part_of_the_key() {
        let registry = HandlerRegistry::new(SearchConfig::default(), CustomSearchConfig::default());
        let forward = registry.get_handler(&[entity("dataset"), entity("chart")], None);
        let reversed = registry.get_handler(&[entity("chart"), entity("dataset")], None);

        assert!(!Arc::ptr_eq(&forward, &reversed));
        assert_eq!(registry.len(), 2);
    }
}
