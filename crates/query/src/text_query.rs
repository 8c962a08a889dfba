//! Text query construction
//!
//! Turns the caller's free text into the main relevance clause of a request.

use crate::flags::is_match_all_input;
use crate::query::{BoolQuery, Query};
use docsearch_core::config::CustomSearchConfig;
use docsearch_core::entities::EntityTypeSpec;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Boost given to an exact identifier hit so it outranks partial matches
const IDENTIFIER_BOOST: f32 = 10.0;

pub trait TextQueryBuilder: Send + Sync {
    fn build_text_query(
        &self,
        entity_types: &[Arc<EntityTypeSpec>],
        input: &str,
        fulltext: bool,
    ) -> Query;
}

/// Default text query builder
///
/// Fulltext input searches every default query field with a
/// `simple_query_string` and adds one named `term` clause per exact-typed
/// default field, so exact hits are reported back as matched queries.
/// Structured input is handed to `query_string` as-is.
#[derive(Debug, Clone)]
pub struct DefaultTextQueryBuilder {
    custom: CustomSearchConfig,
    identifier_field: String,
}

impl DefaultTextQueryBuilder {
    pub fn new(custom: CustomSearchConfig, identifier_field: impl Into<String>) -> Self {
        Self {
            custom,
            identifier_field: identifier_field.into(),
        }
    }

    /// Default query fields with their boost suffix, e.g. `name^2`
    fn boosted_fields(&self, entity_types: &[Arc<EntityTypeSpec>]) -> Vec<String> {
        let names = entity_types
            .iter()
            .flat_map(|spec| spec.default_query_fields())
            .map(|field| field.name.as_str())
            .collect::<std::collections::BTreeSet<_>>();

        names
            .into_iter()
            .map(|name| {
                let boost = self.custom.boost_for(name);
                if (boost - 1.0).abs() < f32::EPSILON {
                    name.to_string()
                } else {
                    format!("{name}^{boost}")
                }
            })
            .collect()
    }

    /// Named exact-match clauses keyed by field name
    fn exact_match_clauses(&self, entity_types: &[Arc<EntityTypeSpec>], input: &str) -> Vec<Query> {
        let mut fields = BTreeMap::new();
        for field in entity_types
            .iter()
            .flat_map(|spec| spec.default_query_fields())
            .filter(|field| field.field_type.is_exact())
        {
            fields
                .entry(field.name.as_str())
                .or_insert_with(|| self.custom.boost_for(&field.name));
        }
        fields
            .entry(self.identifier_field.as_str())
            .or_insert(IDENTIFIER_BOOST);

        fields
            .into_iter()
            .map(|(field, boost)| Query::named_term(field, input, field, Some(boost)))
            .collect()
    }
}

impl Default for DefaultTextQueryBuilder {
    fn default() -> Self {
        Self::new(
            CustomSearchConfig::default(),
            docsearch_core::config::defaults::DEFAULT_IDENTIFIER_FIELD,
        )
    }
}

impl TextQueryBuilder for DefaultTextQueryBuilder {
    fn build_text_query(
        &self,
        entity_types: &[Arc<EntityTypeSpec>],
        input: &str,
        fulltext: bool,
    ) -> Query {
        if is_match_all_input(input) {
            return Query::MatchAll;
        }

        let input = input.trim();
        let fields = self.boosted_fields(entity_types);

        if !fulltext {
            return Query::QueryString {
                query: input.to_string(),
                fields,
            };
        }

        let mut query = BoolQuery::new()
            .minimum_should_match(1)
            .should(Query::SimpleQueryString {
                query: input.to_string(),
                fields,
            });
        for clause in self.exact_match_clauses(entity_types, input) {
            query = query.should(clause);
        }
        query.into()
    }
}
