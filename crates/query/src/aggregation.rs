//! Facet aggregation requests and metadata extraction

use crate::fields::{merge_field_types, to_keyword_field, FieldTypeMap};
use crate::query::AggregationRequest;
use crate::response::RawSearchResponse;
use docsearch_core::entities::EntityTypeSpec;
use docsearch_core::error::{Error, Result};
use docsearch_core::search_models::{AggregationMetadata, Condition, Filter, FilterValue};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub trait AggregationBuilder: Send + Sync {
    /// Aggregations for `facets`; `None` selects the default facet set
    fn build_aggregation_requests(
        &self,
        facets: Option<&[String]>,
        max_agg_values: u32,
    ) -> Result<Vec<AggregationRequest>>;

    fn extract_aggregation_metadata(
        &self,
        response: &RawSearchResponse,
        filter: Option<&Filter>,
    ) -> Result<Vec<AggregationMetadata>>;
}

/// One terms aggregation per facet, bucketed on the facet's keyword field
#[derive(Debug, Clone)]
pub struct TermsAggregationBuilder {
    default_facets: Vec<String>,
    field_types: FieldTypeMap,
    max_term_bucket_size: u32,
}

impl TermsAggregationBuilder {
    pub fn new(entity_types: &[Arc<EntityTypeSpec>], max_term_bucket_size: u32) -> Self {
        let mut default_facets = Vec::new();
        for field in entity_types
            .iter()
            .flat_map(|spec| spec.fields.iter())
            .filter(|field| field.add_to_filters)
        {
            if !default_facets.contains(&field.name) {
                default_facets.push(field.name.clone());
            }
        }

        Self {
            default_facets,
            field_types: merge_field_types(entity_types),
            max_term_bucket_size,
        }
    }

    pub fn default_facets(&self) -> &[String] {
        &self.default_facets
    }
}

impl AggregationBuilder for TermsAggregationBuilder {
    fn build_aggregation_requests(
        &self,
        facets: Option<&[String]>,
        max_agg_values: u32,
    ) -> Result<Vec<AggregationRequest>> {
        let facets = facets.unwrap_or(self.default_facets.as_slice());
        let size = max_agg_values.min(self.max_term_bucket_size);

        facets
            .iter()
            .map(|facet| {
                if !self.field_types.contains_key(facet) {
                    return Err(Error::invalid_input(format!("Unsupported facet: {facet}")));
                }
                Ok(AggregationRequest {
                    name: facet.clone(),
                    field: to_keyword_field(facet, &self.field_types),
                    size,
                })
            })
            .collect()
    }

    fn extract_aggregation_metadata(
        &self,
        response: &RawSearchResponse,
        filter: Option<&Filter>,
    ) -> Result<Vec<AggregationMetadata>> {
        Ok(response
            .aggregations
            .iter()
            .map(|(name, aggregation)| {
                let selected = filter
                    .map(|filter| selected_values(filter, name))
                    .unwrap_or_default();

                let mut aggregations = BTreeMap::new();
                let mut filter_values = Vec::with_capacity(aggregation.buckets.len());
                for bucket in &aggregation.buckets {
                    let value = bucket.key_string();
                    aggregations.insert(value.clone(), bucket.doc_count);
                    filter_values.push(FilterValue {
                        filtered: selected.contains(&value),
                        value,
                        facet_count: bucket.doc_count,
                    });
                }

                // Keep selected values visible even when they fell out of the top buckets
                for value in selected {
                    if !aggregations.contains_key(&value) {
                        filter_values.push(FilterValue {
                            value,
                            facet_count: 0,
                            filtered: true,
                        });
                    }
                }

                AggregationMetadata {
                    name: name.clone(),
                    display_name: name.clone(),
                    aggregations,
                    filter_values,
                }
            })
            .collect())
    }
}

/// Values the filter positively selects for `facet`
fn selected_values(filter: &Filter, facet: &str) -> BTreeSet<String> {
    let keyword = format!("{facet}{}", crate::fields::KEYWORD_SUFFIX);
    filter
        .criteria()
        .filter(|criterion| !criterion.negated)
        .filter(|criterion| matches!(criterion.condition, Condition::Equal | Condition::In))
        .filter(|criterion| criterion.field == facet || criterion.field == keyword)
        .flat_map(|criterion| criterion.values.iter().cloned())
        .collect()
}
