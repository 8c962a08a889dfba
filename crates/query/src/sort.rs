//! Sort order selection

use crate::fields::{merge_field_types, to_keyword_field};
use crate::query::{SearchRequest, SortClause};
use docsearch_core::entities::EntityTypeSpec;
use docsearch_core::error::{Error, Result};
use docsearch_core::search_models::{SortCriterion, SortOrder};
use std::sync::Arc;

/// Relevance pseudo-field understood by the backend
pub const SCORE_FIELD: &str = "_score";

pub trait SortOrderBuilder: Send + Sync {
    fn apply_sort(
        &self,
        request: &mut SearchRequest,
        sort: Option<&SortCriterion>,
        entity_types: &[Arc<EntityTypeSpec>],
    ) -> Result<()>;
}

/// Relevance order unless told otherwise, identifier as the tie-breaker
///
/// The trailing identifier clause makes the order total, which cursor
/// pagination relies on to resume exactly after the last hit.
#[derive(Debug, Clone)]
pub struct DefaultSortOrder {
    identifier_field: String,
}

impl DefaultSortOrder {
    pub fn new(identifier_field: impl Into<String>) -> Self {
        Self {
            identifier_field: identifier_field.into(),
        }
    }
}

impl SortOrderBuilder for DefaultSortOrder {
    fn apply_sort(
        &self,
        request: &mut SearchRequest,
        sort: Option<&SortCriterion>,
        entity_types: &[Arc<EntityTypeSpec>],
    ) -> Result<()> {
        let primary = match sort {
            None => SortClause::new(SCORE_FIELD, SortOrder::Descending),
            Some(criterion) if criterion.field == SCORE_FIELD => {
                SortClause::new(SCORE_FIELD, criterion.order)
            }
            Some(criterion) if criterion.field == self.identifier_field => {
                SortClause::new(self.identifier_field.as_str(), criterion.order)
            }
            Some(criterion) => {
                if !entity_types.iter().any(|spec| spec.has_field(&criterion.field)) {
                    return Err(Error::invalid_input(format!(
                        "Unsupported sort field: {}",
                        criterion.field
                    )));
                }
                let field_types = merge_field_types(entity_types);
                SortClause::new(to_keyword_field(&criterion.field, &field_types), criterion.order)
            }
        };

        let sorts_by_identifier = primary.field == self.identifier_field;
        request.sort = vec![primary];
        if !sorts_by_identifier {
            request.sort.push(SortClause::new(
                self.identifier_field.as_str(),
                SortOrder::Ascending,
            ));
        }
        Ok(())
    }
}

impl Default for DefaultSortOrder {
    fn default() -> Self {
        Self::new(docsearch_core::config::defaults::DEFAULT_IDENTIFIER_FIELD)
    }
}
