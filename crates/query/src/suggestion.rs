//! Spelling suggestions on the entity name

use crate::query::{SearchRequest, SuggestionRequest};
use crate::response::RawSearchResponse;
use docsearch_core::search_models::SearchSuggestion;

pub const NAME_SUGGESTION: &str = "nameSuggestion";

pub trait SuggestionBuilder: Send + Sync {
    fn attach_name_suggestion(&self, request: &mut SearchRequest, input: &str);
}

/// Term suggester over a single name field
#[derive(Debug, Clone)]
pub struct NameSuggestionBuilder {
    field: String,
}

impl NameSuggestionBuilder {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Default for NameSuggestionBuilder {
    fn default() -> Self {
        Self::new(docsearch_core::config::defaults::DEFAULT_SUGGESTION_FIELD)
    }
}

impl SuggestionBuilder for NameSuggestionBuilder {
    fn attach_name_suggestion(&self, request: &mut SearchRequest, input: &str) {
        request.suggest = Some(SuggestionRequest {
            name: NAME_SUGGESTION.to_string(),
            text: input.trim().to_string(),
            field: self.field.clone(),
        });
    }
}

/// Suggestions from the first `nameSuggestion` entry, empty when absent
pub fn extract_search_suggestions(response: &RawSearchResponse) -> Vec<SearchSuggestion> {
    response
        .suggest
        .get(NAME_SUGGESTION)
        .and_then(|entries| entries.first())
        .map(|entry| {
            entry
                .options
                .iter()
                .map(|option| SearchSuggestion {
                    text: option.text.clone(),
                    frequency: option.freq,
                    score: option.score,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use serde_json::json;

    #[test]
    fn test_attach_uses_configured_field() {
        let mut request = SearchRequest::new(Query::MatchAll, 10);
        NameSuggestionBuilder::new("displayName").attach_name_suggestion(&mut request, " ordrs ");

        assert_eq!(
            request.suggest,
            Some(SuggestionRequest {
                name: "nameSuggestion".to_string(),
                text: "ordrs".to_string(),
                field: "displayName".to_string(),
            })
        );
    }

    #[test]
    fn test_extract_reads_first_entry_options() {
        let response = RawSearchResponse::from_json(json!({
            "suggest": {
                "nameSuggestion": [
                    {
                        "text": "ordrs",
                        "options": [
                            { "text": "orders", "freq": 12, "score": 0.8 },
                            { "text": "order", "freq": 3, "score": 0.75 }
                        ]
                    },
                    { "text": "ignored", "options": [{ "text": "x", "freq": 1, "score": 0.1 }] }
                ]
            }
        }))
        .unwrap();

        let suggestions = extract_search_suggestions(&response);
        assert_eq!(
            suggestions,
            vec![
                SearchSuggestion {
                    text: "orders".to_string(),
                    frequency: 12,
                    score: 0.8,
                },
                SearchSuggestion {
                    text: "order".to_string(),
                    frequency: 3,
                    score: 0.75,
                },
            ]
        );
    }

    #[test]
    fn test_missing_suggest_block_is_empty() {
        let response = RawSearchResponse::from_json(json!({ "hits": { "hits": [] } })).unwrap();
        assert!(extract_search_suggestions(&response).is_empty());
    }
}
