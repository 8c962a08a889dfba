mod common;

use common::handler;
use docsearch_core::error::Error;
use docsearch_core::search_models::{
    Criterion, Filter, MatchedField, SearchSuggestion, SEARCH_BACKEND_SCORE_FEATURE,
};
use docsearch_core::Urn;
use docsearch_query::{RawSearchResponse, ScrollCursor};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn hit(n: usize) -> Value {
    json!({
        "_id": format!("doc-{n}"),
        "_score": 1.5,
        "_source": { "urn": format!("urn:li:dataset:{n}") },
        "sort": [1.5, format!("urn:li:dataset:{n}")]
    })
}

fn page(count: usize) -> RawSearchResponse {
    RawSearchResponse::from_json(json!({
        "hits": {
            "total": { "value": 100, "relation": "eq" },
            "hits": (0..count).map(hit).collect::<Vec<_>>()
        },
        "pit_id": "pit-next"
    }))
    .unwrap()
}

#[test]
fn test_extract_result_builds_entities_and_features() {
    let response = RawSearchResponse::from_json(json!({
        "hits": {
            "total": 2,
            "hits": [
                {
                    "_score": 3.0,
                    "_source": { "urn": "urn:li:dataset:1" },
                    "highlight": {
                        "title.delimited": ["Acme"],
                        "title": ["Acme Corp"]
                    },
                    "matched_queries": ["urn"],
                    "fields": { "urn": ["urn:li:dataset:1"] }
                },
                {
                    "_score": null,
                    "_source": { "urn": "urn:li:dataset:2" },
                    "matched_queries": ["urn"]
                }
            ]
        }
    }))
    .unwrap();

    let result = handler().extract_result(&response, None, 0, 10).unwrap();

    assert_eq!(result.num_entities, 2);
    assert_eq!(result.from, 0);
    assert_eq!(result.page_size, 10);
    assert_eq!(result.entities.len(), 2);

    let first = &result.entities[0];
    assert_eq!(first.entity, "urn:li:dataset:1".parse::<Urn>().unwrap());
    assert_eq!(
        first.matched_fields,
        BTreeSet::from([
            MatchedField::new("title", "Acme"),
            MatchedField::new("title", "Acme Corp"),
            MatchedField::new("urn", "urn:li:dataset:1"),
        ])
    );
    assert_eq!(first.score, 3.0);
    assert_eq!(first.features.get(SEARCH_BACKEND_SCORE_FEATURE), Some(&3.0));

    let second = &result.entities[1];
    assert_eq!(
        second.matched_fields,
        BTreeSet::from([MatchedField::new("urn", "")])
    );
    assert_eq!(second.score, 0.0);
}

#[test]
fn test_malformed_identifier_aborts_extraction() {
    for source in [json!({}), json!({ "urn": 42 }), json!({ "urn": "not-a-urn" })] {
        let response = RawSearchResponse::from_json(json!({
            "hits": { "hits": [hit(1), { "_source": source }] }
        }))
        .unwrap();

        let err = handler().extract_result(&response, None, 0, 10).unwrap_err();
        assert!(matches!(err, Error::Corruption(_)), "{err}");
    }
}

#[test]
fn test_metadata_includes_aggregations_and_suggestions() {
    let response = RawSearchResponse::from_json(json!({
        "hits": { "total": 0, "hits": [] },
        "aggregations": {
            "platform": { "buckets": [{ "key": "hive", "doc_count": 7 }] }
        },
        "suggest": {
            "nameSuggestion": [
                { "text": "ordrs", "options": [{ "text": "orders", "freq": 4, "score": 0.9 }] }
            ]
        }
    }))
    .unwrap();
    let filter = Filter::all_of(vec![Criterion::equal("platform", "hive")]);

    let result = handler()
        .extract_result(&response, Some(&filter), 0, 10)
        .unwrap();

    assert_eq!(result.metadata.aggregations.len(), 1);
    assert!(result.metadata.aggregations[0].filter_values[0].filtered);
    assert_eq!(
        result.metadata.suggestions,
        vec![SearchSuggestion {
            text: "orders".to_string(),
            frequency: 4,
            score: 0.9,
        }]
    );
}

#[test]
fn test_full_page_yields_next_cursor() {
    let now = 1_700_000_000_000;
    let result = handler()
        .extract_scroll_result_at(&page(10), None, None, Some("5m"), 10, true, now)
        .unwrap();

    assert_eq!(result.entities.len(), 10);
    assert_eq!(result.num_entities, 100);

    let token = result.scroll_id.expect("full page has a next cursor");
    let cursor = ScrollCursor::decode(&token).unwrap();
    assert_eq!(cursor.sort(), &[json!(1.5), json!("urn:li:dataset:9")]);
    assert_eq!(cursor.pit_id(), Some("pit-next"));
    assert_eq!(cursor.expiration_time(), now + 300_000);
}

#[test]
fn test_short_page_ends_scroll() {
    let result = handler()
        .extract_scroll_result_at(&page(7), None, None, Some("5m"), 10, true, 0)
        .unwrap();

    assert_eq!(result.entities.len(), 7);
    assert_eq!(result.scroll_id, None);
}

#[test]
fn test_scroll_without_session_support_has_zero_expiration() {
    let result = handler()
        .extract_scroll_result_at(&page(3), None, None, Some("5m"), 3, false, 1_000)
        .unwrap();

    let cursor = ScrollCursor::decode(&result.scroll_id.unwrap()).unwrap();
    assert_eq!(cursor.pit_id(), None);
    assert_eq!(cursor.expiration_time(), 0);
}

#[test]
fn test_scroll_reuses_prior_session_when_response_has_none() {
    let response = RawSearchResponse::from_json(json!({
        "hits": { "total": 1, "hits": [hit(0)] }
    }))
    .unwrap();
    let prior = ScrollCursor::new(vec![json!(0)], Some("pit-prior".to_string()), 0).unwrap();

    let result = handler()
        .extract_scroll_result_at(&response, None, Some(&prior), None, 1, true, 1_000)
        .unwrap();

    let cursor = ScrollCursor::decode(&result.scroll_id.unwrap()).unwrap();
    assert_eq!(cursor.pit_id(), Some("pit-prior"));
    assert_eq!(cursor.expiration_time(), 0);
}

#[test]
fn test_scroll_rejects_bad_keep_alive() {
    let err = handler()
        .extract_scroll_result_at(&page(1), None, None, Some("5x"), 1, true, 0)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidKeepAlive { .. }));
}
