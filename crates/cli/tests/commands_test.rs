use docsearch::commands::{self, ExtractMode, QueryArgs};
use docsearch_core::config::{CustomSearchConfig, SearchConfig};
use docsearch_query::HandlerRegistry;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
    path
}

fn schema(dir: &Path) -> PathBuf {
    write_json(
        dir,
        "schema.json",
        json!([
            {
                "name": "dataset",
                "fields": [
                    { "name": "name", "field_type": "TEXT", "query_by_default": true },
                    { "name": "platform", "field_type": "KEYWORD", "add_to_filters": true }
                ]
            }
        ]),
    )
}

fn registry() -> HandlerRegistry {
    HandlerRegistry::new(SearchConfig::default(), CustomSearchConfig::default())
}

#[test]
fn test_request_command_reads_schema_and_filter() {
    let dir = TempDir::new().unwrap();
    let filter = write_json(
        dir.path(),
        "filter.json",
        json!({ "or": [{ "and": [{ "field": "platform", "values": ["hive"] }] }] }),
    );
    let registry = registry();
    let handler = commands::handler_for(&registry, &schema(dir.path())).unwrap();

    let args = QueryArgs {
        input: "orders".to_string(),
        filter: Some(filter),
        no_facets: true,
        ..QueryArgs::default()
    };
    let body = commands::build_request(&handler, &args, 0, 5).unwrap();

    assert_eq!(body["size"], json!(5));
    assert_eq!(body["_source"], json!({ "includes": ["urn"] }));
    assert!(body.get("aggs").is_none());
    assert_eq!(
        body["query"]["bool"]["filter"][0]["bool"]["filter"],
        json!([{ "term": { "platform": { "value": "hive" } } }])
    );
}

#[test]
fn test_schema_is_cached_per_entity_type_list() {
    let dir = TempDir::new().unwrap();
    let schema = schema(dir.path());
    let registry = registry();

    let first = commands::handler_for(&registry, &schema).unwrap();
    let second = commands::handler_for(&registry, &schema).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn test_empty_schema_is_rejected() {
    let dir = TempDir::new().unwrap();
    let schema = write_json(dir.path(), "schema.json", json!([]));
    assert!(commands::load_entity_types(&schema).is_err());
}

#[test]
fn test_scroll_round_trip_through_files() {
    let dir = TempDir::new().unwrap();
    let registry = registry();
    let handler = commands::handler_for(&registry, &schema(dir.path())).unwrap();
    let response = write_json(
        dir.path(),
        "response.json",
        json!({
            "hits": {
                "total": { "value": 3, "relation": "eq" },
                "hits": [
                    { "_score": 2.0, "_source": { "urn": "urn:li:dataset:a" }, "sort": [2.0, "urn:li:dataset:a"] },
                    { "_score": 1.0, "_source": { "urn": "urn:li:dataset:b" }, "sort": [1.0, "urn:li:dataset:b"] }
                ]
            }
        }),
    );

    let page = commands::extract(
        &handler,
        &response,
        None,
        ExtractMode::Scroll {
            cursor: None,
            keep_alive: None,
            size: 2,
            supports_session: false,
        },
    )
    .unwrap();

    assert_eq!(page["numEntities"], json!(3));
    assert_eq!(page["entities"][1]["entity"], json!("urn:li:dataset:b"));
    let token = page["scrollId"].as_str().unwrap().to_string();

    let decoded = commands::decode_cursor(&token).unwrap();
    assert_eq!(decoded["sort"], json!([1.0, "urn:li:dataset:b"]));

    let next = commands::build_scroll_request(&handler, &QueryArgs::default(), Some(&token), None, 2)
        .unwrap();
    assert_eq!(next["search_after"], json!([1.0, "urn:li:dataset:b"]));
    assert!(next.get("pit").is_none());
}

#[test]
fn test_aggregate_command() {
    let dir = TempDir::new().unwrap();
    let registry = registry();
    let handler = commands::handler_for(&registry, &schema(dir.path())).unwrap();

    let body = commands::build_aggregation_request(&handler, "platform", None, 5).unwrap();
    assert_eq!(body["size"], json!(0));
    assert_eq!(
        body["aggs"],
        json!({ "platform": { "terms": { "field": "platform", "size": 5 } } })
    );
}

#[test]
fn test_bad_cursor_is_reported() {
    assert!(commands::decode_cursor("not a cursor").is_err());
}
