//! Filter compilation
//!
//! Structural translation of a [`Filter`] is delegated to a
//! [`FilterCompiler`]; [`compile_filter_query`] wraps it and enforces the
//! default visibility policy: soft-deleted documents are excluded unless the
//! caller's filter mentions the soft-delete field itself.

use crate::fields::{to_keyword_field, FieldTypeMap};
use crate::query::{BoolQuery, Query, RangeOp};
use docsearch_core::error::{Error, Result};
use docsearch_core::search_models::{Condition, Criterion, Filter};
use serde_json::json;

/// Translates a filter tree into a boolean query
pub trait FilterCompiler: Send + Sync {
    fn compile(&self, filter: Option<&Filter>, field_types: &FieldTypeMap) -> Result<BoolQuery>;
}

/// Compile `filter` and append the soft-delete exclusion when required
pub fn compile_filter_query(
    compiler: &dyn FilterCompiler,
    filter: Option<&Filter>,
    field_types: &FieldTypeMap,
    soft_delete_field: &str,
) -> Result<BoolQuery> {
    let query = compiler.compile(filter, field_types)?;

    if filter.is_some_and(|f| f.references_field(soft_delete_field)) {
        return Ok(query);
    }

    let exclusion = soft_delete_exclusion(soft_delete_field);
    if query.must_not.contains(&exclusion) {
        return Ok(query);
    }
    Ok(query.must_not(exclusion))
}

/// The clause hiding soft-deleted documents
pub fn soft_delete_exclusion(soft_delete_field: &str) -> Query {
    Query::Match {
        field: soft_delete_field.to_string(),
        value: json!(true),
    }
}

/// Default compiler producing term-level clauses
///
/// A single conjunction becomes `filter` clauses of one boolean query;
/// several conjunctions become `should` clauses with at least one required.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermFilterCompiler;

impl FilterCompiler for TermFilterCompiler {
    fn compile(&self, filter: Option<&Filter>, field_types: &FieldTypeMap) -> Result<BoolQuery> {
        let Some(filter) = filter else {
            return Ok(BoolQuery::new());
        };

        let conjunctions = filter
            .or
            .iter()
            .filter(|conjunction| !conjunction.and.is_empty())
            .collect::<Vec<_>>();

        match conjunctions.as_slice() {
            [] => Ok(BoolQuery::new()),
            [single] => conjunction_query(&single.and, field_types),
            many => {
                let mut query = BoolQuery::new().minimum_should_match(1);
                for conjunction in many {
                    query = query.should(conjunction_query(&conjunction.and, field_types)?.into());
                }
                Ok(query)
            }
        }
    }
}

fn conjunction_query(criteria: &[Criterion], field_types: &FieldTypeMap) -> Result<BoolQuery> {
    let mut query = BoolQuery::new();
    for criterion in criteria {
        let clause = criterion_query(criterion, field_types)?;
        query = if criterion.negated {
            query.must_not(clause)
        } else {
            query.filter(clause)
        };
    }
    Ok(query)
}

fn criterion_query(criterion: &Criterion, field_types: &FieldTypeMap) -> Result<Query> {
    let field = criterion.field.as_str();

    match criterion.condition {
        Condition::Exists => Ok(Query::Exists {
            field: field.to_string(),
        }),
        Condition::IsNull => Ok(BoolQuery::new()
            .must_not(Query::Exists {
                field: field.to_string(),
            })
            .into()),
        Condition::Equal | Condition::In => {
            let keyword_field = to_keyword_field(field, field_types);
            match criterion.values.as_slice() {
                [] => Err(missing_value(criterion)),
                [value] => Ok(Query::term(keyword_field, value.as_str())),
                values => Ok(Query::Terms {
                    field: keyword_field,
                    values: values.to_vec(),
                }),
            }
        }
        Condition::Contain | Condition::StartWith | Condition::EndWith => {
            let keyword_field = to_keyword_field(field, field_types);
            let patterns = criterion
                .values
                .iter()
                .map(|value| match criterion.condition {
                    Condition::Contain => format!("*{value}*"),
                    Condition::StartWith => format!("{value}*"),
                    _ => format!("*{value}"),
                })
                .map(|pattern| Query::Wildcard {
                    field: keyword_field.clone(),
                    pattern,
                })
                .collect::<Vec<_>>();
            any_of(patterns).ok_or_else(|| missing_value(criterion))
        }
        Condition::GreaterThan
        | Condition::GreaterThanOrEqualTo
        | Condition::LessThan
        | Condition::LessThanOrEqualTo => {
            let op = match criterion.condition {
                Condition::GreaterThan => RangeOp::Gt,
                Condition::GreaterThanOrEqualTo => RangeOp::Gte,
                Condition::LessThan => RangeOp::Lt,
                _ => RangeOp::Lte,
            };
            let value = criterion
                .values
                .first()
                .ok_or_else(|| missing_value(criterion))?;
            Ok(Query::Range {
                field: field.to_string(),
                op,
                value: value.clone(),
            })
        }
    }
}

fn any_of(mut clauses: Vec<Query>) -> Option<Query> {
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => {
            let mut query = BoolQuery::new().minimum_should_match(1);
            for clause in clauses {
                query = query.should(clause);
            }
            Some(query.into())
        }
    }
}

fn missing_value(criterion: &Criterion) -> Error {
    Error::invalid_input(format!(
        "Filter criterion on '{}' with condition {} requires at least one value",
        criterion.field, criterion.condition
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsearch_core::entities::FieldType;
    use docsearch_core::search_models::ConjunctiveCriterion;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn field_types() -> FieldTypeMap {
        FieldTypeMap::from([
            ("name".to_string(), BTreeSet::from([FieldType::Text])),
            ("origin".to_string(), BTreeSet::from([FieldType::Keyword])),
            ("removed".to_string(), BTreeSet::from([FieldType::Boolean])),
        ])
    }

    fn exclusion_count(query: &BoolQuery) -> usize {
        query
            .must_not
            .iter()
            .filter(|clause| **clause == soft_delete_exclusion("removed"))
            .count()
    }

    #[test]
    fn test_no_filter_only_excludes_soft_deleted() {
        let query = compile_filter_query(&TermFilterCompiler, None, &field_types(), "removed")
            .unwrap();

        assert_eq!(
            query.to_json(),
            json!({ "bool": { "must_not": [{ "match": { "removed": true } }] } })
        );
    }

    #[test]
    fn test_filter_without_soft_delete_gets_exactly_one_exclusion() {
        let filter = Filter::all_of(vec![
            Criterion::equal("origin", "PROD"),
            Criterion::equal("name", "orders"),
        ]);
        let query =
            compile_filter_query(&TermFilterCompiler, Some(&filter), &field_types(), "removed")
                .unwrap();

        assert_eq!(exclusion_count(&query), 1);
        assert_eq!(
            query.filter,
            vec![
                Query::term("origin", "PROD"),
                Query::term("name.keyword", "orders"),
            ]
        );
    }

    #[test]
    fn test_soft_delete_aware_filter_is_left_alone() {
        for field in ["removed", "removed.keyword"] {
            let filter = Filter::all_of(vec![Criterion::equal(field, "true")]);
            let query = compile_filter_query(
                &TermFilterCompiler,
                Some(&filter),
                &field_types(),
                "removed",
            )
            .unwrap();

            assert_eq!(exclusion_count(&query), 0);
            assert!(query.must_not.is_empty());
        }
    }

    #[test]
    fn test_soft_delete_reference_in_any_disjunct_counts() {
        let filter = Filter {
            or: vec![
                ConjunctiveCriterion {
                    and: vec![Criterion::equal("origin", "PROD")],
                },
                ConjunctiveCriterion {
                    and: vec![Criterion::equal("removed", "false")],
                },
            ],
        };
        let query =
            compile_filter_query(&TermFilterCompiler, Some(&filter), &field_types(), "removed")
                .unwrap();
        assert_eq!(exclusion_count(&query), 0);
    }

    #[test]
    fn test_existing_exclusion_is_not_duplicated() {
        struct AlreadyExcludes;
        impl FilterCompiler for AlreadyExcludes {
            fn compile(&self, _: Option<&Filter>, _: &FieldTypeMap) -> Result<BoolQuery> {
                Ok(BoolQuery::new().must_not(soft_delete_exclusion("removed")))
            }
        }

        let query = compile_filter_query(&AlreadyExcludes, None, &field_types(), "removed")
            .unwrap();
        assert_eq!(exclusion_count(&query), 1);
    }

    #[test]
    fn test_disjunction_uses_should() {
        let filter = Filter {
            or: vec![
                ConjunctiveCriterion {
                    and: vec![Criterion::equal("origin", "PROD")],
                },
                ConjunctiveCriterion {
                    and: vec![Criterion::equal("origin", "DEV")],
                },
            ],
        };
        let query = TermFilterCompiler
            .compile(Some(&filter), &field_types())
            .unwrap();

        assert_eq!(query.minimum_should_match, Some(1));
        assert_eq!(query.should.len(), 2);
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_negated_and_multi_value_criteria() {
        let filter = Filter::all_of(vec![
            Criterion::new(
                "origin",
                Condition::In,
                vec!["PROD".to_string(), "DEV".to_string()],
            )
            .negate(),
            Criterion::new("name", Condition::StartWith, vec!["ord".to_string()]),
            Criterion::new("lastModified", Condition::GreaterThan, vec!["100".to_string()]),
            Criterion::new("owners", Condition::IsNull, vec![]),
        ]);
        let query = TermFilterCompiler
            .compile(Some(&filter), &field_types())
            .unwrap();

        assert_eq!(
            query.to_json(),
            json!({
                "bool": {
                    "filter": [
                        { "wildcard": { "name.keyword": { "value": "ord*" } } },
                        { "range": { "lastModified": { "gt": "100" } } },
                        { "bool": { "must_not": [{ "exists": { "field": "owners" } }] } },
                    ],
                    "must_not": [
                        { "terms": { "origin": ["PROD", "DEV"] } },
                    ],
                }
            })
        );
    }

    #[test]
    fn test_equal_without_values_is_rejected() {
        let filter = Filter::all_of(vec![Criterion::new("origin", Condition::Equal, vec![])]);
        let err = TermFilterCompiler
            .compile(Some(&filter), &field_types())
            .unwrap_err();
        assert!(err.to_string().contains("requires at least one value"));
    }
}
