use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use strum_macros::{Display, EnumString};

/// How a searchable field is indexed by the backend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Keyword,
    Text,
    TextPartial,
    WordGram,
    BrowsePath,
    Urn,
    UrnPartial,
    Boolean,
    Count,
    Datetime,
    Double,
    Object,
}

impl FieldType {
    /// Whether the field is stored as an exact, non-analyzed value
    ///
    /// Exact fields can be matched with term clauses directly; analyzed
    /// fields have to be addressed through their `.keyword` sub-field.
    pub fn is_exact(self) -> bool {
        matches!(
            self,
            FieldType::Keyword
                | FieldType::Urn
                | FieldType::Boolean
                | FieldType::Count
                | FieldType::Datetime
                | FieldType::Double
                | FieldType::Object
        )
    }
}

/// Descriptor of one searchable field of an entity type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchableField {
    /// Field name as indexed in the backend document
    pub name: String,

    /// Index type of the field
    pub field_type: FieldType,

    /// Whether free-text queries search this field when no field is named
    #[serde(default)]
    pub query_by_default: bool,

    /// Whether the field is offered as a facet by default
    #[serde(default)]
    pub add_to_filters: bool,
}

impl SearchableField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            query_by_default: false,
            add_to_filters: false,
        }
    }

    pub fn query_by_default(mut self) -> Self {
        self.query_by_default = true;
        self
    }

    pub fn add_to_filters(mut self) -> Self {
        self.add_to_filters = true;
        self
    }
}

/// A searchable entity kind and its schema
///
/// Supplied by the schema provider; immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTypeSpec {
    /// Entity type name, e.g. "dataset"
    pub name: String,

    /// Searchable fields in declaration order
    #[serde(default)]
    pub fields: Vec<SearchableField>,
}

impl EntityTypeSpec {
    pub fn new(name: impl Into<String>, fields: Vec<SearchableField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Field name to the set of index types declared for it by this entity type
    pub fn searchable_field_types(&self) -> HashMap<String, BTreeSet<FieldType>> {
        let mut types: HashMap<String, BTreeSet<FieldType>> = HashMap::new();
        for field in &self.fields {
            types
                .entry(field.name.clone())
                .or_default()
                .insert(field.field_type);
        }
        types
    }

    /// Names of fields searched by default
    pub fn default_query_fields(&self) -> impl Iterator<Item = &SearchableField> {
        self.fields.iter().filter(|f| f.query_by_default)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_field_type_string_round_trip() {
        assert_eq!(FieldType::TextPartial.to_string(), "TEXT_PARTIAL");
        assert_eq!(FieldType::from_str("URN").ok(), Some(FieldType::Urn));
    }

    #[test]
    fn test_searchable_field_types_collects_duplicates() {
        let spec = EntityTypeSpec::new(
            "dataset",
            vec![
                SearchableField::new("name", FieldType::Text),
                SearchableField::new("name", FieldType::WordGram),
                SearchableField::new("platform", FieldType::Urn),
            ],
        );

        let types = spec.searchable_field_types();
        assert_eq!(types.len(), 2);
        assert_eq!(
            types["name"],
            BTreeSet::from([FieldType::Text, FieldType::WordGram])
        );
    }

    #[test]
    fn test_exact_field_types() {
        assert!(FieldType::Keyword.is_exact());
        assert!(FieldType::Urn.is_exact());
        assert!(!FieldType::Text.is_exact());
        assert!(!FieldType::UrnPartial.is_exact());
    }
}
