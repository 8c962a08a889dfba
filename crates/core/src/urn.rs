//! Uniform resource names identifying indexed documents
//!
//! Every document carries an identifier of the form
//! `urn:<namespace>:<entity type>:<key>`, e.g. `urn:li:dataset:1`.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const URN_PREFIX: &str = "urn:";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Urn {
    namespace: String,
    entity_type: String,
    key: String,
}

impl Urn {
    pub fn new(
        namespace: impl Into<String>,
        entity_type: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            entity_type: entity_type.into(),
            key: key.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Entity key; may itself contain ':' or a parenthesized tuple
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for Urn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(URN_PREFIX)
            .ok_or_else(|| Error::invalid_input(format!("URN '{s}' must start with '{URN_PREFIX}'")))?;

        let mut parts = rest.splitn(3, ':');
        let namespace = parts.next().unwrap_or_default();
        let entity_type = parts.next().unwrap_or_default();
        let key = parts.next().unwrap_or_default();

        if namespace.is_empty() || entity_type.is_empty() || key.is_empty() {
            return Err(Error::invalid_input(format!(
                "URN '{s}' must have the form urn:<namespace>:<entity type>:<key>"
            )));
        }

        Ok(Self::new(namespace, entity_type, key))
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{URN_PREFIX}{}:{}:{}",
            self.namespace, self.entity_type, self.key
        )
    }
}

impl Serialize for Urn {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
