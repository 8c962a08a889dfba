//! Configuration module for the docsearch system
//!
//! This module provides configuration structures and loading mechanisms for
//! the query layer. Configuration can be loaded from TOML files and/or
//! environment variables.

pub mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.docsearch/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".docsearch").join("config.toml"))
}

/// Main configuration structure for the docsearch system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search request defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Query customizations applied on top of the entity schemas
    #[serde(default)]
    pub custom: CustomSearchConfig,
}

/// Global search flag defaults
///
/// Built once at startup and handed to the flag resolver; callers override
/// individual flags per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSearchFlags {
    #[serde(default = "default_fulltext")]
    pub fulltext: bool,

    #[serde(default = "default_max_agg_values")]
    pub max_agg_values: u32,

    #[serde(default = "default_skip_cache")]
    pub skip_cache: bool,

    #[serde(default = "default_skip_aggregates")]
    pub skip_aggregates: bool,

    #[serde(default = "default_skip_highlighting")]
    pub skip_highlighting: bool,

    #[serde(default = "default_get_suggestions")]
    pub get_suggestions: bool,
}

/// Search request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Defaults for flags the caller leaves unset
    #[serde(default)]
    pub default_flags: DefaultSearchFlags,

    /// Upper bound on buckets returned per facet
    #[serde(default = "default_max_term_bucket_size")]
    pub max_term_bucket_size: u32,

    /// Source field holding the document identifier
    #[serde(default = "default_identifier_field")]
    pub identifier_field: String,

    /// Field marking logically deleted documents
    #[serde(default = "default_soft_delete_field")]
    pub soft_delete_field: String,

    /// Field used for "did you mean" suggestions
    #[serde(default = "default_suggestion_field")]
    pub suggestion_field: String,

    /// Keep-alive used for cursor sessions when the caller passes none (e.g. "5m")
    #[serde(default)]
    pub default_keep_alive: Option<String>,
}

/// Per-deployment query customizations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomSearchConfig {
    /// Boost multipliers for default query fields, keyed by field name
    #[serde(default)]
    pub field_boosts: HashMap<String, f32>,
}

impl Default for DefaultSearchFlags {
    fn default() -> Self {
        Self {
            fulltext: default_fulltext(),
            max_agg_values: default_max_agg_values(),
            skip_cache: default_skip_cache(),
            skip_aggregates: default_skip_aggregates(),
            skip_highlighting: default_skip_highlighting(),
            get_suggestions: default_get_suggestions(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_flags: DefaultSearchFlags::default(),
            max_term_bucket_size: default_max_term_bucket_size(),
            identifier_field: default_identifier_field(),
            soft_delete_field: default_soft_delete_field(),
            suggestion_field: default_suggestion_field(),
            default_keep_alive: None,
        }
    }
}

impl CustomSearchConfig {
    /// Boost for `field`, 1.0 when not customized
    pub fn boost_for(&self, field: &str) -> f32 {
        self.field_boosts.get(field).copied().unwrap_or(1.0)
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.default_flags.max_agg_values == 0 {
            return Err(Error::config(
                "search.default_flags.max_agg_values must be greater than 0".to_string(),
            ));
        }

        if self.search.max_term_bucket_size == 0 {
            return Err(Error::config(
                "search.max_term_bucket_size must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("identifier_field", &self.search.identifier_field),
            ("soft_delete_field", &self.search.soft_delete_field),
            ("suggestion_field", &self.search.suggestion_field),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(format!("search.{name} must not be empty")));
            }
        }

        if let Some((field, boost)) = self
            .custom
            .field_boosts
            .iter()
            .find(|(_, boost)| !boost.is_finite() || **boost <= 0.0)
        {
            return Err(Error::config(format!(
                "Invalid boost {boost} for field '{field}'. Must be a positive number"
            )));
        }

        Ok(())
    }

    /// Saves the configuration to a TOML file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, toml_string)
            .map_err(|e| Error::config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
