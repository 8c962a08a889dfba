//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `DOCSEARCH_` and use double underscores
    /// for nested values. For example:
    /// - `DOCSEARCH_SEARCH__MAX_TERM_BUCKET_SIZE=50`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // config crate doesn't apply serde defaults for nested sections missing from the file
        let builder = set_config_default(
            builder,
            "search.default_flags.fulltext",
            default_fulltext(),
        )?;
        let builder = set_config_default(
            builder,
            "search.default_flags.max_agg_values",
            default_max_agg_values() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "search.default_flags.skip_cache",
            default_skip_cache(),
        )?;
        let builder = set_config_default(
            builder,
            "search.default_flags.skip_aggregates",
            default_skip_aggregates(),
        )?;
        let builder = set_config_default(
            builder,
            "search.default_flags.skip_highlighting",
            default_skip_highlighting(),
        )?;
        let builder = set_config_default(
            builder,
            "search.default_flags.get_suggestions",
            default_get_suggestions(),
        )?;
        let builder = set_config_default(
            builder,
            "search.max_term_bucket_size",
            default_max_term_bucket_size() as i64,
        )?;
        let builder =
            set_config_default(builder, "search.identifier_field", default_identifier_field())?;
        let builder = set_config_default(
            builder,
            "search.soft_delete_field",
            default_soft_delete_field(),
        )?;
        let mut builder =
            set_config_default(builder, "search.suggestion_field", default_suggestion_field())?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        } else {
            debug!("Config file {} not found, using defaults", path.display());
        }

        // Add environment variables with DOCSEARCH_ prefix
        builder = builder.add_source(
            Environment::with_prefix("DOCSEARCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.docsearch/config.toml or custom --config path)
    /// 3. Environment variables (DOCSEARCH_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
