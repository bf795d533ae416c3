//! Runtime configuration for the scheduling core.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `SHOPFLOOR_`.

use crate::scheduling::services::{DEFAULT_ITEM_NAME, DateFilterMode};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "SHOPFLOOR_";

/// Scheduling core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopfloorConfig {
    /// PostgreSQL connection URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum connections in the database pool.
    pub pool_size: u32,
    /// How listing bounds are interpreted.
    pub date_filter: DateFilterMode,
    /// Name of the item created for project-only task links.
    pub default_item_name: String,
}

impl Default for ShopfloorConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_size: 8,
            date_filter: DateFilterMode::default(),
            default_item_name: DEFAULT_ITEM_NAME.to_owned(),
        }
    }
}

/// Error raised while loading configuration.
#[derive(Debug, Error)]
#[error("invalid shopfloor configuration: {0}")]
pub struct ConfigLoadError(#[from] Box<figment::Error>);

impl ShopfloorConfig {
    /// Loads configuration from defaults, `path` when given, and the
    /// environment.
    ///
    /// A missing TOML file is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] when a source holds a malformed value.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = path {
            figment = figment.merge(Toml::file(file));
        }
        Self::from_figment(&figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extracts configuration from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] when extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigLoadError> {
        figment
            .extract()
            .map_err(|err| ConfigLoadError(Box::new(err)))
    }
}
