use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::{ActionCatalog, ActionRecord, CatalogError, canonical_actions};

/// Represents errors that can occur while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid {axis} bounds: min {min} is greater than max {max}")]
    InvalidBounds {
        axis: &'static str,
        min: i32,
        max: i32,
    },
    #[error("Invalid action catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Bounds a puzzle must respect to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
    /// Lowest valid coordinate on either axis.
    pub counting_field_from: i32,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            min_width: 5,
            max_width: 25,
            min_height: 5,
            max_height: 25,
            counting_field_from: 1,
        }
    }
}

/// Everything the validator and checker need, passed explicitly to each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub validation: ValidationSettings,
    pub actions: Vec<ActionRecord>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            validation: ValidationSettings::default(),
            actions: canonical_actions().iter().map(ActionRecord::from).collect(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file. Missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.check()?;
        Ok(settings)
    }

    /// Builds the action catalog described by these settings.
    pub fn catalog(&self) -> Result<ActionCatalog, CatalogError> {
        ActionCatalog::from_records(self.actions.iter().cloned())
    }

    fn check(&self) -> Result<(), ConfigError> {
        let v = &self.validation;
        if v.min_width > v.max_width {
            return Err(ConfigError::InvalidBounds {
                axis: "width",
                min: v.min_width,
                max: v.max_width,
            });
        }
        if v.min_height > v.max_height {
            return Err(ConfigError::InvalidBounds {
                axis: "height",
                min: v.min_height,
                max: v.max_height,
            });
        }
        self.catalog()?;
        Ok(())
    }
}
