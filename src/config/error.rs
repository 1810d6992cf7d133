//! Error types for config lifecycle operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::path::PathError;

/// Boxed underlying cause of a load or save failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for config operations.
///
/// Backend failures (file I/O, format errors, SQL driver errors) are wrapped
/// into [`ConfigError::Load`] or [`ConfigError::Save`] depending on the
/// operation that hit them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config was closed; every operation on it now fails.
    #[error("The config is already closed")]
    Closed,

    /// A save or cached read happened before any successful load.
    #[error("The config was never loaded")]
    NotLoaded,

    /// A path string could not be parsed.
    #[error("Invalid config path: {0}")]
    Path(#[from] PathError),

    /// Reading from the backend failed.
    #[error("Failed to load config: {source}")]
    Load {
        /// Underlying backend error
        #[source]
        source: BoxError,
    },

    /// Writing to the backend failed.
    #[error("Failed to save config: {source}")]
    Save {
        /// Underlying backend error
        #[source]
        source: BoxError,
    },

    /// The connection could not be re-established within the attempt bound.
    ///
    /// Fatal for the call that hit it. Automatic reconnects stay disarmed
    /// until an explicit `connect()` succeeds.
    #[error("Maximum reconnect attempts exceeded after {attempts} attempts")]
    MaxReconnects {
        /// Attempts counted when the bound tripped
        attempts: u32,
    },

    /// The typed value could not be converted to or from a tree.
    #[error("Failed to map config value: {0}")]
    Mapping(#[source] serde_json::Error),

    /// A null value was passed where a value is required.
    #[error("Value can not be null")]
    NullValue,

    /// A whole-tree replacement was not an object.
    #[error("Config root must be an object")]
    InvalidRoot,

    /// A container was written to a store that only holds leaves.
    #[error("Cannot store a container at '{path}': only leaf values are persisted")]
    ContainerValue {
        /// The path written to
        path: String,
    },

    /// Failed to read a store settings file.
    #[error("Failed to read settings file '{}': {source}", path.display())]
    SettingsRead {
        /// Path to the settings file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a store settings document.
    #[error("Failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// A required store setting is missing.
    #[error("Missing required setting: {field}")]
    MissingSetting {
        /// Name of the missing field
        field: &'static str,
    },

    /// The table name is not a plain SQL identifier.
    #[error("Invalid table name '{name}': expected letters, digits and underscores")]
    InvalidTableName {
        /// The rejected name
        name: String,
    },
}

impl ConfigError {
    /// Wraps a backend failure hit while loading.
    #[must_use]
    pub fn load(source: impl Into<BoxError>) -> Self {
        Self::Load {
            source: source.into(),
        }
    }

    /// Wraps a backend failure hit while saving.
    #[must_use]
    pub fn save(source: impl Into<BoxError>) -> Self {
        Self::Save {
            source: source.into(),
        }
    }

    /// Returns `true` for errors that end the config's usefulness regardless
    /// of retries: closed configs and exhausted reconnects.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Closed | Self::MaxReconnects { .. })
    }
}
