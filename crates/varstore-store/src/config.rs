//! Store configuration.

use std::error::Error;
use std::fmt;

use varstore_format::is_known_format;

/// Construction-time settings for a [`VariableStore`](crate::VariableStore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend format identifier, resolved by
    /// [`create_backend`](varstore_format::create_backend).
    pub format: String,
    /// Write reals at single precision.
    pub low_precision: bool,
    /// Path used by the `*_default` read and write operations.
    pub default_path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            format: "vsf".to_string(),
            low_precision: false,
            default_path: None,
        }
    }
}

impl StoreConfig {
    /// Set the backend format identifier.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Enable or disable single-precision reals.
    pub fn with_low_precision(mut self, low_precision: bool) -> Self {
        self.low_precision = low_precision;
        self
    }

    /// Set the default dataset path.
    pub fn with_default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    /// Check the configuration without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_known_format(&self.format) {
            return Err(ConfigError::UnknownFormat {
                id: self.format.clone(),
            });
        }
        if matches!(self.default_path.as_deref(), Some("")) {
            return Err(ConfigError::EmptyDefaultPath);
        }
        Ok(())
    }
}

/// Errors detected by [`StoreConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The format identifier is not recognized.
    UnknownFormat {
        /// The rejected identifier.
        id: String,
    },
    /// A default path was set to the empty string.
    EmptyDefaultPath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFormat { id } => write!(f, "unknown data format '{id}'"),
            Self::EmptyDefaultPath => write!(f, "default path is empty"),
        }
    }
}

impl Error for ConfigError {}
