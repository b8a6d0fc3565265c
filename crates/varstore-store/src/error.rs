//! Error types for registration and checkpoint I/O.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use varstore_core::BackendError;

use crate::config::ConfigError;

/// Errors returned by [`VariableStore`](crate::VariableStore) operations.
///
/// Per-variable read failures are not errors: they are zero-filled and
/// listed in [`ReadReport::zeroed`](crate::ReadReport::zeroed).
#[derive(Debug)]
pub enum StoreError {
    /// A variable with this name is already registered (under any kind).
    DuplicateName {
        /// The rejected name.
        name: String,
    },
    /// No path was given and no default path is set.
    MissingPath,
    /// The backend could not open the dataset.
    Open {
        /// Dataset path.
        path: PathBuf,
        /// Backend failure.
        source: BackendError,
    },
    /// The backend opened the dataset but reports the handle unusable.
    InvalidBackend {
        /// Dataset path.
        path: PathBuf,
    },
    /// The backend failed to flush a written dataset on close.
    Close {
        /// Dataset path.
        path: PathBuf,
        /// Backend failure.
        source: BackendError,
    },
    /// The format identifier is not recognized.
    UnknownFormat {
        /// The rejected identifier.
        id: String,
    },
    /// The store configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => {
                write!(f, "variable '{name}' is already registered")
            }
            Self::MissingPath => write!(f, "no dataset path given and no default path set"),
            Self::Open { path, source } => {
                write!(f, "could not open '{}': {source}", path.display())
            }
            Self::InvalidBackend { path } => {
                write!(f, "backend handle for '{}' is not valid", path.display())
            }
            Self::Close { path, source } => {
                write!(f, "could not close '{}': {source}", path.display())
            }
            Self::UnknownFormat { id } => write!(f, "unknown data format '{id}'"),
            Self::Config(e) => write!(f, "invalid store configuration: {e}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Close { source, .. } => Some(source),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
