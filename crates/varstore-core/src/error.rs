//! Error types shared across the varstore workspace.
//!
//! [`BackendError`] is returned by every fallible [`StorageBackend`]
//! primitive; [`MeshError`] covers invalid grid extents and metrics.
//!
//! [`StorageBackend`]: crate::traits::StorageBackend

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::traits::{DataKind, Dims, Persistence};

/// Errors reported by a storage backend.
#[derive(Debug)]
pub enum BackendError {
    /// An I/O error occurred while loading or flushing a dataset.
    Io(io::Error),
    /// No dataset exists at the requested path.
    MissingDataset {
        /// The path that was opened for reading.
        path: PathBuf,
    },
    /// A primitive was called while no dataset is open.
    NotOpen,
    /// A write primitive was called on a handle opened for reading.
    ReadOnly,
    /// The named variable is not present in the dataset.
    NotFound {
        /// Variable name.
        name: String,
    },
    /// The stored variable has a different value kind than requested.
    KindMismatch {
        /// Variable name.
        name: String,
        /// Kind requested by the caller.
        expected: DataKind,
        /// Kind stored in the dataset.
        found: DataKind,
    },
    /// The stored variable has a different shape than requested.
    ShapeMismatch {
        /// Variable name.
        name: String,
        /// Shape requested by the caller.
        expected: Dims,
        /// Shape stored in the dataset.
        found: Dims,
    },
    /// The variable was stored as a time series but accessed as a single
    /// value, or the reverse.
    PersistenceMismatch {
        /// Variable name.
        name: String,
        /// How the variable is stored.
        stored: Persistence,
    },
    /// The addressed record does not exist.
    RecordOutOfRange {
        /// Variable name.
        name: String,
        /// Requested record index.
        record: usize,
        /// Number of records available.
        available: usize,
    },
    /// The buffer handed to an array primitive does not match its dims.
    BufferLength {
        /// Variable name.
        name: String,
        /// Element count implied by the dims.
        expected: usize,
        /// Length of the caller's buffer.
        found: usize,
    },
    /// The file does not start with the expected magic bytes.
    InvalidMagic,
    /// The file's format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// The file body could not be decoded.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingDataset { path } => {
                write!(f, "no dataset at '{}'", path.display())
            }
            Self::NotOpen => write!(f, "no dataset is open"),
            Self::ReadOnly => write!(f, "dataset is open read-only"),
            Self::NotFound { name } => write!(f, "variable '{name}' not found"),
            Self::KindMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "variable '{name}' holds {found} values, expected {expected}"
            ),
            Self::ShapeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "variable '{name}' has shape {:?}, expected {:?}",
                found.as_slice(),
                expected.as_slice()
            ),
            Self::PersistenceMismatch { name, stored } => {
                write!(f, "variable '{name}' is stored as {stored}")
            }
            Self::RecordOutOfRange {
                name,
                record,
                available,
            } => write!(
                f,
                "record {record} of variable '{name}' out of range ({available} available)"
            ),
            Self::BufferLength {
                name,
                expected,
                found,
            } => write!(
                f,
                "buffer for '{name}' has {found} elements, dims imply {expected}"
            ),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"VSTF\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed dataset: {detail}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BackendError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Errors from constructing a [`Mesh`](crate::Mesh) or shaping a field to it.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshError {
    /// A grid extent is zero.
    EmptyExtent {
        /// Axis label (`"x"`, `"y"` or `"z"`).
        axis: &'static str,
    },
    /// A metric coefficient is zero, negative, or not finite.
    InvalidMetric {
        /// Coefficient label (`"g11"`, `"g22"` or `"g33"`).
        component: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Supplied data does not match the mesh extents.
    DataLength {
        /// Element count implied by the mesh.
        expected: usize,
        /// Element count supplied.
        found: usize,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyExtent { axis } => write!(f, "mesh extent along {axis} is zero"),
            Self::InvalidMetric { component, value } => {
                write!(f, "metric coefficient {component} must be finite and positive, got {value}")
            }
            Self::DataLength { expected, found } => {
                write!(f, "data has {found} elements, mesh implies {expected}")
            }
        }
    }
}

impl Error for MeshError {}
