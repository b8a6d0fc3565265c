//! Core types and traits for the varstore checkpoint framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the simulation-side value types a store can bind to (fields, vectors,
//! the mesh that sizes them), the [`StorageBackend`] capability a store
//! persists through, and the error types shared across the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod mesh;
pub mod shared;
pub mod traits;
pub mod vector;

pub use error::{BackendError, MeshError};
pub use field::{Field, Field2D, Field3D};
pub use mesh::{Mesh, Metric};
pub use shared::Shared;
pub use traits::{DataKind, Dims, Persistence, RecordIndex, StorageBackend};
pub use vector::{Axis, Vector, Vector2D, Vector3D};
