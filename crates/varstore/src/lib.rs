//! varstore: register simulation variables by name and checkpoint them.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all varstore sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use varstore::prelude::*;
//! use varstore::format::MemoryVolumes;
//!
//! let mesh = Mesh::new(8, 4, 2).unwrap();
//! let volumes = MemoryVolumes::new();
//! let backend = Box::new(MemoryBackend::new(volumes.clone()));
//! let mut store = VariableStore::new(backend, mesh.clone(), Arc::new(IoContext::new()));
//!
//! let step = Shared::new(10);
//! let density = Shared::new(Field3D::filled(&mesh, 1.5));
//! let flow = Shared::new(Vector2D::filled(&mesh, [1.0, 0.0, 0.0], true));
//! store.add_int(&step, "iteration", true).unwrap();
//! store.add_field3d(&density, "Ne", false).unwrap();
//! store.add_vector2d(&flow, "V", false).unwrap();
//! store.write("checkpoint").unwrap();
//!
//! // Restore into cleared targets.
//! step.set(0);
//! density.set(Field3D::new());
//! let report = store.read("checkpoint").unwrap();
//! assert!(report.is_complete());
//! assert_eq!(step.get(), 10);
//! assert_eq!(density.get(), Field3D::filled(&mesh, 1.5));
//! assert!(volumes.get("checkpoint").unwrap().contains("V_x"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `varstore-core` | Fields, vectors, mesh, the backend trait |
//! | [`format`] | `varstore-format` | Dataset model, `.vsf` codec, bundled backends |
//! | [`store`] | `varstore-store` | `VariableStore`, `IoContext`, configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types and the storage backend trait (`varstore-core`).
pub use varstore_core as types;

/// Dataset model, binary codec, and bundled backends (`varstore-format`).
///
/// [`format::create_backend`] resolves a format identifier such as
/// `"vsf"` or `"memory"` to a fresh backend.
pub use varstore_format as format;

/// The variable store and its configuration (`varstore-store`).
pub use varstore_store as store;

/// Common imports for typical varstore usage.
///
/// ```rust
/// use varstore::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use varstore_core::{
        Field2D, Field3D, Mesh, Metric, Shared, StorageBackend, Vector2D, Vector3D,
    };

    // Errors
    pub use varstore_core::BackendError;
    pub use varstore_store::{ConfigError, StoreError};

    // Backends
    pub use varstore_format::{create_backend, FileBackend, MemoryBackend};

    // Store
    pub use varstore_store::{
        IoContext, ReadReport, StoreConfig, VarKind, Variable, VariableStore, WriteMode,
    };
}
