//! Dataset model, binary codec, and bundled backends for varstore.
//!
//! Every bundled backend keeps one whole [`Dataset`] in memory while a
//! handle is open and hands it to a [`Volume`] when the handle closes.
//!
//! # Architecture
//!
//! - [`Dataset`] holds named variables with fixed or time-series storage
//! - [`DatasetBackend`] implements [`StorageBackend`](varstore_core::StorageBackend)
//!   over any [`Volume`]
//! - [`Filesystem`] persists through the `.vsf` codec in [`codec`]
//! - [`MemoryVolumes`] keeps datasets in a shared in-process map
//! - [`create_backend`] resolves a format identifier to a fresh backend
//!
//! # Format
//!
//! ```text
//! [MAGIC "VSTF"] [VERSION u8] [COUNT u32]
//! [Variable 1] [Variable 2] ... [Variable N]
//! ```
//!
//! Each variable carries its name, kind, persistence, precision, shape,
//! and every stored record.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod codec;
pub mod dataset;
pub mod factory;
pub mod volume;

pub use backend::{DatasetBackend, FileBackend, MemoryBackend};
pub use codec::{decode_dataset, encode_dataset};
pub use dataset::{Dataset, Variable};
pub use factory::{backend_for_path, create_backend, is_known_format};
pub use volume::{Filesystem, MemoryVolumes, Volume};

/// Magic bytes at the start of every `.vsf` file.
pub const MAGIC: [u8; 4] = *b"VSTF";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
