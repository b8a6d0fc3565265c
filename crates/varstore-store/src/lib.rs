//! Variable registry and checkpoint driver for varstore.
//!
//! A [`VariableStore`] holds named bindings to caller-owned scalars,
//! fields, and vectors, and moves all of them to or from a
//! [`StorageBackend`](varstore_core::StorageBackend) in one pass.
//!
//! # Architecture
//!
//! - [`VariableStore`] registers variables and drives reads and writes
//! - [`IoContext`] carries the output switch and I/O time shared by stores
//! - [`StoreConfig`] describes a store to build with
//!   [`VariableStore::from_config`]
//! - [`ReadReport`] lists which variables were restored and which were
//!   zero-filled

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
mod registry;
pub mod store;
mod transfer;

pub use config::{ConfigError, StoreConfig};
pub use context::IoContext;
pub use error::StoreError;
pub use registry::{VarKind, Variable};
pub use store::{VariableStore, WriteMode};
pub use transfer::{component_name, ReadReport};
