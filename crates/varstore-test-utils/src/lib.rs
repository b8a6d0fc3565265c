//! Test doubles and fixtures for varstore development.
//!
//! Provides backend doubles implementing
//! [`StorageBackend`](varstore_core::StorageBackend) ([`RecordingBackend`],
//! [`FaultyBackend`]), mesh and field fixtures, and [`capture_logs`] for
//! asserting on emitted `tracing` events.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backends;
pub mod fixtures;
pub mod logs;

pub use backends::{Call, CallLog, FaultyBackend, RecordingBackend};
pub use fixtures::{ramp_field2d, ramp_field3d, ramp_vector2d, ramp_vector3d, small_mesh};
pub use logs::{capture_logs, count_level, LogBuffer};
