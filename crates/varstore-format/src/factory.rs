//! Resolve format identifiers and file extensions to backends.

use std::path::Path;

use varstore_core::StorageBackend;

use crate::backend::{FileBackend, MemoryBackend};
use crate::volume::{Filesystem, MemoryVolumes};

/// Identifiers accepted for the in-process memory format.
pub const MEMORY_FORMATS: &[&str] = &["memory", "mem"];

/// Identifiers (and file extensions) accepted for the `.vsf` file format.
pub const FILE_FORMATS: &[&str] = &["vsf", "bin"];

/// Create a fresh backend for format identifier `id` (case-insensitive).
///
/// The memory format is backed by [`MemoryVolumes::global`], so every
/// backend created this way sees the same datasets. Returns `None` for an
/// unknown identifier.
pub fn create_backend(id: &str) -> Option<Box<dyn StorageBackend>> {
    let id = id.trim().to_ascii_lowercase();
    if MEMORY_FORMATS.contains(&id.as_str()) {
        Some(Box::new(MemoryBackend::new(MemoryVolumes::global())))
    } else if FILE_FORMATS.contains(&id.as_str()) {
        Some(Box::new(FileBackend::new(Filesystem)))
    } else {
        None
    }
}

/// Create a backend chosen by the extension of `path`.
pub fn backend_for_path(path: impl AsRef<Path>) -> Option<Box<dyn StorageBackend>> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(create_backend)
}

/// Whether `id` names a known format.
pub fn is_known_format(id: &str) -> bool {
    let id = id.trim().to_ascii_lowercase();
    MEMORY_FORMATS.contains(&id.as_str()) || FILE_FORMATS.contains(&id.as_str())
}
