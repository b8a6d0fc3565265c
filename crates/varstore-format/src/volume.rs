//! Where datasets live between an open and a close.
//!
//! A [`Volume`] loads a whole [`Dataset`] on open and stores it back on
//! close. [`Filesystem`] persists through the `.vsf` codec;
//! [`MemoryVolumes`] keeps datasets in a shared in-process map.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use varstore_core::BackendError;

use crate::codec::{decode_dataset, encode_dataset};
use crate::dataset::Dataset;

/// Storage for whole datasets keyed by path.
pub trait Volume: Send {
    /// Load the dataset at `path`, or `None` if there is none.
    fn load(&self, path: &Path) -> Result<Option<Dataset>, BackendError>;

    /// Store `dataset` at `path`, replacing any previous contents.
    fn store(&self, path: &Path, dataset: &Dataset) -> Result<(), BackendError>;
}

/// `.vsf` files on the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct Filesystem;

impl Volume for Filesystem {
    fn load(&self, path: &Path) -> Result<Option<Dataset>, BackendError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut reader = BufReader::new(file);
        decode_dataset(&mut reader).map(Some)
    }

    /// Encode into a sibling temporary file, then rename it over `path`.
    /// The previous contents of `path` survive a failed store.
    fn store(&self, path: &Path, dataset: &Dataset) -> Result<(), BackendError> {
        let tmp = temp_sibling(path);
        let written = write_dataset(&tmp, dataset)
            .and_then(|()| fs::rename(&tmp, path).map_err(BackendError::from));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }
}

fn write_dataset(path: &Path, dataset: &Dataset) -> Result<(), BackendError> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode_dataset(&mut writer, dataset)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// `dump.vsf` -> `dump.vsf.tmp`, in the same directory so the rename
/// stays on one filesystem.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// An in-process set of datasets shared by every clone.
///
/// Two backends built over clones of the same `MemoryVolumes` see each
/// other's closed datasets, which lets a checkpoint written by one store
/// be restored by another without touching the disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryVolumes {
    datasets: Arc<Mutex<HashMap<PathBuf, Dataset>>>,
}

impl MemoryVolumes {
    /// An empty, private set of volumes.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide set used by the `"memory"` format identifier.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<MemoryVolumes> = OnceLock::new();
        GLOBAL.get_or_init(MemoryVolumes::new).clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Dataset>> {
        self.datasets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the dataset stored at `path`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Dataset> {
        self.lock().get(path.as_ref()).cloned()
    }

    /// Whether a dataset exists at `path`.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.lock().contains_key(path.as_ref())
    }

    /// Remove and return the dataset at `path`.
    pub fn remove(&self, path: impl AsRef<Path>) -> Option<Dataset> {
        self.lock().remove(path.as_ref())
    }

    /// Number of stored datasets.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no datasets are stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Volume for MemoryVolumes {
    fn load(&self, path: &Path) -> Result<Option<Dataset>, BackendError> {
        Ok(self.get(path))
    }

    fn store(&self, path: &Path, dataset: &Dataset) -> Result<(), BackendError> {
        self.lock().insert(path.to_path_buf(), dataset.clone());
        Ok(())
    }
}
