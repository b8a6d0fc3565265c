//! [`StorageBackend`] implementation over any [`Volume`].
//!
//! The whole dataset is loaded on open and kept in memory; writes mutate
//! that copy and [`close`](StorageBackend::close) stores it back. A read
//! handle never stores anything.

use std::path::{Path, PathBuf};

use tracing::debug;
use varstore_core::{BackendError, DataKind, Persistence, RecordIndex, StorageBackend};

use crate::dataset::{element_count, Dataset};
use crate::volume::{Filesystem, MemoryVolumes, Volume};

/// Backend writing `.vsf` files to disk.
pub type FileBackend = DatasetBackend<Filesystem>;

/// Backend keeping datasets in a shared in-process map.
pub type MemoryBackend = DatasetBackend<MemoryVolumes>;

struct OpenDataset {
    path: PathBuf,
    dataset: Dataset,
    writable: bool,
}

/// A backend holding at most one open [`Dataset`] loaded from a [`Volume`].
pub struct DatasetBackend<V: Volume> {
    volume: V,
    open: Option<OpenDataset>,
    record: RecordIndex,
    low_precision: bool,
}

impl<V: Volume> DatasetBackend<V> {
    /// A closed backend over `volume`.
    pub fn new(volume: V) -> Self {
        Self {
            volume,
            open: None,
            record: RecordIndex::Latest,
            low_precision: false,
        }
    }

    /// The underlying volume.
    pub fn volume(&self) -> &V {
        &self.volume
    }

    /// The currently open dataset, if any.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.open.as_ref().map(|o| &o.dataset)
    }

    /// Whether reals are written at single precision.
    pub fn is_low_precision(&self) -> bool {
        self.low_precision
    }

    fn opened(&self) -> Result<&Dataset, BackendError> {
        self.open
            .as_ref()
            .map(|o| &o.dataset)
            .ok_or(BackendError::NotOpen)
    }

    fn writable(&mut self) -> Result<&mut Dataset, BackendError> {
        match self.open.as_mut() {
            None => Err(BackendError::NotOpen),
            Some(o) if !o.writable => Err(BackendError::ReadOnly),
            Some(o) => Ok(&mut o.dataset),
        }
    }

    fn read_values(
        &self,
        name: &str,
        kind: DataKind,
        dims: &[usize],
        persistence: Persistence,
    ) -> Result<&[f64], BackendError> {
        self.opened()?
            .read(name, kind, dims, persistence, self.record)
    }

    fn write_values(
        &mut self,
        name: &str,
        kind: DataKind,
        dims: &[usize],
        persistence: Persistence,
        values: &[f64],
    ) -> Result<(), BackendError> {
        let (record, low_precision) = (self.record, self.low_precision);
        self.writable()?
            .write(name, kind, dims, persistence, record, low_precision, values)
    }

    fn release(&mut self) -> Result<(), BackendError> {
        let Some(open) = self.open.take() else {
            return Ok(());
        };
        if open.writable {
            self.volume.store(&open.path, &open.dataset)?;
            debug!(path = %open.path.display(), vars = open.dataset.len(), "stored dataset");
        }
        Ok(())
    }
}

impl<V: Volume> StorageBackend for DatasetBackend<V> {
    fn open_read(&mut self, path: &Path) -> Result<(), BackendError> {
        self.release()?;
        let dataset = self
            .volume
            .load(path)?
            .ok_or_else(|| BackendError::MissingDataset {
                path: path.to_path_buf(),
            })?;
        debug!(path = %path.display(), vars = dataset.len(), "opened dataset for reading");
        self.open = Some(OpenDataset {
            path: path.to_path_buf(),
            dataset,
            writable: false,
        });
        Ok(())
    }

    fn open_write(&mut self, path: &Path, append: bool) -> Result<(), BackendError> {
        self.release()?;
        let dataset = if append {
            self.volume.load(path)?.unwrap_or_default()
        } else {
            Dataset::new()
        };
        debug!(path = %path.display(), append, "opened dataset for writing");
        self.open = Some(OpenDataset {
            path: path.to_path_buf(),
            dataset,
            writable: true,
        });
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.open.is_some()
    }

    fn set_record(&mut self, record: RecordIndex) {
        self.record = record;
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.release()
    }

    fn set_low_precision(&mut self) {
        self.low_precision = true;
    }

    fn read_int(&mut self, name: &str, persistence: Persistence) -> Result<i32, BackendError> {
        let values = self.read_values(name, DataKind::Int, &[], persistence)?;
        Ok(values[0] as i32)
    }

    fn read_real(&mut self, name: &str, persistence: Persistence) -> Result<f64, BackendError> {
        let values = self.read_values(name, DataKind::Real, &[], persistence)?;
        Ok(values[0])
    }

    fn read_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        out: &mut [f64],
    ) -> Result<(), BackendError> {
        let expected = element_count(dims);
        if out.len() != expected {
            return Err(BackendError::BufferLength {
                name: name.to_string(),
                expected,
                found: out.len(),
            });
        }
        let values = self.read_values(name, DataKind::Real, dims, persistence)?;
        out.copy_from_slice(values);
        Ok(())
    }

    fn write_int(
        &mut self,
        name: &str,
        value: i32,
        persistence: Persistence,
    ) -> Result<(), BackendError> {
        self.write_values(name, DataKind::Int, &[], persistence, &[value as f64])
    }

    fn write_real(
        &mut self,
        name: &str,
        value: f64,
        persistence: Persistence,
    ) -> Result<(), BackendError> {
        self.write_values(name, DataKind::Real, &[], persistence, &[value])
    }

    fn write_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        data: &[f64],
    ) -> Result<(), BackendError> {
        self.write_values(name, DataKind::Real, dims, persistence, data)
    }
}
