//! Backend doubles.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use varstore_core::{BackendError, Persistence, RecordIndex, StorageBackend};
use varstore_format::{MemoryBackend, MemoryVolumes};

/// One call made on a [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    OpenRead(PathBuf),
    OpenWrite { path: PathBuf, append: bool },
    IsValid,
    SetRecord(RecordIndex),
    Close,
    SetLowPrecision,
    ReadInt { name: String, persistence: Persistence },
    ReadReal { name: String, persistence: Persistence },
    ReadArray { name: String, dims: Vec<usize>, persistence: Persistence },
    WriteInt { name: String, value: i32, persistence: Persistence },
    WriteReal { name: String, value: f64, persistence: Persistence },
    WriteArray { name: String, dims: Vec<usize>, persistence: Persistence },
}

impl Call {
    /// The variable name for data calls.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::ReadInt { name, .. }
            | Self::ReadReal { name, .. }
            | Self::ReadArray { name, .. }
            | Self::WriteInt { name, .. }
            | Self::WriteReal { name, .. }
            | Self::WriteArray { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether this call writes data.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::WriteInt { .. } | Self::WriteReal { .. } | Self::WriteArray { .. }
        )
    }
}

/// Call history shared between a [`RecordingBackend`] and the test holding it.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, call: Call) {
        self.lock().push(call);
    }

    /// A copy of every call so far.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Names passed to write calls, in call order.
    pub fn written_names(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|c| c.is_write())
            .filter_map(|c| c.name().map(str::to_string))
            .collect()
    }
}

/// Records every call, then delegates to an inner backend.
pub struct RecordingBackend<B = MemoryBackend> {
    inner: B,
    log: CallLog,
}

impl RecordingBackend<MemoryBackend> {
    /// Record calls on a memory backend with private volumes.
    pub fn new() -> Self {
        Self::wrap(MemoryBackend::new(MemoryVolumes::new()))
    }

    /// Record calls on a memory backend over `volumes`.
    pub fn with_volumes(volumes: MemoryVolumes) -> Self {
        Self::wrap(MemoryBackend::new(volumes))
    }
}

impl Default for RecordingBackend<MemoryBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: StorageBackend> RecordingBackend<B> {
    pub fn wrap(inner: B) -> Self {
        Self {
            inner,
            log: CallLog::default(),
        }
    }

    /// A handle to the call log that stays readable after the backend is
    /// moved into a store.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl<B: StorageBackend> StorageBackend for RecordingBackend<B> {
    fn open_read(&mut self, path: &Path) -> Result<(), BackendError> {
        self.log.push(Call::OpenRead(path.to_path_buf()));
        self.inner.open_read(path)
    }

    fn open_write(&mut self, path: &Path, append: bool) -> Result<(), BackendError> {
        self.log.push(Call::OpenWrite {
            path: path.to_path_buf(),
            append,
        });
        self.inner.open_write(path, append)
    }

    fn is_valid(&self) -> bool {
        self.log.push(Call::IsValid);
        self.inner.is_valid()
    }

    fn set_record(&mut self, record: RecordIndex) {
        self.log.push(Call::SetRecord(record));
        self.inner.set_record(record);
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.log.push(Call::Close);
        self.inner.close()
    }

    fn set_low_precision(&mut self) {
        self.log.push(Call::SetLowPrecision);
        self.inner.set_low_precision();
    }

    fn read_int(&mut self, name: &str, persistence: Persistence) -> Result<i32, BackendError> {
        self.log.push(Call::ReadInt {
            name: name.to_string(),
            persistence,
        });
        self.inner.read_int(name, persistence)
    }

    fn read_real(&mut self, name: &str, persistence: Persistence) -> Result<f64, BackendError> {
        self.log.push(Call::ReadReal {
            name: name.to_string(),
            persistence,
        });
        self.inner.read_real(name, persistence)
    }

    fn read_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        out: &mut [f64],
    ) -> Result<(), BackendError> {
        self.log.push(Call::ReadArray {
            name: name.to_string(),
            dims: dims.to_vec(),
            persistence,
        });
        self.inner.read_array(name, dims, persistence, out)
    }

    fn write_int(
        &mut self,
        name: &str,
        value: i32,
        persistence: Persistence,
    ) -> Result<(), BackendError> {
        self.log.push(Call::WriteInt {
            name: name.to_string(),
            value,
            persistence,
        });
        self.inner.write_int(name, value, persistence)
    }

    fn write_real(
        &mut self,
        name: &str,
        value: f64,
        persistence: Persistence,
    ) -> Result<(), BackendError> {
        self.log.push(Call::WriteReal {
            name: name.to_string(),
            value,
            persistence,
        });
        self.inner.write_real(name, value, persistence)
    }

    fn write_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        data: &[f64],
    ) -> Result<(), BackendError> {
        self.log.push(Call::WriteArray {
            name: name.to_string(),
            dims: dims.to_vec(),
            persistence,
        });
        self.inner.write_array(name, dims, persistence, data)
    }
}

/// Delegates to an inner backend but fails on demand.
///
/// Reads of names added with [`fail_reads_of`](Self::fail_reads_of)
/// return an I/O error. [`fail_open`](Self::fail_open) makes both open
/// calls fail; [`report_invalid`](Self::report_invalid) lets opens succeed
/// while `is_valid` returns false.
pub struct FaultyBackend<B = MemoryBackend> {
    inner: B,
    failing_reads: HashSet<String>,
    fail_open: bool,
    report_invalid: bool,
}

impl FaultyBackend<MemoryBackend> {
    /// A faulty memory backend over `volumes`.
    pub fn with_volumes(volumes: MemoryVolumes) -> Self {
        Self::wrap(MemoryBackend::new(volumes))
    }
}

impl<B: StorageBackend> FaultyBackend<B> {
    pub fn wrap(inner: B) -> Self {
        Self {
            inner,
            failing_reads: HashSet::new(),
            fail_open: false,
            report_invalid: false,
        }
    }

    pub fn fail_reads_of(mut self, name: impl Into<String>) -> Self {
        self.failing_reads.insert(name.into());
        self
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn report_invalid(mut self) -> Self {
        self.report_invalid = true;
        self
    }

    fn check_open(&self) -> Result<(), BackendError> {
        if self.fail_open {
            return Err(BackendError::Io(io::Error::other("injected open failure")));
        }
        Ok(())
    }

    fn check_read(&self, name: &str) -> Result<(), BackendError> {
        if self.failing_reads.contains(name) {
            return Err(BackendError::Io(io::Error::other(format!(
                "injected read failure for '{name}'"
            ))));
        }
        Ok(())
    }
}

impl<B: StorageBackend> StorageBackend for FaultyBackend<B> {
    fn open_read(&mut self, path: &Path) -> Result<(), BackendError> {
        self.check_open()?;
        self.inner.open_read(path)
    }

    fn open_write(&mut self, path: &Path, append: bool) -> Result<(), BackendError> {
        self.check_open()?;
        self.inner.open_write(path, append)
    }

    fn is_valid(&self) -> bool {
        !self.report_invalid && self.inner.is_valid()
    }

    fn set_record(&mut self, record: RecordIndex) {
        self.inner.set_record(record);
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.inner.close()
    }

    fn set_low_precision(&mut self) {
        self.inner.set_low_precision();
    }

    fn read_int(&mut self, name: &str, persistence: Persistence) -> Result<i32, BackendError> {
        self.check_read(name)?;
        self.inner.read_int(name, persistence)
    }

    fn read_real(&mut self, name: &str, persistence: Persistence) -> Result<f64, BackendError> {
        self.check_read(name)?;
        self.inner.read_real(name, persistence)
    }

    fn read_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        out: &mut [f64],
    ) -> Result<(), BackendError> {
        self.check_read(name)?;
        self.inner.read_array(name, dims, persistence, out)
    }

    fn write_int(
        &mut self,
        name: &str,
        value: i32,
        persistence: Persistence,
    ) -> Result<(), BackendError> {
        self.inner.write_int(name, value, persistence)
    }

    fn write_real(
        &mut self,
        name: &str,
        value: f64,
        persistence: Persistence,
    ) -> Result<(), BackendError> {
        self.inner.write_real(name, value, persistence)
    }

    fn write_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        data: &[f64],
    ) -> Result<(), BackendError> {
        self.inner.write_array(name, dims, persistence, data)
    }
}
