//! The storage backend capability and its vocabulary types.

use std::fmt;
use std::path::Path;

use smallvec::SmallVec;

use crate::error::BackendError;

/// Shape of an array variable: one extent per axis, empty for scalars.
pub type Dims = SmallVec<[usize; 3]>;

/// Value kind of a stored variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// 32-bit signed integers.
    Int,
    /// Double-precision reals (possibly stored at single precision).
    Real,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "integer"),
            Self::Real => write!(f, "real"),
        }
    }
}

/// Whether a variable holds one overwritten value or a growing time series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Persistence {
    /// A single value, replaced on every write.
    #[default]
    Fixed,
    /// One record appended per write; reads address a record index.
    Grow,
}

impl Persistence {
    /// `Grow` when `grow` is true, `Fixed` otherwise.
    pub fn from_grow(grow: bool) -> Self {
        if grow {
            Self::Grow
        } else {
            Self::Fixed
        }
    }

    /// Returns `true` for [`Persistence::Grow`].
    pub fn is_grow(self) -> bool {
        matches!(self, Self::Grow)
    }
}

impl fmt::Display for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "single value"),
            Self::Grow => write!(f, "time series"),
        }
    }
}

/// Record addressed by record-mode primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RecordIndex {
    /// Reads return the most recent record; writes append a new one.
    #[default]
    Latest,
    /// A specific zero-based record. Writing at `n == len` appends.
    At(usize),
}

/// A structured-storage backend the store persists variables through.
///
/// A backend holds at most one open dataset. Every data primitive is
/// keyed by variable name and takes a [`Persistence`] selecting the plain
/// or the record-indexed form. Array primitives carry the expected
/// [`Dims`]; the buffer length must equal their product.
///
/// Implementations must be `Send` so a store can move between threads.
pub trait StorageBackend: Send {
    /// Open an existing dataset for reading.
    fn open_read(&mut self, path: &Path) -> Result<(), BackendError>;

    /// Open a dataset for writing. With `append` the existing contents
    /// are kept and grown; otherwise the dataset starts empty.
    fn open_write(&mut self, path: &Path, append: bool) -> Result<(), BackendError>;

    /// Whether the handle currently holds a usable dataset.
    fn is_valid(&self) -> bool;

    /// Select the record used by record-mode primitives.
    fn set_record(&mut self, record: RecordIndex);

    /// Flush (when writable) and release the open dataset.
    ///
    /// The handle is released even when flushing fails. Closing a handle
    /// with nothing open is a no-op.
    fn close(&mut self) -> Result<(), BackendError>;

    /// Store subsequently written reals at single precision.
    fn set_low_precision(&mut self);

    /// Read an integer scalar.
    fn read_int(&mut self, name: &str, persistence: Persistence) -> Result<i32, BackendError>;

    /// Read a real scalar.
    fn read_real(&mut self, name: &str, persistence: Persistence) -> Result<f64, BackendError>;

    /// Read a real array of shape `dims` into `out`.
    fn read_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        out: &mut [f64],
    ) -> Result<(), BackendError>;

    /// Write an integer scalar.
    fn write_int(
        &mut self,
        name: &str,
        value: i32,
        persistence: Persistence,
    ) -> Result<(), BackendError>;

    /// Write a real scalar.
    fn write_real(
        &mut self,
        name: &str,
        value: f64,
        persistence: Persistence,
    ) -> Result<(), BackendError>;

    /// Write a real array of shape `dims`.
    fn write_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        data: &[f64],
    ) -> Result<(), BackendError>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn open_read(&mut self, path: &Path) -> Result<(), BackendError> {
        (**self).open_read(path)
    }

    fn open_write(&mut self, path: &Path, append: bool) -> Result<(), BackendError> {
        (**self).open_write(path, append)
    }

    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }

    fn set_record(&mut self, record: RecordIndex) {
        (**self).set_record(record)
    }

    fn close(&mut self) -> Result<(), BackendError> {
        (**self).close()
    }

    fn set_low_precision(&mut self) {
        (**self).set_low_precision()
    }

    fn read_int(&mut self, name: &str, persistence: Persistence) -> Result<i32, BackendError> {
        (**self).read_int(name, persistence)
    }

    fn read_real(&mut self, name: &str, persistence: Persistence) -> Result<f64, BackendError> {
        (**self).read_real(name, persistence)
    }

    fn read_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        out: &mut [f64],
    ) -> Result<(), BackendError> {
        (**self).read_array(name, dims, persistence, out)
    }

    fn write_int(
        &mut self,
        name: &str,
        value: i32,
        persistence: Persistence,
    ) -> Result<(), BackendError> {
        (**self).write_int(name, value, persistence)
    }

    fn write_real(
        &mut self,
        name: &str,
        value: f64,
        persistence: Persistence,
    ) -> Result<(), BackendError> {
        (**self).write_real(name, value, persistence)
    }

    fn write_array(
        &mut self,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        data: &[f64],
    ) -> Result<(), BackendError> {
        (**self).write_array(name, dims, persistence, data)
    }
}
