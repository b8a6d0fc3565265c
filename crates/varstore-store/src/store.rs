//! The variable store: registration, backend selection, and the
//! checkpoint read/write drivers.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;
use varstore_core::{
    Field2D, Field3D, Mesh, RecordIndex, Shared, StorageBackend, Vector2D, Vector3D,
};
use varstore_format::create_backend;

use crate::config::StoreConfig;
use crate::context::IoContext;
use crate::error::StoreError;
use crate::registry::{Registry, VarKind, Variable};
use crate::transfer::{self, ReadReport};

/// How [`VariableStore::write_with`] opens the dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Start from an empty dataset, discarding existing contents.
    #[default]
    Overwrite,
    /// Keep existing contents; time-series variables gain a record.
    Append,
}

/// A registry of named simulation variables that can be checkpointed to
/// and restored from a storage backend in one pass.
///
/// Variables are bound through [`Shared`] handles: the caller keeps
/// ownership and the store locks each target only while transferring it.
/// Every [`read`](Self::read) and [`write`](Self::write) visits variables
/// kind by kind (see [`VarKind::ORDER`]) and in registration order within
/// a kind.
pub struct VariableStore {
    registry: Registry,
    backend: Box<dyn StorageBackend>,
    mesh: Mesh,
    context: Arc<IoContext>,
    low_precision: bool,
    default_path: Option<String>,
}

impl VariableStore {
    /// A store with no variables, persisting through `backend`.
    pub fn new(backend: Box<dyn StorageBackend>, mesh: Mesh, context: Arc<IoContext>) -> Self {
        Self {
            registry: Registry::default(),
            backend,
            mesh,
            context,
            low_precision: false,
            default_path: None,
        }
    }

    /// Build a store from a validated [`StoreConfig`].
    pub fn from_config(
        config: &StoreConfig,
        mesh: Mesh,
        context: Arc<IoContext>,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        let backend = create_backend(&config.format).ok_or_else(|| StoreError::UnknownFormat {
            id: config.format.clone(),
        })?;
        let mut store = Self::new(backend, mesh, context);
        if config.low_precision {
            store.set_low_precision();
        }
        store.default_path = config.default_path.clone();
        Ok(store)
    }

    /// The mesh sizing field buffers and supplying the vector metric.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The shared I/O context.
    pub fn context(&self) -> &Arc<IoContext> {
        &self.context
    }

    // ── Registration ────────────────────────────────────────────

    /// Register `variable` under `name`. With `grow`, every write appends
    /// a record instead of replacing the stored value.
    ///
    /// Fails with [`StoreError::DuplicateName`] if `name` is already used
    /// by a variable of any kind; the store is unchanged.
    pub fn add(&mut self, variable: Variable, name: &str, grow: bool) -> Result<(), StoreError> {
        self.registry.insert(variable, name, grow)
    }

    /// Register an integer scalar.
    pub fn add_int(
        &mut self,
        target: &Shared<i32>,
        name: &str,
        grow: bool,
    ) -> Result<(), StoreError> {
        self.add(Variable::Int(target.clone()), name, grow)
    }

    /// Register a real scalar.
    pub fn add_real(
        &mut self,
        target: &Shared<f64>,
        name: &str,
        grow: bool,
    ) -> Result<(), StoreError> {
        self.add(Variable::Real(target.clone()), name, grow)
    }

    /// Register a 2D field.
    pub fn add_field2d(
        &mut self,
        target: &Shared<Field2D>,
        name: &str,
        grow: bool,
    ) -> Result<(), StoreError> {
        self.add(Variable::Field2D(target.clone()), name, grow)
    }

    /// Register a 3D field.
    pub fn add_field3d(
        &mut self,
        target: &Shared<Field3D>,
        name: &str,
        grow: bool,
    ) -> Result<(), StoreError> {
        self.add(Variable::Field3D(target.clone()), name, grow)
    }

    /// Register a 2D vector. Its current basis decides the component names
    /// and the basis written to and restored from the dataset.
    pub fn add_vector2d(
        &mut self,
        target: &Shared<Vector2D>,
        name: &str,
        grow: bool,
    ) -> Result<(), StoreError> {
        self.add(Variable::Vector2D(target.clone()), name, grow)
    }

    /// Register a 3D vector. See [`add_vector2d`](Self::add_vector2d).
    pub fn add_vector3d(
        &mut self,
        target: &Shared<Vector3D>,
        name: &str,
        grow: bool,
    ) -> Result<(), StoreError> {
        self.add(Variable::Vector3D(target.clone()), name, grow)
    }

    /// Whether any variable is registered as `name` (exact match).
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.is_registered(name)
    }

    /// Registered names in transfer order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registered variables of `kind`.
    pub fn count(&self, kind: VarKind) -> usize {
        self.registry.count(kind)
    }

    // ── Backend ─────────────────────────────────────────────────

    /// Replace the backend, dropping the previous one.
    pub fn set_backend(&mut self, mut backend: Box<dyn StorageBackend>) {
        if self.low_precision {
            backend.set_low_precision();
        }
        self.backend = backend;
    }

    /// Replace the backend with a fresh one for format `id`.
    ///
    /// On an unknown identifier the current backend is kept.
    pub fn set_format(&mut self, id: &str) -> Result<(), StoreError> {
        let backend = create_backend(id).ok_or_else(|| StoreError::UnknownFormat {
            id: id.to_string(),
        })?;
        self.set_backend(backend);
        Ok(())
    }

    /// Write reals at single precision from now on, including through
    /// backends installed later.
    pub fn set_low_precision(&mut self) {
        self.low_precision = true;
        self.backend.set_low_precision();
    }

    /// Whether single-precision output was requested.
    pub fn is_low_precision(&self) -> bool {
        self.low_precision
    }

    /// Set or clear the path used by the `*_default` operations.
    pub fn set_default_path(&mut self, path: Option<&str>) {
        self.default_path = path.map(str::to_string);
    }

    /// The default dataset path, if set.
    pub fn default_path(&self) -> Option<&str> {
        self.default_path.as_deref()
    }

    // ── Transfer ────────────────────────────────────────────────

    /// Restore every registered variable from the dataset at `path`.
    ///
    /// Reads ignore the context's enable switch. A variable that cannot be
    /// read is set to zero, logged at warn level, and listed in
    /// [`ReadReport::zeroed`]; the read carries on with the rest. Only a
    /// failure to open the dataset fails the call.
    pub fn read(&mut self, path: &str) -> Result<ReadReport, StoreError> {
        if path.is_empty() {
            return Err(StoreError::MissingPath);
        }
        let path = Path::new(path);
        let start = Instant::now();
        self.open(path, None)?;

        self.backend.set_record(RecordIndex::Latest);
        let report = transfer::read_all(self.backend.as_mut(), &self.registry, &self.mesh);
        if let Err(error) = self.backend.close() {
            debug!(path = %path.display(), %error, "close after read failed");
        }

        self.context.record(start.elapsed());
        Ok(report)
    }

    /// Write every registered variable to `path`, replacing its contents.
    pub fn write(&mut self, path: &str) -> Result<(), StoreError> {
        self.write_with(path, WriteMode::Overwrite)
    }

    /// Write every registered variable to `path`, keeping existing
    /// contents. Time-series variables gain one record.
    pub fn append(&mut self, path: &str) -> Result<(), StoreError> {
        self.write_with(path, WriteMode::Append)
    }

    /// Write every registered variable to `path`.
    ///
    /// Does nothing and succeeds while the context is disabled.
    /// Unallocated fields are skipped. Vectors are written in their
    /// registered basis without modifying the caller's copy. Individual
    /// backend write failures are logged at debug level and ignored.
    pub fn write_with(&mut self, path: &str, mode: WriteMode) -> Result<(), StoreError> {
        if path.is_empty() {
            return Err(StoreError::MissingPath);
        }
        if !self.context.is_enabled() {
            debug!(path, "output disabled, skipping write");
            return Ok(());
        }
        let path = Path::new(path);
        let start = Instant::now();
        self.open(path, Some(mode))?;

        self.backend.set_record(RecordIndex::Latest);
        transfer::write_all(self.backend.as_mut(), &self.registry, &self.mesh);
        let closed = self.backend.close();

        self.context.record(start.elapsed());
        closed.map_err(|source| StoreError::Close {
            path: path.to_path_buf(),
            source,
        })
    }

    /// [`read`](Self::read) from the default path.
    pub fn read_default(&mut self) -> Result<ReadReport, StoreError> {
        let path = self.default_path.clone().ok_or(StoreError::MissingPath)?;
        self.read(&path)
    }

    /// [`write`](Self::write) to the default path.
    pub fn write_default(&mut self) -> Result<(), StoreError> {
        let path = self.default_path.clone().ok_or(StoreError::MissingPath)?;
        self.write(&path)
    }

    /// [`append`](Self::append) to the default path.
    pub fn append_default(&mut self) -> Result<(), StoreError> {
        let path = self.default_path.clone().ok_or(StoreError::MissingPath)?;
        self.append(&path)
    }

    /// Open `path` for reading (`mode == None`) or writing, and check the
    /// handle is usable.
    fn open(&mut self, path: &Path, mode: Option<WriteMode>) -> Result<(), StoreError> {
        let opened = match mode {
            None => self.backend.open_read(path),
            Some(mode) => self.backend.open_write(path, mode == WriteMode::Append),
        };
        opened.map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        if !self.backend.is_valid() {
            if let Err(error) = self.backend.close() {
                debug!(path = %path.display(), %error, "close of invalid handle failed");
            }
            return Err(StoreError::InvalidBackend {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}
