//! Per-binding transfer between registered targets and an open backend.

use tracing::{debug, warn};
use varstore_core::{
    Axis, BackendError, Dims, Field, Mesh, Persistence, StorageBackend, Vector,
};

use crate::registry::{Binding, Registry, VarKind, VectorBinding};

/// Outcome of a [`VariableStore::read`](crate::VariableStore::read).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadReport {
    /// Dataset names read successfully, in transfer order.
    pub loaded: Vec<String>,
    /// Dataset names that could not be read and were set to zero.
    pub zeroed: Vec<String>,
}

impl ReadReport {
    /// Returns `true` if every variable was read.
    pub fn is_complete(&self) -> bool {
        self.zeroed.is_empty()
    }

    fn mark_loaded(&mut self, name: &str) {
        self.loaded.push(name.to_string());
    }

    fn mark_zeroed(&mut self, name: &str, kind: VarKind, error: &BackendError) {
        warn!(variable = name, %kind, %error, "could not read variable, setting to zero");
        self.zeroed.push(name.to_string());
    }
}

/// Dataset name of one vector component: `name_x` for covariant vectors,
/// `namex` for contravariant ones.
pub fn component_name(name: &str, axis: Axis, covariant: bool) -> String {
    if covariant {
        format!("{name}_{}", axis.letter())
    } else {
        format!("{name}{}", axis.letter())
    }
}

fn field_dims<const N: usize>(mesh: &Mesh) -> Dims {
    Dims::from_slice(&mesh.extents::<N>())
}

// ── Read ────────────────────────────────────────────────────────

pub(crate) fn read_all(
    backend: &mut dyn StorageBackend,
    registry: &Registry,
    mesh: &Mesh,
) -> ReadReport {
    let mut report = ReadReport::default();
    for kind in VarKind::ORDER {
        match kind {
            VarKind::Int => {
                for b in &registry.ints {
                    read_int(backend, b, &mut report);
                }
            }
            VarKind::Real => {
                for b in &registry.reals {
                    read_real(backend, b, &mut report);
                }
            }
            VarKind::Field2D => {
                for b in &registry.fields2d {
                    let mut field = b.target.lock();
                    let p = Persistence::from_grow(b.grow);
                    read_field(backend, &b.name, &mut *field, mesh, p, kind, &mut report);
                }
            }
            VarKind::Field3D => {
                for b in &registry.fields3d {
                    let mut field = b.target.lock();
                    let p = Persistence::from_grow(b.grow);
                    read_field(backend, &b.name, &mut *field, mesh, p, kind, &mut report);
                }
            }
            VarKind::Vector2D => {
                for b in &registry.vectors2d {
                    read_vector(backend, b, mesh, kind, &mut report);
                }
            }
            VarKind::Vector3D => {
                for b in &registry.vectors3d {
                    read_vector(backend, b, mesh, kind, &mut report);
                }
            }
        }
    }
    report
}

fn read_int(backend: &mut dyn StorageBackend, b: &Binding<i32>, report: &mut ReadReport) {
    let mut target = b.target.lock();
    match backend.read_int(&b.name, Persistence::from_grow(b.grow)) {
        Ok(v) => {
            *target = v;
            report.mark_loaded(&b.name);
        }
        Err(e) => {
            *target = 0;
            report.mark_zeroed(&b.name, VarKind::Int, &e);
        }
    }
}

fn read_real(backend: &mut dyn StorageBackend, b: &Binding<f64>, report: &mut ReadReport) {
    let mut target = b.target.lock();
    match backend.read_real(&b.name, Persistence::from_grow(b.grow)) {
        Ok(v) => {
            *target = v;
            report.mark_loaded(&b.name);
        }
        Err(e) => {
            *target = 0.0;
            report.mark_zeroed(&b.name, VarKind::Real, &e);
        }
    }
}

fn read_field<const N: usize>(
    backend: &mut dyn StorageBackend,
    name: &str,
    field: &mut Field<N>,
    mesh: &Mesh,
    persistence: Persistence,
    kind: VarKind,
    report: &mut ReadReport,
) {
    let dims = field_dims::<N>(mesh);
    let buf = field.allocate(mesh);
    match backend.read_array(name, &dims, persistence, buf) {
        Ok(()) => report.mark_loaded(name),
        Err(e) => {
            // A failed read may have left the buffer partly written.
            field.fill(0.0);
            report.mark_zeroed(name, kind, &e);
        }
    }
}

fn read_vector<const N: usize>(
    backend: &mut dyn StorageBackend,
    b: &VectorBinding<N>,
    mesh: &Mesh,
    kind: VarKind,
    report: &mut ReadReport,
) {
    let mut vector = b.target.lock();
    let p = Persistence::from_grow(b.grow);
    for axis in Axis::ALL {
        let name = component_name(&b.name, axis, b.covariant);
        read_field(backend, &name, vector.component_mut(axis), mesh, p, kind, report);
    }
    vector.covariant = b.covariant;
}

// ── Write ───────────────────────────────────────────────────────

pub(crate) fn write_all(backend: &mut dyn StorageBackend, registry: &Registry, mesh: &Mesh) {
    for kind in VarKind::ORDER {
        match kind {
            VarKind::Int => {
                for b in &registry.ints {
                    let value = *b.target.lock();
                    let result = backend.write_int(&b.name, value, Persistence::from_grow(b.grow));
                    log_write_error(&b.name, kind, result);
                }
            }
            VarKind::Real => {
                for b in &registry.reals {
                    let value = *b.target.lock();
                    let result = backend.write_real(&b.name, value, Persistence::from_grow(b.grow));
                    log_write_error(&b.name, kind, result);
                }
            }
            VarKind::Field2D => {
                for b in &registry.fields2d {
                    let field = b.target.lock();
                    let p = Persistence::from_grow(b.grow);
                    write_field(backend, &b.name, &*field, mesh, p, kind);
                }
            }
            VarKind::Field3D => {
                for b in &registry.fields3d {
                    let field = b.target.lock();
                    let p = Persistence::from_grow(b.grow);
                    write_field(backend, &b.name, &*field, mesh, p, kind);
                }
            }
            VarKind::Vector2D => {
                for b in &registry.vectors2d {
                    write_vector(backend, b, mesh, kind);
                }
            }
            VarKind::Vector3D => {
                for b in &registry.vectors3d {
                    write_vector(backend, b, mesh, kind);
                }
            }
        }
    }
}

fn write_field<const N: usize>(
    backend: &mut dyn StorageBackend,
    name: &str,
    field: &Field<N>,
    mesh: &Mesh,
    persistence: Persistence,
    kind: VarKind,
) {
    let Some(data) = field.data() else {
        debug!(variable = name, %kind, "skipping unallocated field");
        return;
    };
    let dims = field_dims::<N>(mesh);
    let result = backend.write_array(name, &dims, persistence, data);
    log_write_error(name, kind, result);
}

fn write_vector<const N: usize>(
    backend: &mut dyn StorageBackend,
    b: &VectorBinding<N>,
    mesh: &Mesh,
    kind: VarKind,
) {
    // Convert a copy so the caller's vector keeps its basis.
    let mut vector: Vector<N> = b.target.lock().clone();
    vector.to_basis(b.covariant, mesh.metric());
    let p = Persistence::from_grow(b.grow);
    for axis in Axis::ALL {
        let name = component_name(&b.name, axis, b.covariant);
        write_field(backend, &name, vector.component(axis), mesh, p, kind);
    }
}

fn log_write_error(name: &str, kind: VarKind, result: Result<(), BackendError>) {
    if let Err(error) = result {
        debug!(variable = name, %kind, %error, "backend write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_names_by_basis() {
        let co: Vec<_> = Axis::ALL
            .iter()
            .map(|&a| component_name("B", a, true))
            .collect();
        let contra: Vec<_> = Axis::ALL
            .iter()
            .map(|&a| component_name("B", a, false))
            .collect();
        assert_eq!(co, ["B_x", "B_y", "B_z"]);
        assert_eq!(contra, ["Bx", "By", "Bz"]);
    }

    #[test]
    fn report_completeness() {
        let mut report = ReadReport::default();
        report.mark_loaded("a");
        assert!(report.is_complete());
        report.mark_zeroed("b", VarKind::Real, &BackendError::NotOpen);
        assert!(!report.is_complete());
        assert_eq!(report.loaded, ["a"]);
        assert_eq!(report.zeroed, ["b"]);
    }
}
