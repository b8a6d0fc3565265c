//! Benchmark profiles for the varstore checkpoint framework.
//!
//! - [`reference_profile`]: 64×32×16 mesh with a typical fluid-model variable set
//! - [`stress_profile`]: 128×64×32 mesh with the same set
//!
//! Both return the store together with the [`Profile`] targets it is bound to.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use varstore_core::{Field2D, Field3D, Mesh, MeshError, Shared, Vector3D};
use varstore_format::{MemoryBackend, MemoryVolumes};
use varstore_store::{IoContext, StoreError, VariableStore};

/// Caller-side targets of a benchmark store.
pub struct Profile {
    pub iteration: Shared<i32>,
    pub time: Shared<f64>,
    pub density: Shared<Field3D>,
    pub pressure: Shared<Field3D>,
    pub potential: Shared<Field2D>,
    pub magnetic: Shared<Vector3D>,
    pub flow: Shared<Vector3D>,
}

/// Errors building a benchmark profile.
#[derive(Debug)]
pub enum ProfileError {
    /// The mesh extents were rejected.
    Mesh(MeshError),
    /// Registration failed.
    Store(StoreError),
}

impl From<MeshError> for ProfileError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<StoreError> for ProfileError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Build a store on an `nx × ny × nz` mesh writing to `volumes`, with two
/// time-series scalars, three scalar fields, a covariant vector, and a
/// contravariant vector.
pub fn build_profile(
    nx: usize,
    ny: usize,
    nz: usize,
    volumes: &MemoryVolumes,
) -> Result<(VariableStore, Profile), ProfileError> {
    let mesh = Mesh::new(nx, ny, nz)?;
    let ramp = |scale: f64| -> Vec<f64> {
        (0..mesh.cell_count::<3>())
            .map(|i| (i as f64 * scale).sin())
            .collect()
    };
    let profile = Profile {
        iteration: Shared::new(0),
        time: Shared::new(0.0),
        density: Shared::new(Field3D::from_vec(&mesh, ramp(0.01))?),
        pressure: Shared::new(Field3D::from_vec(&mesh, ramp(0.02))?),
        potential: Shared::new(Field2D::filled(&mesh, 0.5)),
        magnetic: Shared::new(Vector3D::filled(&mesh, [0.0, 0.0, 1.0], true)),
        flow: Shared::new(Vector3D::filled(&mesh, [0.1, 0.2, 0.3], false)),
    };

    let backend = Box::new(MemoryBackend::new(volumes.clone()));
    let mut store = VariableStore::new(backend, mesh, Arc::new(IoContext::new()));
    store.add_int(&profile.iteration, "iteration", true)?;
    store.add_real(&profile.time, "t_array", true)?;
    store.add_field3d(&profile.density, "Ne", false)?;
    store.add_field3d(&profile.pressure, "Pe", false)?;
    store.add_field2d(&profile.potential, "phi_wall", false)?;
    store.add_vector3d(&profile.magnetic, "B", false)?;
    store.add_vector3d(&profile.flow, "V", false)?;
    Ok((store, profile))
}

/// Build the reference benchmark profile: 64×32×16 mesh (32K points per field).
pub fn reference_profile(volumes: &MemoryVolumes) -> Result<(VariableStore, Profile), ProfileError> {
    build_profile(64, 32, 16, volumes)
}

/// Build the stress benchmark profile: 128×64×32 mesh (256K points per field).
pub fn stress_profile(volumes: &MemoryVolumes) -> Result<(VariableStore, Profile), ProfileError> {
    build_profile(128, 64, 32, volumes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_registers_every_target() {
        let volumes = MemoryVolumes::new();
        let (mut store, profile) = build_profile(4, 4, 2, &volumes).unwrap();
        assert_eq!(store.len(), 7);
        store.write("bench").unwrap();
        // 2 scalars + 3 fields + 2 × 3 vector components.
        assert_eq!(volumes.get("bench").unwrap().len(), 11);
        assert_eq!(profile.iteration.get(), 0);
    }
}
