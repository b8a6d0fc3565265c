//! Mesh and field fixtures.

use varstore_core::{Field, Mesh, Vector};

/// A 4 × 3 × 2 mesh with the identity metric.
pub fn small_mesh() -> Mesh {
    Mesh::new(4, 3, 2).expect("4x3x2 is a valid mesh")
}

/// A field whose point `i` holds `offset + i`.
pub fn ramp_field<const N: usize>(mesh: &Mesh, offset: f64) -> Field<N> {
    let data = (0..mesh.cell_count::<N>())
        .map(|i| offset + i as f64)
        .collect();
    Field::from_vec(mesh, data).expect("ramp length matches mesh")
}

pub fn ramp_field2d(mesh: &Mesh, offset: f64) -> Field<2> {
    ramp_field(mesh, offset)
}

pub fn ramp_field3d(mesh: &Mesh, offset: f64) -> Field<3> {
    ramp_field(mesh, offset)
}

/// A vector whose components are ramps starting at 0, 100, and 200.
pub fn ramp_vector<const N: usize>(mesh: &Mesh, covariant: bool) -> Vector<N> {
    Vector {
        x: ramp_field(mesh, 0.0),
        y: ramp_field(mesh, 100.0),
        z: ramp_field(mesh, 200.0),
        covariant,
    }
}

pub fn ramp_vector2d(mesh: &Mesh, covariant: bool) -> Vector<2> {
    ramp_vector(mesh, covariant)
}

pub fn ramp_vector3d(mesh: &Mesh, covariant: bool) -> Vector<3> {
    ramp_vector(mesh, covariant)
}
