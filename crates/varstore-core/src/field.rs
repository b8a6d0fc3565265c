//! Scalar fields over the mesh.

use crate::error::MeshError;
use crate::mesh::Mesh;

/// A rank-`N` scalar field, lazily allocated against a [`Mesh`].
///
/// A freshly constructed field holds no data. Allocation sizes the
/// contiguous buffer to the mesh extents; until then the field is
/// considered absent and is skipped by checkpoint writes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Field<const N: usize> {
    data: Option<Vec<f64>>,
}

/// A field over the `nx × ny` plane.
pub type Field2D = Field<2>;

/// A field over the full `nx × ny × nz` grid.
pub type Field3D = Field<3>;

impl<const N: usize> Field<N> {
    /// An unallocated field.
    pub fn new() -> Self {
        Self { data: None }
    }

    /// An allocated field with every point set to `value`.
    pub fn filled(mesh: &Mesh, value: f64) -> Self {
        Self {
            data: Some(vec![value; mesh.cell_count::<N>()]),
        }
    }

    /// An allocated field taking ownership of `data`.
    pub fn from_vec(mesh: &Mesh, data: Vec<f64>) -> Result<Self, MeshError> {
        let expected = mesh.cell_count::<N>();
        if data.len() != expected {
            return Err(MeshError::DataLength {
                expected,
                found: data.len(),
            });
        }
        Ok(Self { data: Some(data) })
    }

    /// Ensure the buffer exists and matches the mesh, returning it.
    ///
    /// An existing buffer of the right size is kept as is; a missing or
    /// mis-sized one is replaced by zeros.
    pub fn allocate(&mut self, mesh: &Mesh) -> &mut [f64] {
        let cells = mesh.cell_count::<N>();
        let data = self.data.get_or_insert_with(Vec::new);
        if data.len() != cells {
            data.clear();
            data.resize(cells, 0.0);
        }
        data
    }

    /// Whether the field holds data.
    pub fn is_allocated(&self) -> bool {
        self.data.is_some()
    }

    /// Set every point to `value`. No effect on an unallocated field.
    pub fn fill(&mut self, value: f64) {
        if let Some(data) = self.data.as_mut() {
            data.fill(value);
        }
    }

    /// Multiply every point by `factor`.
    pub fn scale(&mut self, factor: f64) {
        if let Some(data) = self.data.as_mut() {
            data.iter_mut().for_each(|v| *v *= factor);
        }
    }

    /// The contiguous buffer, if allocated.
    pub fn data(&self) -> Option<&[f64]> {
        self.data.as_deref()
    }

    /// The contiguous buffer, mutably, if allocated.
    pub fn data_mut(&mut self) -> Option<&mut [f64]> {
        self.data.as_deref_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mesh() -> Mesh {
        Mesh::new(3, 2, 4).unwrap()
    }

    #[test]
    fn new_field_is_unallocated() {
        let f = Field2D::new();
        assert!(!f.is_allocated());
        assert!(f.data().is_none());
    }

    #[test]
    fn allocate_sizes_to_mesh() {
        let mut f2 = Field2D::new();
        assert_eq!(f2.allocate(&mesh()).len(), 6);
        let mut f3 = Field3D::new();
        assert_eq!(f3.allocate(&mesh()).len(), 24);
        assert!(f3.is_allocated());
    }

    #[test]
    fn allocate_keeps_existing_data() {
        let mut f = Field2D::filled(&mesh(), 2.5);
        f.allocate(&mesh());
        assert!(f.data().unwrap().iter().all(|&v| v == 2.5));
    }

    #[test]
    fn allocate_resizes_mismatched_buffer() {
        let small = Mesh::new(1, 1, 1).unwrap();
        let mut f = Field2D::filled(&small, 7.0);
        let buf = f.allocate(&mesh());
        assert_eq!(buf.len(), 6);
        assert!(buf.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Field2D::from_vec(&mesh(), vec![0.0; 6]).is_ok());
        assert_eq!(
            Field2D::from_vec(&mesh(), vec![0.0; 5]),
            Err(MeshError::DataLength {
                expected: 6,
                found: 5
            })
        );
    }

    #[test]
    fn fill_on_unallocated_is_noop() {
        let mut f = Field3D::new();
        f.fill(1.0);
        assert!(!f.is_allocated());
    }

    proptest! {
        #[test]
        fn scale_multiplies_every_point(v in -1e6f64..1e6, k in -100.0f64..100.0) {
            let mut f = Field2D::filled(&mesh(), v);
            f.scale(k);
            for &x in f.data().unwrap() {
                prop_assert_eq!(x, v * k);
            }
        }
    }
}
