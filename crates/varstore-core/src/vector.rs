//! Three-component vector fields and covariant/contravariant conversion.

use std::fmt;

use crate::field::Field;
use crate::mesh::{Mesh, Metric};

/// Component axis of a vector field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// First component.
    X,
    /// Second component.
    Y,
    /// Third component.
    Z,
}

impl Axis {
    /// All axes in component order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lower-case axis letter.
    pub fn letter(self) -> char {
        match self {
            Self::X => 'x',
            Self::Y => 'y',
            Self::Z => 'z',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A vector with three field components of rank `N`.
///
/// `covariant` records which basis the components are currently
/// expressed in. Conversion uses a diagonal [`Metric`].
#[derive(Clone, Debug, PartialEq)]
pub struct Vector<const N: usize> {
    /// x component.
    pub x: Field<N>,
    /// y component.
    pub y: Field<N>,
    /// z component.
    pub z: Field<N>,
    /// `true` when the components are covariant.
    pub covariant: bool,
}

/// Three components, each a 2D field.
pub type Vector2D = Vector<2>;

/// Three components, each a 3D field.
pub type Vector3D = Vector<3>;

impl<const N: usize> Default for Vector<N> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<const N: usize> Vector<N> {
    /// An unallocated vector in the given basis.
    pub fn new(covariant: bool) -> Self {
        Self {
            x: Field::new(),
            y: Field::new(),
            z: Field::new(),
            covariant,
        }
    }

    /// An allocated vector with the given uniform components.
    pub fn filled(mesh: &Mesh, [x, y, z]: [f64; 3], covariant: bool) -> Self {
        Self {
            x: Field::filled(mesh, x),
            y: Field::filled(mesh, y),
            z: Field::filled(mesh, z),
            covariant,
        }
    }

    /// Allocate all three components against `mesh`.
    pub fn allocate(&mut self, mesh: &Mesh) {
        self.x.allocate(mesh);
        self.y.allocate(mesh);
        self.z.allocate(mesh);
    }

    /// Borrow one component.
    pub fn component(&self, axis: Axis) -> &Field<N> {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Mutably borrow one component.
    pub fn component_mut(&mut self, axis: Axis) -> &mut Field<N> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    /// Express the components in the covariant basis. No-op if already covariant.
    pub fn to_covariant(&mut self, metric: &Metric) {
        if self.covariant {
            return;
        }
        self.x.scale(metric.g11);
        self.y.scale(metric.g22);
        self.z.scale(metric.g33);
        self.covariant = true;
    }

    /// Express the components in the contravariant basis. No-op if already contravariant.
    pub fn to_contravariant(&mut self, metric: &Metric) {
        if !self.covariant {
            return;
        }
        self.x.scale(metric.g11.recip());
        self.y.scale(metric.g22.recip());
        self.z.scale(metric.g33.recip());
        self.covariant = false;
    }

    /// Convert to the requested basis.
    pub fn to_basis(&mut self, covariant: bool, metric: &Metric) {
        if covariant {
            self.to_covariant(metric);
        } else {
            self.to_contravariant(metric);
        }
    }
}
