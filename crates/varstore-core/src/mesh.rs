//! Grid extents and the diagonal metric used for basis conversion.

use crate::error::MeshError;

/// Diagonal metric tensor coefficients `g_11`, `g_22`, `g_33`.
///
/// Lowering an index multiplies a component by its coefficient;
/// raising divides by it. Off-diagonal terms are taken to be zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metric {
    /// Coefficient along x.
    pub g11: f64,
    /// Coefficient along y.
    pub g22: f64,
    /// Coefficient along z.
    pub g33: f64,
}

impl Metric {
    /// The Cartesian metric: both bases coincide.
    pub const IDENTITY: Metric = Metric {
        g11: 1.0,
        g22: 1.0,
        g33: 1.0,
    };

    /// Create a metric, rejecting zero, negative, or non-finite coefficients.
    pub fn new(g11: f64, g22: f64, g33: f64) -> Result<Self, MeshError> {
        for (component, value) in [("g11", g11), ("g22", g22), ("g33", g33)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MeshError::InvalidMetric { component, value });
            }
        }
        Ok(Self { g11, g22, g33 })
    }

    /// Coefficients in axis order.
    pub fn coefficients(&self) -> [f64; 3] {
        [self.g11, self.g22, self.g33]
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The local grid: extents along each axis plus its metric.
///
/// 2D fields span `nx × ny` points, 3D fields `nx × ny × nz`. Data is
/// laid out row-major with z varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    nx: usize,
    ny: usize,
    nz: usize,
    metric: Metric,
}

impl Mesh {
    /// Create a mesh with the identity metric. All extents must be non-zero.
    pub fn new(nx: usize, ny: usize, nz: usize) -> Result<Self, MeshError> {
        for (axis, n) in [("x", nx), ("y", ny), ("z", nz)] {
            if n == 0 {
                return Err(MeshError::EmptyExtent { axis });
            }
        }
        Ok(Self {
            nx,
            ny,
            nz,
            metric: Metric::IDENTITY,
        })
    }

    /// Replace the metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Points along x.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Points along y.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Points along z.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// The metric used for covariant/contravariant conversion.
    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// The first `N` extents, `[nx, ny]` for `N = 2`, `[nx, ny, nz]` for `N = 3`.
    pub fn extents<const N: usize>(&self) -> [usize; N] {
        const { assert!(N >= 1 && N <= 3, "mesh rank is at most 3") };
        let all = [self.nx, self.ny, self.nz];
        std::array::from_fn(|i| all[i])
    }

    /// Number of points spanned by a rank-`N` field.
    pub fn cell_count<const N: usize>(&self) -> usize {
        self.extents::<N>().iter().product()
    }
}
