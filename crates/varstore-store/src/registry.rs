//! Registered variables, grouped by kind.

use std::fmt;

use varstore_core::{Field2D, Field3D, Shared, Vector, Vector2D, Vector3D};

use crate::error::StoreError;

/// The six kinds of value a store can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// `i32` scalar.
    Int,
    /// `f64` scalar.
    Real,
    /// Scalar field on the x-y plane.
    Field2D,
    /// Scalar field on the full mesh.
    Field3D,
    /// Three-component vector of 2D fields.
    Vector2D,
    /// Three-component vector of 3D fields.
    Vector3D,
}

impl VarKind {
    /// Transfer order. Every read and write visits kinds in this order and
    /// each kind's variables in registration order.
    pub const ORDER: [VarKind; 6] = [
        VarKind::Int,
        VarKind::Real,
        VarKind::Field2D,
        VarKind::Field3D,
        VarKind::Vector2D,
        VarKind::Vector3D,
    ];

    /// Returns `true` for the two vector kinds.
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Vector2D | Self::Vector3D)
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Int => "integer",
            Self::Real => "real",
            Self::Field2D => "2D field",
            Self::Field3D => "3D field",
            Self::Vector2D => "2D vector",
            Self::Vector3D => "3D vector",
        };
        f.write_str(label)
    }
}

/// A handle to caller-owned storage of any supported kind.
#[derive(Clone, Debug)]
pub enum Variable {
    /// Integer scalar.
    Int(Shared<i32>),
    /// Real scalar.
    Real(Shared<f64>),
    /// 2D scalar field.
    Field2D(Shared<Field2D>),
    /// 3D scalar field.
    Field3D(Shared<Field3D>),
    /// 2D vector field.
    Vector2D(Shared<Vector2D>),
    /// 3D vector field.
    Vector3D(Shared<Vector3D>),
}

impl Variable {
    /// The kind of value behind the handle.
    pub fn kind(&self) -> VarKind {
        match self {
            Self::Int(_) => VarKind::Int,
            Self::Real(_) => VarKind::Real,
            Self::Field2D(_) => VarKind::Field2D,
            Self::Field3D(_) => VarKind::Field3D,
            Self::Vector2D(_) => VarKind::Vector2D,
            Self::Vector3D(_) => VarKind::Vector3D,
        }
    }
}

macro_rules! variable_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<Shared<$ty>> for Variable {
                fn from(target: Shared<$ty>) -> Self {
                    Self::$variant(target)
                }
            }
        )*
    };
}

variable_from!(
    Int(i32),
    Real(f64),
    Field2D(Field2D),
    Field3D(Field3D),
    Vector2D(Vector2D),
    Vector3D(Vector3D),
);

pub(crate) struct Binding<T> {
    pub(crate) name: String,
    pub(crate) target: Shared<T>,
    pub(crate) grow: bool,
}

pub(crate) struct VectorBinding<const N: usize> {
    pub(crate) name: String,
    pub(crate) target: Shared<Vector<N>>,
    pub(crate) grow: bool,
    /// Basis captured at registration.
    pub(crate) covariant: bool,
}

impl<const N: usize> VectorBinding<N> {
    fn new(name: String, target: Shared<Vector<N>>, grow: bool) -> Self {
        let covariant = target.lock().covariant;
        Self {
            name,
            target,
            grow,
            covariant,
        }
    }
}

/// Six ordered binding lists with names unique across all of them.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) ints: Vec<Binding<i32>>,
    pub(crate) reals: Vec<Binding<f64>>,
    pub(crate) fields2d: Vec<Binding<Field2D>>,
    pub(crate) fields3d: Vec<Binding<Field3D>>,
    pub(crate) vectors2d: Vec<VectorBinding<2>>,
    pub(crate) vectors3d: Vec<VectorBinding<3>>,
}

impl Registry {
    pub(crate) fn insert(
        &mut self,
        variable: Variable,
        name: &str,
        grow: bool,
    ) -> Result<(), StoreError> {
        if self.is_registered(name) {
            return Err(StoreError::DuplicateName {
                name: name.to_string(),
            });
        }
        let name = name.to_string();
        match variable {
            Variable::Int(target) => self.ints.push(Binding { name, target, grow }),
            Variable::Real(target) => self.reals.push(Binding { name, target, grow }),
            Variable::Field2D(target) => self.fields2d.push(Binding { name, target, grow }),
            Variable::Field3D(target) => self.fields3d.push(Binding { name, target, grow }),
            Variable::Vector2D(target) => {
                self.vectors2d.push(VectorBinding::new(name, target, grow))
            }
            Variable::Vector3D(target) => {
                self.vectors3d.push(VectorBinding::new(name, target, grow))
            }
        }
        Ok(())
    }

    pub(crate) fn is_registered(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        VarKind::ORDER.into_iter().flat_map(move |kind| self.names_of(kind))
    }

    fn names_of(&self, kind: VarKind) -> Box<dyn Iterator<Item = &str> + '_> {
        fn names<T>(bindings: &[Binding<T>]) -> Box<dyn Iterator<Item = &str> + '_> {
            Box::new(bindings.iter().map(|b| b.name.as_str()))
        }
        fn vector_names<const N: usize>(
            bindings: &[VectorBinding<N>],
        ) -> Box<dyn Iterator<Item = &str> + '_> {
            Box::new(bindings.iter().map(|b| b.name.as_str()))
        }
        match kind {
            VarKind::Int => names(&self.ints),
            VarKind::Real => names(&self.reals),
            VarKind::Field2D => names(&self.fields2d),
            VarKind::Field3D => names(&self.fields3d),
            VarKind::Vector2D => vector_names(&self.vectors2d),
            VarKind::Vector3D => vector_names(&self.vectors3d),
        }
    }

    pub(crate) fn count(&self, kind: VarKind) -> usize {
        match kind {
            VarKind::Int => self.ints.len(),
            VarKind::Real => self.reals.len(),
            VarKind::Field2D => self.fields2d.len(),
            VarKind::Field3D => self.fields3d.len(),
            VarKind::Vector2D => self.vectors2d.len(),
            VarKind::Vector3D => self.vectors3d.len(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        VarKind::ORDER.into_iter().map(|k| self.count(k)).sum()
    }
}
