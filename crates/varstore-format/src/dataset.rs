//! In-memory dataset model shared by every bundled backend.
//!
//! A [`Dataset`] is an ordered map of named [`Variable`]s. Each variable
//! has a value kind, a shape, and either a single value
//! ([`Persistence::Fixed`]) or a list of records ([`Persistence::Grow`]).

use indexmap::IndexMap;

use varstore_core::{BackendError, DataKind, Dims, Persistence, RecordIndex};

/// A named variable's definition and stored values.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    kind: DataKind,
    dims: Dims,
    persistence: Persistence,
    low_precision: bool,
    records: Vec<Vec<f64>>,
}

impl Variable {
    /// Create a variable with no records yet.
    pub fn new(kind: DataKind, dims: Dims, persistence: Persistence, low_precision: bool) -> Self {
        Self {
            kind,
            dims,
            persistence,
            low_precision: low_precision && kind == DataKind::Real,
            records: Vec::new(),
        }
    }

    /// Value kind.
    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// Shape; empty for scalars.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Single value or time series.
    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    /// Whether reals are held at single precision.
    pub fn is_low_precision(&self) -> bool {
        self.low_precision
    }

    /// Number of values per record.
    pub fn element_count(&self) -> usize {
        element_count(&self.dims)
    }

    /// All records in write order. A fixed variable has exactly one.
    pub fn records(&self) -> &[Vec<f64>] {
        &self.records
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&[f64]> {
        self.records.last().map(Vec::as_slice)
    }

    /// Append a record without any shape checks. Used by the codec,
    /// which validates lengths itself.
    pub(crate) fn push_record(&mut self, values: Vec<f64>) {
        self.records.push(values);
    }

    fn round(&self, values: &[f64]) -> Vec<f64> {
        if self.low_precision {
            values.iter().map(|&v| v as f32 as f64).collect()
        } else {
            values.to_vec()
        }
    }
}

/// Number of elements implied by `dims` (1 for a scalar).
pub fn element_count(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// An ordered collection of named variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    vars: IndexMap<String, Variable>,
}

impl Dataset {
    /// An empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if the dataset holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    /// Variable names in first-write order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Iterate over `(name, variable)` pairs in first-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, name: String, var: Variable) -> Option<Variable> {
        self.vars.insert(name, var)
    }

    /// Read one record of `name`, checking kind, shape, and persistence.
    pub fn read(
        &self,
        name: &str,
        kind: DataKind,
        dims: &[usize],
        persistence: Persistence,
        record: RecordIndex,
    ) -> Result<&[f64], BackendError> {
        let var = self.vars.get(name).ok_or_else(|| BackendError::NotFound {
            name: name.to_string(),
        })?;
        if var.kind != kind {
            return Err(BackendError::KindMismatch {
                name: name.to_string(),
                expected: kind,
                found: var.kind,
            });
        }
        if var.persistence != persistence {
            return Err(BackendError::PersistenceMismatch {
                name: name.to_string(),
                stored: var.persistence,
            });
        }
        if var.dims.as_slice() != dims {
            return Err(BackendError::ShapeMismatch {
                name: name.to_string(),
                expected: Dims::from_slice(dims),
                found: var.dims.clone(),
            });
        }

        let available = var.records.len();
        let index = match (persistence, record) {
            // Record selection only applies to time series.
            (Persistence::Fixed, _) | (Persistence::Grow, RecordIndex::Latest) => {
                available.checked_sub(1)
            }
            (Persistence::Grow, RecordIndex::At(n)) => (n < available).then_some(n),
        };
        index
            .map(|i| var.records[i].as_slice())
            .ok_or_else(|| BackendError::RecordOutOfRange {
                name: name.to_string(),
                record: match record {
                    RecordIndex::At(n) => n,
                    RecordIndex::Latest => 0,
                },
                available,
            })
    }

    /// Write `values` as `name`.
    ///
    /// A fixed variable is replaced outright. A time series gets a new
    /// record at `record` (`Latest` appends); its kind and shape must
    /// match what is already stored.
    #[allow(clippy::too_many_arguments)]
    pub fn write(
        &mut self,
        name: &str,
        kind: DataKind,
        dims: &[usize],
        persistence: Persistence,
        record: RecordIndex,
        low_precision: bool,
        values: &[f64],
    ) -> Result<(), BackendError> {
        if dims.contains(&0) {
            return Err(BackendError::Malformed {
                detail: format!("variable '{name}': zero extent"),
            });
        }
        let expected = element_count(dims);
        if values.len() != expected {
            return Err(BackendError::BufferLength {
                name: name.to_string(),
                expected,
                found: values.len(),
            });
        }

        if let Some(existing) = self.vars.get(name) {
            if existing.persistence != persistence {
                return Err(BackendError::PersistenceMismatch {
                    name: name.to_string(),
                    stored: existing.persistence,
                });
            }
            if existing.kind != kind {
                return Err(BackendError::KindMismatch {
                    name: name.to_string(),
                    expected: kind,
                    found: existing.kind,
                });
            }
        }

        match persistence {
            Persistence::Fixed => {
                let mut var =
                    Variable::new(kind, Dims::from_slice(dims), persistence, low_precision);
                let rounded = var.round(values);
                var.records.push(rounded);
                self.vars.insert(name.to_string(), var);
                Ok(())
            }
            Persistence::Grow => {
                let var = self.vars.entry(name.to_string()).or_insert_with(|| {
                    Variable::new(kind, Dims::from_slice(dims), persistence, low_precision)
                });
                if var.dims.as_slice() != dims {
                    return Err(BackendError::ShapeMismatch {
                        name: name.to_string(),
                        expected: var.dims.clone(),
                        found: Dims::from_slice(dims),
                    });
                }
                if low_precision && kind == DataKind::Real {
                    var.low_precision = true;
                }
                let rounded = var.round(values);
                let available = var.records.len();
                match record {
                    RecordIndex::Latest => var.records.push(rounded),
                    RecordIndex::At(n) if n < available => var.records[n] = rounded,
                    RecordIndex::At(n) if n == available => var.records.push(rounded),
                    RecordIndex::At(n) => {
                        return Err(BackendError::RecordOutOfRange {
                            name: name.to_string(),
                            record: n,
                            available,
                        })
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NO_DIMS: &[usize] = &[];

    fn put(
        ds: &mut Dataset,
        name: &str,
        kind: DataKind,
        dims: &[usize],
        persistence: Persistence,
        record: RecordIndex,
        values: &[f64],
    ) -> Result<(), BackendError> {
        ds.write(name, kind, dims, persistence, record, false, values)
    }

    fn put_real(ds: &mut Dataset, name: &str, dims: &[usize], values: &[f64]) {
        put(ds, name, DataKind::Real, dims, Persistence::Fixed, RecordIndex::Latest, values)
            .unwrap();
    }

    fn grow(ds: &mut Dataset, name: &str, record: RecordIndex, v: f64) -> Result<(), BackendError> {
        put(ds, name, DataKind::Real, NO_DIMS, Persistence::Grow, record, &[v])
    }

    fn get<'a>(
        ds: &'a Dataset,
        name: &str,
        dims: &[usize],
        persistence: Persistence,
        record: RecordIndex,
    ) -> Result<&'a [f64], BackendError> {
        ds.read(name, DataKind::Real, dims, persistence, record)
    }

    #[test]
    fn fixed_write_then_read() {
        let mut ds = Dataset::new();
        put_real(&mut ds, "a", &[2, 2], &[1.0, 2.0, 3.0, 4.0]);
        let got = get(&ds, "a", &[2, 2], Persistence::Fixed, RecordIndex::Latest).unwrap();
        assert_eq!(got, &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn fixed_write_replaces_value() {
        let mut ds = Dataset::new();
        for v in [1.0, 2.0, 3.0] {
            put_real(&mut ds, "t", NO_DIMS, &[v]);
        }
        assert_eq!(ds.get("t").unwrap().record_count(), 1);
        assert_eq!(ds.get("t").unwrap().latest(), Some(&[3.0][..]));
    }

    #[test]
    fn grow_appends_and_latest_reads_last() {
        let mut ds = Dataset::new();
        for v in 1..=4 {
            grow(&mut ds, "n", RecordIndex::Latest, v as f64).unwrap();
        }
        assert_eq!(ds.get("n").unwrap().record_count(), 4);
        let latest = get(&ds, "n", NO_DIMS, Persistence::Grow, RecordIndex::Latest).unwrap();
        assert_eq!(latest, &[4.0]);
        let second = get(&ds, "n", NO_DIMS, Persistence::Grow, RecordIndex::At(1)).unwrap();
        assert_eq!(second, &[2.0]);
    }

    #[test]
    fn grow_at_index_overwrites_or_appends() {
        let mut ds = Dataset::new();
        grow(&mut ds, "g", RecordIndex::At(0), 1.0).unwrap();
        grow(&mut ds, "g", RecordIndex::At(1), 2.0).unwrap();
        grow(&mut ds, "g", RecordIndex::At(0), 5.0).unwrap();
        assert!(matches!(
            grow(&mut ds, "g", RecordIndex::At(5), 9.0),
            Err(BackendError::RecordOutOfRange {
                record: 5,
                available: 2,
                ..
            })
        ));
        assert_eq!(ds.get("g").unwrap().records(), &[vec![5.0], vec![2.0]]);
    }

    #[test]
    fn missing_variable_is_not_found() {
        let ds = Dataset::new();
        assert!(matches!(
            get(&ds, "x", NO_DIMS, Persistence::Fixed, RecordIndex::Latest),
            Err(BackendError::NotFound { .. })
        ));
    }

    #[test]
    fn kind_shape_and_persistence_are_checked_on_read() {
        let mut ds = Dataset::new();
        put_real(&mut ds, "f", &[3], &[0.0; 3]);
        assert!(matches!(
            ds.read("f", DataKind::Int, &[3], Persistence::Fixed, RecordIndex::Latest),
            Err(BackendError::KindMismatch { .. })
        ));
        assert!(matches!(
            get(&ds, "f", &[4], Persistence::Fixed, RecordIndex::Latest),
            Err(BackendError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            get(&ds, "f", &[3], Persistence::Grow, RecordIndex::Latest),
            Err(BackendError::PersistenceMismatch {
                stored: Persistence::Fixed,
                ..
            })
        ));
    }

    #[test]
    fn grow_shape_change_rejected() {
        let mut ds = Dataset::new();
        let (p, r) = (Persistence::Grow, RecordIndex::Latest);
        put(&mut ds, "s", DataKind::Real, &[2], p, r, &[0.0; 2]).unwrap();
        assert!(matches!(
            put(&mut ds, "s", DataKind::Real, &[3], p, r, &[0.0; 3]),
            Err(BackendError::ShapeMismatch { .. })
        ));
        assert_eq!(ds.get("s").unwrap().record_count(), 1);
    }

    #[test]
    fn buffer_length_checked_on_write() {
        let mut ds = Dataset::new();
        let (p, r) = (Persistence::Fixed, RecordIndex::Latest);
        assert!(matches!(
            put(&mut ds, "b", DataKind::Real, &[2, 2], p, r, &[0.0; 3]),
            Err(BackendError::BufferLength {
                expected: 4,
                found: 3,
                ..
            })
        ));
        assert!(ds.is_empty());
    }

    #[test]
    fn zero_extent_rejected_on_write() {
        let mut ds = Dataset::new();
        let (p, r) = (Persistence::Grow, RecordIndex::Latest);
        assert!(matches!(
            put(&mut ds, "z", DataKind::Real, &[3, 0], p, r, &[]),
            Err(BackendError::Malformed { .. })
        ));
        assert!(ds.is_empty());
    }

    #[test]
    fn low_precision_rounds_reals_only() {
        let mut ds = Dataset::new();
        let (p, r) = (Persistence::Fixed, RecordIndex::Latest);
        let v = 0.1f64;
        ds.write("r", DataKind::Real, NO_DIMS, p, r, true, &[v]).unwrap();
        ds.write("i", DataKind::Int, NO_DIMS, p, r, true, &[7.0]).unwrap();
        assert_eq!(ds.get("r").unwrap().latest().unwrap()[0], v as f32 as f64);
        assert!(ds.get("r").unwrap().is_low_precision());
        assert!(!ds.get("i").unwrap().is_low_precision());
    }

    #[test]
    fn names_keep_first_write_order() {
        let mut ds = Dataset::new();
        for name in ["zeta", "alpha", "mid"] {
            put_real(&mut ds, name, NO_DIMS, &[0.0]);
        }
        assert_eq!(ds.names().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    }

    proptest! {
        #[test]
        fn latest_is_last_written(values in prop::collection::vec(-1e9f64..1e9, 1..32)) {
            let mut ds = Dataset::new();
            for &v in &values {
                grow(&mut ds, "x", RecordIndex::Latest, v).unwrap();
            }
            let got = get(&ds, "x", NO_DIMS, Persistence::Grow, RecordIndex::Latest).unwrap();
            prop_assert_eq!(got[0], *values.last().unwrap());
            prop_assert_eq!(ds.get("x").unwrap().record_count(), values.len());
        }
    }
}
