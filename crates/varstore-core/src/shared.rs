//! Shared handles to caller-owned simulation state.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A cloneable handle to a value owned jointly by the simulation and any
/// store it is registered with.
///
/// The simulation keeps one clone and mutates through [`lock`](Self::lock);
/// a store keeps another and locks it only for the duration of a single
/// transfer. The value lives as long as the last clone.
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    /// Wrap `value` in a new shared handle.
    pub fn new(value: T) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    /// Lock the value for access. A poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.lock() = value;
    }

    /// Whether two handles refer to the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Shared<T> {
    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.lock().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&*self.lock()).finish()
    }
}

impl<T> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
