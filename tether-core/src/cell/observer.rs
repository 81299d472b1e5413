//! Observer types for the cell system.
//!
//! An observer is a callback that receives `(new, old)` every time the cell
//! it is registered against is set. Registrations are keyed by a synthetic
//! [`ObserverId`] instead of by callback identity, so two identical closures
//! registered twice are two independent observers.

use std::fmt;
use std::sync::Arc;

use crate::error::ObserverError;

/// Identifier of one observer registration within a cell.
///
/// Ids come from a per-cell counter and are never reused, even after the
/// registration they named has been disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A change callback, invoked with `(new, old)`.
///
/// Returning an error stops the dispatch round it was called from and
/// surfaces to the caller of `set`.
pub type Observer<T> = Arc<dyn Fn(&T, &T) -> Result<(), ObserverError> + Send + Sync>;

/// Hands out observer ids for a single cell.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self) -> ObserverId {
        let id = ObserverId(self.next);
        self.next += 1;
        id
    }
}

/// Lift a callback that cannot fail into an [`Observer`].
pub(crate) fn infallible<T, F>(callback: F) -> Observer<T>
where
    T: 'static,
    F: Fn(&T, &T) + Send + Sync + 'static,
{
    Arc::new(move |new: &T, old: &T| -> Result<(), ObserverError> {
        callback(new, old);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn allocator_never_repeats() {
        let mut ids = IdAllocator::default();
        let id1 = ids.allocate();
        let id2 = ids.allocate();
        let id3 = ids.allocate();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert!(id1 < id2 && id2 < id3);
    }

    #[test]
    fn observer_id_display() {
        assert_eq!(ObserverId::from_raw(7).to_string(), "#7");
        assert_eq!(ObserverId::from_raw(7).raw(), 7);
    }

    #[test]
    fn infallible_passes_new_then_old() {
        let seen = Arc::new(AtomicI32::new(0));
        let seen_clone = seen.clone();

        let observer = infallible(move |new: &i32, old: &i32| {
            seen_clone.store(new * 10 + old, Ordering::SeqCst);
        });

        assert!(observer(&4, &2).is_ok());
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }
}
