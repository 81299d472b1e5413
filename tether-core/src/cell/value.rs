//! ValueCell Implementation
//!
//! A [`ValueCell`] is the only cell kind that owns storage. Every projection
//! eventually resolves its reads, writes and registrations against one.
//!
//! # How Cells Work
//!
//! 1. The cell holds the current value plus a registry of observers keyed
//!    by [`ObserverId`].
//!
//! 2. `set` swaps in the new value, snapshots the registry and releases the
//!    lock.
//!
//! 3. Every observer in the snapshot is called with `(new, old)`. Observers
//!    added or disposed by a callback do not change the round in progress.
//!
//! # Thread Safety
//!
//! The state sits behind a mutex so handles can be shared and moved freely,
//! but the lock only guards individual reads and swaps. Concurrent writers
//! still race each other; callers are expected to have a single logical
//! writer at a time.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::disposable::Disposable;
use super::observer::{IdAllocator, Observer, ObserverId};
use super::var::Var;
use crate::error::{CellError, Result};

/// Counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique cell ID.
fn next_cell_id() -> u64 {
    CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Observers captured at the start of a dispatch round.
type Snapshot<T> = SmallVec<[(ObserverId, Observer<T>); 4]>;

struct CellState<T> {
    value: T,
    /// Dispatch follows registration order.
    observers: IndexMap<ObserverId, Observer<T>>,
    ids: IdAllocator,
}

/// An observable cell holding a value of type T.
///
/// Cloning a cell gives another handle onto the same value and observers.
///
/// # Example
///
/// ```rust
/// use tether_core::{ValueCell, Var};
///
/// let count = ValueCell::new(0);
/// let _watch = count.observe(|new, old| println!("{old} -> {new}"));
///
/// count.set(5)?;
/// assert_eq!(count.value(), 5);
/// # Ok::<(), tether_core::CellError>(())
/// ```
pub struct ValueCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Unique identifier for this cell.
    id: u64,

    /// Optional name carried into log fields and debug output.
    label: Option<Arc<str>>,

    state: Arc<Mutex<CellState<T>>>,
}

impl<T> ValueCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: next_cell_id(),
            label: None,
            state: Arc::new(Mutex::new(CellState {
                value,
                observers: IndexMap::new(),
                ids: IdAllocator::default(),
            })),
        }
    }

    /// Create a new cell with a diagnostic label.
    pub fn with_label(label: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(value)
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get a copy of the current value.
    ///
    /// Unlike [`Var::get`] this cannot fail: a root cell always has a value.
    pub fn value(&self) -> T {
        self.state.lock().value.clone()
    }

    /// Get the number of live observer registrations.
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    fn replace(&self, value: T) -> Result<()> {
        let (old, snapshot) = {
            let mut state = self.state.lock();
            let old = std::mem::replace(&mut state.value, value.clone());
            let snapshot: Snapshot<T> = state
                .observers
                .iter()
                .map(|(id, observer)| (*id, Arc::clone(observer)))
                .collect();
            (old, snapshot)
        };

        trace!(cell = self.id, label = ?self.label, observers = snapshot.len(), "cell set");

        for (id, observer) in snapshot {
            trace!(cell = self.id, observer = %id, "notifying observer");
            if let Err(source) = observer(&value, &old) {
                warn!(
                    cell = self.id,
                    observer = %id,
                    error = %source,
                    "observer failed, remaining observers skipped"
                );
                return Err(CellError::ObserverFailure { id, source });
            }
        }

        Ok(())
    }

    fn register(&self, observer: Observer<T>) -> Disposable {
        let id = {
            let mut state = self.state.lock();
            let id = state.ids.allocate();
            state.observers.insert(id, observer);
            id
        };
        debug!(cell = self.id, observer = %id, "observer registered");

        let cell = self.id;
        let state = Arc::downgrade(&self.state);
        Disposable::new(move || Self::unregister(&state, cell, id))
    }

    fn unregister(state: &Weak<Mutex<CellState<T>>>, cell: u64, id: ObserverId) {
        let Some(state) = state.upgrade() else {
            return;
        };
        let removed = state.lock().observers.shift_remove(&id);
        if removed.is_some() {
            debug!(cell, observer = %id, "observer removed");
        }
    }
}

impl<T> Var<T> for ValueCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> Result<T> {
        Ok(self.value())
    }

    fn set(&self, value: T) -> Result<()> {
        self.replace(value)
    }

    fn subscribe(&self, observer: Observer<T>) -> Disposable {
        self.register(observer)
    }
}

impl<T> Clone for ValueCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            label: self.label.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Debug for ValueCell<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCell")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("value", &self.value())
            .field("observer_count", &self.observer_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Snapshots
// ----------------------------------------------------------------------------

/// Serializes the current value only; observers are not part of a snapshot.
impl<T> Serialize for ValueCell<T>
where
    T: Clone + Send + Sync + Serialize + 'static,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.state.lock().value.serialize(serializer)
    }
}

/// Restores a snapshot into a fresh cell with no observers.
impl<'de, T> Deserialize<'de> for ValueCell<T>
where
    T: Clone + Send + Sync + Deserialize<'de> + 'static,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::new)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn cell_get_and_set() {
        let cell = ValueCell::new(0);
        assert_eq!(cell.get().unwrap(), 0);

        cell.set(42).unwrap();
        assert_eq!(cell.get().unwrap(), 42);
        assert_eq!(cell.value(), 42);
    }

    #[test]
    fn cell_update() {
        let cell = ValueCell::new(10);
        cell.update(|v| *v += 5).unwrap();
        assert_eq!(cell.value(), 15);
    }

    #[test]
    fn cell_notifies_with_new_and_old() {
        let cell = ValueCell::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _watch = cell.observe(move |new: &i32, old: &i32| {
            seen_clone.lock().push((*new, *old));
        });

        cell.set(2).unwrap();
        cell.set(3).unwrap();
        assert_eq!(*seen.lock(), vec![(2, 1), (3, 2)]);
    }

    #[test]
    fn cell_notifies_in_registration_order() {
        let cell = ValueCell::new(0);
        let order = Arc::new(Mutex::new(Vec::new()));

        let watches: Vec<_> = (0..5)
            .map(|n| {
                let order = order.clone();
                cell.observe(move |_: &i32, _: &i32| order.lock().push(n))
            })
            .collect();

        watches[2].dispose();
        cell.set(1).unwrap();
        assert_eq!(*order.lock(), vec![0, 1, 3, 4]);
    }

    #[test]
    fn disposed_observer_is_not_called() {
        let cell = ValueCell::new(0);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let watch = cell.observe(move |_: &i32, _: &i32| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        cell.set(1).unwrap();
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        watch.dispose();
        assert_eq!(cell.observer_count(), 0);
        cell.set(2).unwrap();
        // Should not have been called again
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn identical_callbacks_register_twice() {
        let cell = ValueCell::new(0);
        let call_count = Arc::new(AtomicI32::new(0));

        let make = || {
            let call_count = call_count.clone();
            move |_: &i32, _: &i32| {
                call_count.fetch_add(1, Ordering::SeqCst);
            }
        };
        let _a = cell.observe(make());
        let _b = cell.observe(make());

        cell.set(1).unwrap();
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_observer_stops_dispatch() {
        let cell = ValueCell::new(0);
        let reached = Arc::new(AtomicI32::new(0));
        let reached_clone = reached.clone();

        let failing = cell.try_observe(|_: &i32, _: &i32| Err("rejected".into()));
        let _after = cell.observe(move |_: &i32, _: &i32| {
            reached_clone.fetch_add(1, Ordering::SeqCst);
        });

        let err = cell.set(7).unwrap_err();
        match err {
            CellError::ObserverFailure { id, source } => {
                assert_eq!(id.raw(), 0);
                assert_eq!(source.to_string(), "rejected");
            }
            other => panic!("unexpected error: {other}"),
        }
        // Value was stored before dispatch began.
        assert_eq!(cell.value(), 7);
        assert_eq!(reached.load(Ordering::SeqCst), 0);

        failing.dispose();
        cell.set(8).unwrap();
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registration_during_dispatch_waits_for_next_round() {
        let cell = ValueCell::new(0);
        let late_calls = Arc::new(AtomicI32::new(0));
        let held = Arc::new(Mutex::new(Vec::new()));

        let _outer = {
            let inner = cell.clone();
            let late_calls = late_calls.clone();
            let held = held.clone();
            cell.observe(move |_: &i32, _: &i32| {
                let late_calls = late_calls.clone();
                let watch = inner.observe(move |_: &i32, _: &i32| {
                    late_calls.fetch_add(1, Ordering::SeqCst);
                });
                held.lock().push(watch);
            })
        };

        cell.set(1).unwrap();
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        cell.set(2).unwrap();
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disposal_during_dispatch_keeps_snapshot() {
        let cell = ValueCell::new(0);
        let second_calls = Arc::new(AtomicI32::new(0));
        let slot: Arc<Mutex<Option<Disposable>>> = Arc::new(Mutex::new(None));

        let _first = {
            let slot = slot.clone();
            cell.observe(move |_: &i32, _: &i32| {
                if let Some(watch) = slot.lock().take() {
                    watch.dispose();
                }
            })
        };
        let second = {
            let second_calls = second_calls.clone();
            cell.observe(move |_: &i32, _: &i32| {
                second_calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        *slot.lock() = Some(second);

        cell.set(1).unwrap();
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);

        cell.set(2).unwrap();
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observer_can_read_cell_during_dispatch() {
        let cell = ValueCell::new(0);
        let seen = Arc::new(AtomicI32::new(-1));

        let _watch = {
            let reader = cell.clone();
            let seen = seen.clone();
            cell.observe(move |_: &i32, _: &i32| {
                seen.store(reader.value(), Ordering::SeqCst);
            })
        };

        cell.set(9).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn ids_are_not_reused_after_disposal() {
        let cell = ValueCell::new(0);
        let failing = |_: &i32, _: &i32| -> std::result::Result<(), crate::ObserverError> {
            Err("probe".into())
        };

        let first = cell.try_observe(failing);
        let first_id = match cell.set(1) {
            Err(CellError::ObserverFailure { id, .. }) => id,
            other => panic!("expected failure, got {other:?}"),
        };
        first.dispose();

        let _second = cell.try_observe(failing);
        let second_id = match cell.set(2) {
            Err(CellError::ObserverFailure { id, .. }) => id,
            other => panic!("expected failure, got {other:?}"),
        };
        assert_ne!(first_id, second_id);
    }

    #[test]
    fn disposable_does_not_keep_cell_alive() {
        let cell = ValueCell::new(String::from("gone"));
        let watch = cell.observe(|_: &String, _: &String| {});
        drop(cell);

        watch.dispose();
        assert!(watch.is_disposed());
    }

    #[test]
    fn cell_clone_shares_state() {
        let cell1 = ValueCell::new(0);
        let cell2 = cell1.clone();

        cell1.set(42).unwrap();
        assert_eq!(cell2.value(), 42);
        assert_eq!(cell1.id(), cell2.id());

        let _watch = cell2.observe(|_: &i32, _: &i32| {});
        assert_eq!(cell1.observer_count(), 1);
    }

    #[test]
    fn cell_ids_are_unique() {
        let c1 = ValueCell::new(0);
        let c2 = ValueCell::new(0);
        let c3 = ValueCell::with_label("third", 0);

        assert_ne!(c1.id(), c2.id());
        assert_ne!(c2.id(), c3.id());
        assert_eq!(c3.label(), Some("third"));
        assert_eq!(c1.label(), None);
    }

    #[test]
    fn snapshot_serializes_value_only() {
        let cell = ValueCell::new(vec![1, 2, 3]);
        let _watch = cell.observe(|_: &Vec<i32>, _: &Vec<i32>| {});

        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, "[1,2,3]");

        let restored: ValueCell<Vec<i32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.value(), vec![1, 2, 3]);
        assert_eq!(restored.observer_count(), 0);
        assert_ne!(restored.id(), cell.id());
    }
}
