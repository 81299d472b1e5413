//! Type-erased vars.
//!
//! A projection chain's concrete type spells out every level of the chain
//! (`Projection<IndexProjection<ValueCell<Vec<Person>>, _>, Person, String>`).
//! [`AnyVar`] hides it behind three shared closures so components can accept
//! "some var of T" without naming where it came from.

use std::fmt;
use std::sync::Arc;

use super::disposable::Disposable;
use super::observer::Observer;
use super::var::Var;
use crate::error::Result;

/// A [`Var`] of unknown concrete type.
pub struct AnyVar<T> {
    get: Arc<dyn Fn() -> Result<T> + Send + Sync>,
    set: Arc<dyn Fn(T) -> Result<()> + Send + Sync>,
    subscribe: Arc<dyn Fn(Observer<T>) -> Disposable + Send + Sync>,
}

impl<T> AnyVar<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<V>(var: V) -> Self
    where
        V: Var<T>,
    {
        let getter = var.clone();
        let setter = var.clone();
        Self {
            get: Arc::new(move || getter.get()),
            set: Arc::new(move |value| setter.set(value)),
            subscribe: Arc::new(move |observer| var.subscribe(observer)),
        }
    }
}

impl<T> Var<T> for AnyVar<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> Result<T> {
        (self.get)()
    }

    fn set(&self, value: T) -> Result<()> {
        (self.set)(value)
    }

    fn subscribe(&self, observer: Observer<T>) -> Disposable {
        (self.subscribe)(observer)
    }

    fn erase(self) -> AnyVar<T> {
        self
    }
}

impl<T> Clone for AnyVar<T> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
            subscribe: Arc::clone(&self.subscribe),
        }
    }
}

impl<T> fmt::Debug for AnyVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyVar").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ValueCell;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn erased_var_delegates() {
        let cell = ValueCell::new(vec![1, 2, 3]);
        let second: AnyVar<i32> = cell.at(1).erase();
        let calls = Arc::new(AtomicI32::new(0));
        let calls_clone = calls.clone();

        let watch = second.observe(move |new: &i32, old: &i32| {
            assert_eq!((*new, *old), (20, 2));
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(second.get().unwrap(), 2);
        second.set(20).unwrap();
        assert_eq!(cell.value(), vec![1, 20, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(watch);
        assert_eq!(cell.observer_count(), 0);
    }

    #[test]
    fn erased_vars_share_a_type() {
        let pair = ValueCell::new((1, 2));
        let vars: Vec<AnyVar<i32>> = vec![
            pair.project(|p: &(i32, i32)| p.0, |p: (i32, i32), v| (v, p.1)).erase(),
            pair.project(|p: &(i32, i32)| p.1, |p: (i32, i32), v| (p.0, v)).erase(),
        ];

        for var in &vars {
            var.update(|v| *v *= 10).unwrap();
        }
        assert_eq!(pair.value(), (10, 20));

        // Erasing twice does not add another layer.
        let again = vars[0].clone().erase();
        assert_eq!(again.get().unwrap(), 10);
    }
}
