//! The `Var` trait.
//!
//! Every cell kind (the storage-owning [`ValueCell`](super::ValueCell),
//! field and index projections, and the type-erased [`AnyVar`]) implements
//! [`Var`], which is what lets projections be derived from projections.

use std::sync::Arc;

use super::disposable::Disposable;
use super::erased::AnyVar;
use super::index::{IndexProjection, IndexedCollection};
use super::lens::Lens;
use super::observer::{self, Observer};
use super::projection::Projection;
use crate::error::{ObserverError, Result};

/// A readable, writable, observable value of type T.
pub trait Var<T>: Clone + Send + Sync + 'static
where
    T: Clone + Send + Sync + 'static,
{
    /// Get the current value.
    fn get(&self) -> Result<T>;

    /// Replace the value and notify every observer registered anywhere along
    /// the delegation chain.
    fn set(&self, value: T) -> Result<()>;

    /// Register an observer, returning the handle that removes it.
    fn subscribe(&self, observer: Observer<T>) -> Disposable;

    /// Register a callback that cannot fail.
    fn observe<F>(&self, callback: F) -> Disposable
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.subscribe(observer::infallible(callback))
    }

    /// Register a callback whose error aborts the dispatch round and is
    /// returned from `set`.
    fn try_observe<F>(&self, observer: F) -> Disposable
    where
        F: Fn(&T, &T) -> std::result::Result<(), ObserverError> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(observer))
    }

    /// Read, modify in place, and write back.
    ///
    /// Not atomic: a write landing between the read and the write is lost.
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.get()?;
        f(&mut value);
        self.set(value)
    }

    /// Derive a projection focused on part of this value.
    fn project<B, G, W>(&self, getter: G, wither: W) -> Projection<Self, T, B>
    where
        B: Clone + Send + Sync + 'static,
        G: Fn(&T) -> B + Send + Sync + 'static,
        W: Fn(T, B) -> T + Send + Sync + 'static,
    {
        Projection::new(self.clone(), Lens::new(getter, wither))
    }

    /// Derive a projection through a prepared lens.
    fn focus<B>(&self, lens: Lens<T, B>) -> Projection<Self, T, B>
    where
        B: Clone + Send + Sync + 'static,
    {
        Projection::new(self.clone(), lens)
    }

    /// Derive a projection onto the element at `index`.
    ///
    /// The index is fixed: inserting into or removing from the collection
    /// later does not move it.
    fn at(&self, index: usize) -> IndexProjection<Self, T>
    where
        T: IndexedCollection,
        T::Element: Clone + Send + Sync + 'static,
    {
        IndexProjection::new(self.clone(), index)
    }

    /// Hide the concrete cell type behind [`AnyVar`].
    fn erase(self) -> AnyVar<T> {
        AnyVar::new(self)
    }
}
