//! Field Projections
//!
//! A [`Projection`] is a storage-less cell derived from a parent through a
//! [`Lens`]. Every operation delegates to the parent:
//!
//! - `get` reads the parent and applies the getter.
//! - `set` reads the parent, rebuilds it with the wither, and sets the
//!   parent. This read-modify-write is not atomic; the last writer wins.
//! - Observers are registered directly on the parent, wrapped so they see
//!   the focused part. Disposing the handle removes them from the parent.
//!
//! Observers fire on every parent `set`, even when the focused part did not
//! change. Callers that only care about real changes compare `new` and
//! `old` themselves.

use std::fmt;

use super::disposable::Disposable;
use super::lens::Lens;
use super::observer::Observer;
use super::var::Var;
use crate::error::Result;

/// A derived cell focused on a `B` inside its parent's `A`.
pub struct Projection<P, A, B> {
    parent: P,
    lens: Lens<A, B>,
}

impl<P, A, B> Projection<P, A, B>
where
    P: Var<A>,
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    pub fn new(parent: P, lens: Lens<A, B>) -> Self {
        Self { parent, lens }
    }

    /// The cell this projection delegates to.
    pub fn parent(&self) -> &P {
        &self.parent
    }

    pub fn lens(&self) -> &Lens<A, B> {
        &self.lens
    }
}

impl<P, A, B> Var<B> for Projection<P, A, B>
where
    P: Var<A>,
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    fn get(&self) -> Result<B> {
        self.parent.get().map(|whole| self.lens.get(&whole))
    }

    fn set(&self, value: B) -> Result<()> {
        let whole = self.parent.get()?;
        self.parent.set(self.lens.with(whole, value))
    }

    fn subscribe(&self, observer: Observer<B>) -> Disposable {
        let lens = self.lens.clone();
        self.parent
            .try_observe(move |new: &A, old: &A| observer(&lens.get(new), &lens.get(old)))
    }
}

impl<P, A, B> Clone for Projection<P, A, B>
where
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            lens: self.lens.clone(),
        }
    }
}

impl<P, A, B> fmt::Debug for Projection<P, A, B>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}
