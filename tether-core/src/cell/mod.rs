//! Observable Cells
//!
//! This module implements the cell system: a storage-owning cell, derived
//! cells that focus on part of a parent's value, and the handles that
//! control how long an observer stays registered.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A [`ValueCell`] holds one current value and a registry of observers.
//! Setting it replaces the value and synchronously calls every observer with
//! `(new, old)`. There is no batching and no equality check: N sets produce
//! N notification rounds, even if the value did not change.
//!
//! ## Projections
//!
//! A [`Projection`] has no storage. It reaches its parent's value through a
//! [`Lens`] and turns every `set` into a read-modify-write of the parent. An
//! [`IndexProjection`] does the same for one element of a collection. Both
//! can be derived from other projections, forming a tree whose writes all
//! land on a single root cell.
//!
//! ## Disposables
//!
//! Registering an observer returns a [`Disposable`]. Disposing it, or simply
//! dropping it, removes exactly that registration. Observers registered
//! through a projection live on the root cell, so the handle removes them
//! there.
//!
//! # Implementation Notes
//!
//! All cell kinds implement the [`Var`] trait. Generic code should take
//! `impl Var<T>`, or an [`AnyVar`] when the concrete type must be hidden.

mod disposable;
mod erased;
mod index;
mod lens;
mod observer;
mod projection;
mod value;
mod var;

pub use disposable::Disposable;
pub use erased::AnyVar;
pub use index::{IndexProjection, IndexedCollection};
pub use lens::Lens;
pub use observer::{Observer, ObserverId};
pub use projection::Projection;
pub use value::ValueCell;
pub use var::Var;
