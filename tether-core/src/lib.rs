//! Tether Core
//!
//! This crate provides observable value cells for binding narrow, typed
//! views onto larger shared state. It implements:
//!
//! - Value cells with synchronous `(new, old)` change notification
//! - Field projections through caller-supplied lenses
//! - Index projections onto collection elements
//! - Disposable observer handles that unregister on drop
//!
//! # Architecture
//!
//! - `cell`: cells, projections, lenses and observer handles
//! - `error`: the crate error type
//!
//! # Example
//!
//! ```rust
//! use tether_core::{ValueCell, Var};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Person {
//!     first: String,
//!     last: String,
//! }
//!
//! let people = ValueCell::new(vec![Person { first: "Jo".into(), last: "Smith".into() }]);
//!
//! // Focus on the first person's last name.
//! let last = people.at(0).project(
//!     |p: &Person| p.last.clone(),
//!     |mut p: Person, last| {
//!         p.last = last;
//!         p
//!     },
//! );
//!
//! let _watch = last.observe(|new, old| {
//!     if new != old {
//!         println!("last name changed to {new}");
//!     }
//! });
//!
//! last.set("Doe".into())?;
//! assert_eq!(people.value()[0].last, "Doe");
//! # Ok::<(), tether_core::CellError>(())
//! ```

pub mod cell;
pub mod error;

pub use cell::{
    AnyVar, Disposable, IndexProjection, IndexedCollection, Lens, Observer, ObserverId,
    Projection, ValueCell, Var,
};
pub use error::{CellError, ObserverError, Result};
