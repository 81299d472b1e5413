//! Error types for cell operations.
//!
//! Nothing in this crate recovers from a failure locally. Every error is
//! handed straight back to whoever called `get`, `set` or `update`.

use thiserror::Error;

use crate::cell::ObserverId;

/// The error type an observer callback may return.
///
/// Boxed so that callbacks can bubble up any error with `?`.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by cells and their projections.
#[derive(Debug, Error)]
pub enum CellError {
    /// An index projection's position is not valid for the collection the
    /// parent currently holds.
    #[error("index {index} is out of range for a collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// An observer failed while a `set` was being dispatched.
    ///
    /// Observers after the failing one were not invoked for that `set`.
    /// The new value was already stored when dispatch began.
    #[error("observer {id} failed: {source}")]
    ObserverFailure {
        id: ObserverId,
        #[source]
        source: ObserverError,
    },
}

impl CellError {
    /// Returns the error an observer reported, if this is an observer failure.
    pub fn observer_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            CellError::ObserverFailure { source, .. } => Some(source.as_ref()),
            CellError::IndexOutOfRange { .. } => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = CellError> = std::result::Result<T, E>;
