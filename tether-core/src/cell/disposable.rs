//! Disposable Implementation
//!
//! A [`Disposable`] is the handle returned for every observer registration.
//! It wraps exactly one release action, which removes that registration from
//! the cell it was made against.
//!
//! # Lifetime
//!
//! The token is an RAII guard: dropping it disposes it. Code that wants a
//! subscription to outlive every handle must say so with
//! [`Disposable::detach`]. A detached registration can never be removed
//! again, which is a permanent subscription for as long as the cell lives.
//!
//! The release action only holds a weak reference to the cell, so a
//! disposable never keeps a cell alive and disposing after the cell is gone
//! does nothing.

use std::fmt;

use parking_lot::Mutex;

type Release = Box<dyn FnOnce() + Send>;

/// One-shot handle that unregisters a single observer.
#[must_use = "dropping a Disposable immediately unregisters its observer"]
pub struct Disposable {
    release: Mutex<Option<Release>>,
}

impl Disposable {
    /// Wrap a release action.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// Run the release action.
    ///
    /// Only the first call has an effect; later calls (and the eventual drop)
    /// do nothing.
    pub fn dispose(&self) {
        // Take the action out first so the lock is not held while it runs.
        let release = self.release.lock().take();
        if let Some(release) = release {
            release();
        }
    }

    /// Check whether the release action has already run (or was detached).
    pub fn is_disposed(&self) -> bool {
        self.release.lock().is_none()
    }

    /// Give up the handle without unregistering the observer.
    pub fn detach(self) {
        drop(self.release.lock().take());
    }
}

impl Drop for Disposable {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
