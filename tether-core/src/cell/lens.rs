//! Lenses.
//!
//! A [`Lens`] is a pair of pure functions over an aggregate `A`: a getter that
//! reads a part `B`, and a wither that rebuilds `A` with a replacement part.
//! Nothing checks it at runtime, but a lens is expected to obey
//!
//! - `get(&with(a, b)) == b`
//! - `with(a.clone(), get(&a)) == a`

use std::fmt;
use std::sync::Arc;

type Getter<A, B> = Arc<dyn Fn(&A) -> B + Send + Sync>;
type Wither<A, B> = Arc<dyn Fn(A, B) -> A + Send + Sync>;

/// Bidirectional accessor focusing on a `B` inside an `A`.
///
/// # Example
///
/// ```rust
/// use tether_core::Lens;
///
/// let first = Lens::new(|p: &(i32, i32)| p.0, |p: (i32, i32), v| (v, p.1));
/// assert_eq!(first.get(&(1, 2)), 1);
/// assert_eq!(first.with((1, 2), 9), (9, 2));
/// ```
pub struct Lens<A, B> {
    getter: Getter<A, B>,
    wither: Wither<A, B>,
}

impl<A, B> Lens<A, B>
where
    A: 'static,
    B: 'static,
{
    pub fn new<G, W>(getter: G, wither: W) -> Self
    where
        G: Fn(&A) -> B + Send + Sync + 'static,
        W: Fn(A, B) -> A + Send + Sync + 'static,
    {
        Self {
            getter: Arc::new(getter),
            wither: Arc::new(wither),
        }
    }

    /// Read the focused part.
    pub fn get(&self, whole: &A) -> B {
        (self.getter)(whole)
    }

    /// Rebuild `whole` with `part` in the focused position.
    pub fn with(&self, whole: A, part: B) -> A {
        (self.wither)(whole, part)
    }

    /// Compose with a lens focusing further inside `B`.
    pub fn then<C>(self, inner: Lens<B, C>) -> Lens<A, C>
    where
        C: 'static,
    {
        let outer = self.clone();
        let inner_get = inner.clone();
        Lens::new(
            move |whole: &A| inner_get.get(&outer.get(whole)),
            move |whole: A, part: C| {
                let middle = inner.with(self.get(&whole), part);
                self.with(whole, middle)
            },
        )
    }
}

impl<A, B> Clone for Lens<A, B> {
    fn clone(&self) -> Self {
        Self {
            getter: Arc::clone(&self.getter),
            wither: Arc::clone(&self.wither),
        }
    }
}

impl<A, B> fmt::Debug for Lens<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens").finish_non_exhaustive()
    }
}
