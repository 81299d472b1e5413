//! Index Projections
//!
//! An [`IndexProjection`] focuses on one element of a collection held by its
//! parent. The position is captured when the projection is derived and never
//! adjusted afterwards: if the collection later shrinks below it, `get`,
//! `set` and notifications report [`CellError::IndexOutOfRange`].

use std::collections::VecDeque;
use std::fmt;
use std::hash::BuildHasher;
use std::marker::PhantomData;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::disposable::Disposable;
use super::observer::Observer;
use super::var::Var;
use crate::error::{CellError, Result};

/// A collection whose elements can be read and replaced by position.
pub trait IndexedCollection {
    type Element;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element(&self, index: usize) -> Option<&Self::Element>;

    fn element_mut(&mut self, index: usize) -> Option<&mut Self::Element>;
}

impl<E> IndexedCollection for Vec<E> {
    type Element = E;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<&E> {
        self.get(index)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut E> {
        self.get_mut(index)
    }
}

impl<E, const N: usize> IndexedCollection for [E; N] {
    type Element = E;

    fn len(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> Option<&E> {
        self.as_slice().get(index)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut E> {
        self.as_mut_slice().get_mut(index)
    }
}

impl<E> IndexedCollection for VecDeque<E> {
    type Element = E;

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn element(&self, index: usize) -> Option<&E> {
        self.get(index)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut E> {
        self.get_mut(index)
    }
}

impl<A: smallvec::Array> IndexedCollection for SmallVec<A> {
    type Element = A::Item;

    fn len(&self) -> usize {
        SmallVec::len(self)
    }

    fn element(&self, index: usize) -> Option<&A::Item> {
        self.as_slice().get(index)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut A::Item> {
        self.as_mut_slice().get_mut(index)
    }
}

/// Positional access to the values of an insertion-ordered map.
impl<K, V, S: BuildHasher> IndexedCollection for IndexMap<K, V, S> {
    type Element = V;

    fn len(&self) -> usize {
        IndexMap::len(self)
    }

    fn element(&self, index: usize) -> Option<&V> {
        self.get_index(index).map(|(_, value)| value)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut V> {
        self.get_index_mut(index).map(|(_, value)| value)
    }
}

fn element_at<C: IndexedCollection>(collection: &C, index: usize) -> Result<&C::Element> {
    collection.element(index).ok_or(CellError::IndexOutOfRange {
        index,
        len: collection.len(),
    })
}

/// A derived cell focused on the element at a fixed position.
pub struct IndexProjection<P, C> {
    parent: P,
    index: usize,
    _collection: PhantomData<fn() -> C>,
}

impl<P, C> IndexProjection<P, C>
where
    P: Var<C>,
    C: IndexedCollection + Clone + Send + Sync + 'static,
    C::Element: Clone + Send + Sync + 'static,
{
    pub fn new(parent: P, index: usize) -> Self {
        Self {
            parent,
            index,
            _collection: PhantomData,
        }
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<P, C> Var<C::Element> for IndexProjection<P, C>
where
    P: Var<C>,
    C: IndexedCollection + Clone + Send + Sync + 'static,
    C::Element: Clone + Send + Sync + 'static,
{
    fn get(&self) -> Result<C::Element> {
        let collection = self.parent.get()?;
        element_at(&collection, self.index).cloned()
    }

    fn set(&self, value: C::Element) -> Result<()> {
        let mut collection = self.parent.get()?;
        let len = collection.len();
        match collection.element_mut(self.index) {
            Some(slot) => *slot = value,
            None => {
                return Err(CellError::IndexOutOfRange {
                    index: self.index,
                    len,
                })
            }
        }
        self.parent.set(collection)
    }

    fn subscribe(&self, observer: Observer<C::Element>) -> Disposable {
        let index = self.index;
        self.parent.try_observe(move |new: &C, old: &C| {
            let new = element_at(new, index)?;
            let old = element_at(old, index)?;
            observer(new, old)
        })
    }
}

impl<P, C> Clone for IndexProjection<P, C>
where
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            index: self.index,
            _collection: PhantomData,
        }
    }
}

impl<P, C> fmt::Debug for IndexProjection<P, C>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexProjection")
            .field("parent", &self.parent)
            .field("index", &self.index)
            .finish()
    }
}
