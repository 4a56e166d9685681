//! Binds collection results to a caller-supplied list view.
//!
//! The list widget itself is outside this crate; it is consumed through
//! the `ListView` contract only. `ListBinder` keeps the last received
//! collection and rebinds the view on every terminal result, so a caller
//! can register one binder as the collection handler of repeated list
//! operations and keep a clone for item access.

use std::sync::{Arc, Mutex, PoisonError};

use crate::entity::Entity;
use crate::handler::{CollectionHandler, Progress};

/// Widget-binding contract for a list-rendering view.
pub trait ListView<T>: Send + 'static {
    /// Replace the view's contents with the given items.
    fn rebind(&mut self, items: &[T]);
}

/// Collection handler that stores the last received collection and keeps a
/// list view in sync with it. Cheap to clone; all clones share the same
/// view and items.
pub struct ListBinder<T, V: ListView<T>> {
    inner: Arc<Mutex<BinderInner<T, V>>>,
}

struct BinderInner<T, V> {
    view: V,
    items: Vec<T>,
}

impl<T, V: ListView<T>> ListBinder<T, V> {
    pub fn new(view: V) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BinderInner {
                view,
                items: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BinderInner<T, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// A copy of the item at `index`, if present.
    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.lock().items.get(index).cloned()
    }

    /// Drop the stored collection and rebind the view empty.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.items.clear();
        let BinderInner { view, items } = &mut *inner;
        view.rebind(items);
    }
}

impl<T, V: ListView<T>> Clone for ListBinder<T, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity, V: ListView<T>> CollectionHandler<T> for ListBinder<T, V> {
    fn handle_progress(&mut self, _progress: &[Progress]) {}

    /// Store the collection and rebind the view. A failed load clears the
    /// previous contents rather than leaving stale rows visible.
    fn handle_results(&mut self, results: Option<Vec<T>>) {
        let mut inner = self.lock();
        inner.items = results.unwrap_or_default();
        let BinderInner { view, items } = &mut *inner;
        view.rebind(items);
    }
}
