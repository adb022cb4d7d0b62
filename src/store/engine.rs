use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::RwLock;

use crate::Result;

#[cfg(test)]
use mockall::automock;

/// Callback invoked with the affected key on every mutating operation.
///
/// May fire on whatever thread performed the mutation; implementations
/// must not call back into the engine.
pub type ChangeListener = Arc<dyn Fn(&str) + Send + Sync>;

/// The backing key-value store contract.
///
/// All operations are local and effectively synchronous. Engines notify
/// registered listeners per key on put and on remove-of-present-key; a
/// bulk `clear` reports nothing per key — the accessor snapshots the key
/// set and synthesizes one event per previously-present key itself.
#[cfg_attr(test, automock)]
pub trait StoreEngine: Send + Sync + 'static {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>>;

    fn put(
        &self,
        key: &str,
        value: &str,
    ) -> Result<()>;

    fn remove(
        &self,
        key: &str,
    ) -> Result<()>;

    fn clear(&self) -> Result<()>;

    fn all_keys(&self) -> Result<Vec<String>>;

    /// Register a mutation listener. Dropping the returned handle
    /// deregisters it.
    fn register_listener(
        &self,
        listener: ChangeListener,
    ) -> ListenerHandle;
}

#[derive(Default)]
struct ListenerSetInner {
    listeners: RwLock<HashMap<u64, ChangeListener>>,
    next_id: AtomicU64,
}

/// Shared listener registry used by the bundled engines.
#[derive(Clone, Default)]
pub struct ListenerSet {
    inner: Arc<ListenerSetInner>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        listener: ChangeListener,
    ) -> ListenerHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().insert(id, listener);
        ListenerHandle {
            set: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver one change event to every registered listener
    pub fn notify(
        &self,
        key: &str,
    ) {
        let listeners = self.inner.listeners.read();
        for listener in listeners.values() {
            listener(key);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// RAII registration handle; dropping it removes the listener.
pub struct ListenerHandle {
    set: Weak<ListenerSetInner>,
    id: u64,
}

impl ListenerHandle {
    /// A handle not tied to any listener set (mock engines, tests)
    pub fn disconnected() -> Self {
        Self {
            set: Weak::new(),
            id: 0,
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.set.upgrade() {
            inner.listeners.write().remove(&self.id);
        }
    }
}
