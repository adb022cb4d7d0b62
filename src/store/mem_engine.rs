use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use super::ChangeListener;
use super::ListenerHandle;
use super::ListenerSet;
use super::StoreEngine;
use crate::Result;

/// In-memory store engine.
///
/// Listeners are invoked while the data lock is held so per-key delivery
/// order matches mutation order; they must not call back into the engine.
#[derive(Default)]
pub struct MemoryStoreEngine {
    data: RwLock<HashMap<String, String>>,
    listeners: ListenerSet,
}

impl MemoryStoreEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live listener registrations
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for MemoryStoreEngine {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("MemoryStoreEngine")
            .field("len", &self.data.read().len())
            .finish()
    }
}

impl StoreEngine for MemoryStoreEngine {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(
        &self,
        key: &str,
        value: &str,
    ) -> Result<()> {
        trace!("mem put key = {key}");
        let mut data = self.data.write();
        data.insert(key.to_string(), value.to_string());
        self.listeners.notify(key);
        Ok(())
    }

    fn remove(
        &self,
        key: &str,
    ) -> Result<()> {
        let mut data = self.data.write();
        if data.remove(key).is_some() {
            self.listeners.notify(key);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.data.write().clear();
        Ok(())
    }

    fn all_keys(&self) -> Result<Vec<String>> {
        Ok(self.data.read().keys().cloned().collect())
    }

    fn register_listener(
        &self,
        listener: ChangeListener,
    ) -> ListenerHandle {
        self.listeners.register(listener)
    }
}
