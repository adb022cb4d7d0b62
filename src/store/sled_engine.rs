use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use super::ChangeListener;
use super::ListenerHandle;
use super::ListenerSet;
use super::StoreEngine;
use crate::Result;
use crate::StorageError;
use crate::StoreSettings;

/// Persistent store engine over one sled tree.
///
/// Each namespace maps to its own tree inside the database, so every
/// contract's keys live apart from every other contract's.
pub struct SledStoreEngine {
    // Tree handles stay valid only while their Db lives
    _db: sled::Db,
    tree: sled::Tree,
    listeners: ListenerSet,
    /// Serializes mutation + notification so per-key delivery order
    /// matches store order
    write_lock: Mutex<()>,
}

impl SledStoreEngine {
    /// Open (or create) the database at the configured path and the tree
    /// for `namespace`.
    pub fn open(
        settings: &StoreSettings,
        namespace: &str,
    ) -> Result<Self> {
        debug!("open sled store at {:?}, namespace = {namespace}", settings.path);

        let db = sled::Config::default()
            .path(&settings.path)
            .cache_capacity(settings.cache_capacity_bytes)
            .flush_every_ms(settings.flush_every_ms)
            .use_compression(settings.use_compression)
            .open()
            .map_err(|e| {
                warn!("failed to open sled db at {:?}: {e}", settings.path);
                StorageError::DbError(e.to_string())
            })?;
        let tree = db.open_tree(namespace)?;

        Ok(Self {
            _db: db,
            tree,
            listeners: ListenerSet::new(),
            write_lock: Mutex::new(()),
        })
    }

    /// Number of live listener registrations
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for SledStoreEngine {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SledStoreEngine")
            .field("tree_len", &self.tree.len())
            .finish()
    }
}

impl StoreEngine for SledStoreEngine {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>> {
        match self.tree.get(key)? {
            Some(raw) => {
                let value = String::from_utf8(raw.to_vec()).map_err(|_| StorageError::Corrupt {
                    key: key.to_string(),
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn put(
        &self,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.tree.insert(key, value.as_bytes())?;
        self.listeners.notify(key);
        Ok(())
    }

    fn remove(
        &self,
        key: &str,
    ) -> Result<()> {
        let _guard = self.write_lock.lock();
        let previous = self.tree.remove(key)?;
        if previous.is_some() {
            self.listeners.notify(key);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.tree.clear()?;
        Ok(())
    }

    fn all_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in self.tree.iter().keys() {
            let raw = entry?;
            match String::from_utf8(raw.to_vec()) {
                Ok(key) => keys.push(key),
                Err(_) => warn!("skipping non-utf8 key in tree"),
            }
        }
        Ok(keys)
    }

    fn register_listener(
        &self,
        listener: ChangeListener,
    ) -> ListenerHandle {
        self.listeners.register(listener)
    }
}
