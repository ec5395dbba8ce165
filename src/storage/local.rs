// /storage/local.rs
use super::{SheetBackend, Slot};
use crate::error::{Result, SheetError};
use crate::record::CharacterRecord;
use crate::schema::{FieldSchema, META_KEY};

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// String key-value store, the local counterpart of browser storage.
pub trait SlotStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct MemorySlotStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.items).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        lock(&self.items).remove(key);
        Ok(())
    }
}

/// Slot store persisted as one pretty-printed JSON object of key to string.
#[derive(Debug)]
pub struct FileSlotStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileSlotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let data = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    // A store file that no longer parses is replaced rather than blocking every write.
    fn read_items_for_update(&self) -> Result<BTreeMap<String, String>> {
        match self.read_items() {
            Err(SheetError::Serialization(e)) => {
                log::warn!(
                    "Discarding unreadable slot store {}: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl SlotStore for FileSlotStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = lock(&self.guard);
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = lock(&self.guard);
        let mut items = self.read_items_for_update()?;
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = lock(&self.guard);
        let mut items = self.read_items_for_update()?;
        if items.remove(key).is_some() {
            self.write_items(&items)?;
        }
        Ok(())
    }
}

/// Standalone persistence: the whole record serialized into one slot.
#[derive(Debug)]
pub struct LocalBackend<S: SlotStore> {
    store: S,
    key: String,
}

impl<S: SlotStore> LocalBackend<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, META_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn load_record(&self, schema: &FieldSchema) -> Result<CharacterRecord> {
        let Some(raw) = self.store.get_item(&self.key)? else {
            return Ok(CharacterRecord::empty(schema));
        };
        match CharacterRecord::from_json(schema, &raw) {
            Ok(record) => Ok(record),
            Err(e) => {
                log::warn!("Stored sheet under {} is malformed, loading an empty sheet: {}", self.key, e);
                Ok(CharacterRecord::empty(schema))
            }
        }
    }

    pub fn save_record(&self, record: &CharacterRecord) -> Result<()> {
        self.store.set_item(&self.key, &record.to_json()?)
    }
}

#[async_trait]
impl<S: SlotStore> SheetBackend for LocalBackend<S> {
    async fn load(&self, slot: &Slot, schema: &FieldSchema) -> Result<CharacterRecord> {
        match slot {
            Slot::Local => self.load_record(schema),
            other => Err(SheetError::UnsupportedSlot(other.to_string())),
        }
    }

    async fn save(&self, slot: &Slot, record: &CharacterRecord) -> Result<()> {
        match slot {
            Slot::Local => self.save_record(record),
            other => Err(SheetError::UnsupportedSlot(other.to_string())),
        }
    }
}
