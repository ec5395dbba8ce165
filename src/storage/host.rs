// /storage/host.rs
use crate::error::HostError;

use async_trait::async_trait;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use uuid::Uuid;

pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Opaque identifier of a scene item (token) on the tabletop.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// Notifications pushed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The user's current selection, in selection order.
    SelectionChanged(Vec<ItemId>),
    /// Ids of every item still present in the scene.
    ItemsChanged(Vec<ItemId>),
}

/// Async bridge to the tabletop's metadata store.
///
/// The scene holds one metadata object, every item holds its own. Writes
/// replace the whole object, so callers read-modify-write to keep sibling
/// keys.
#[async_trait]
pub trait MetadataHost: Send + Sync {
    async fn scene_metadata(&self) -> Result<Metadata, HostError>;
    async fn set_scene_metadata(&self, metadata: Metadata) -> Result<(), HostError>;
    // `None` when the item does not exist (anymore).
    async fn item_metadata(&self, id: &ItemId) -> Result<Option<Metadata>, HostError>;
    async fn set_item_metadata(&self, id: &ItemId, metadata: Metadata) -> Result<(), HostError>;
    async fn selection(&self) -> Result<Vec<ItemId>, HostError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SceneSnapshot {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    items: Vec<HostItem>,
    #[serde(default)]
    selection: Vec<ItemId>,
}

#[derive(Debug, Default)]
struct HostState {
    scene: SceneSnapshot,
    subscribers: Vec<mpsc::UnboundedSender<HostEvent>>,
    unavailable: Option<String>,
    writes: usize,
    snapshot_path: Option<PathBuf>,
}

impl HostState {
    fn check_available(&self) -> Result<(), HostError> {
        match &self.unavailable {
            Some(reason) => Err(HostError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn emit(&mut self, event: HostEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn item_ids(&self) -> Vec<ItemId> {
        self.scene.items.iter().map(|item| item.id.clone()).collect()
    }

    fn persist(&self) -> Result<(), HostError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.scene)?)?;
        Ok(())
    }
}

/// Self-contained tabletop host keeping the scene in memory.
///
/// Clones share the same scene. Optionally the scene is mirrored to a JSON
/// snapshot file after every change.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    // Opens (or starts) a scene persisted at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let scene = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            SceneSnapshot::default()
        };
        log::info!("Opened scene snapshot {}", path.display());
        Ok(Self {
            state: Arc::new(Mutex::new(HostState {
                scene,
                snapshot_path: Some(path.to_path_buf()),
                ..HostState::default()
            })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<HostEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock().subscribers.push(sender);
        receiver
    }

    /// Makes every bridge call fail with `reason` until cleared with `None`.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.lock().unavailable = reason.map(str::to_string);
    }

    // Number of successful metadata writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn items(&self) -> Vec<HostItem> {
        self.lock().scene.items.clone()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.lock().item_ids()
    }

    pub fn item_name(&self, id: &ItemId) -> Option<String> {
        self.lock()
            .scene
            .items
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.name.clone())
    }

    pub fn current_selection(&self) -> Vec<ItemId> {
        self.lock().scene.selection.clone()
    }

    pub fn add_item(&self, name: impl Into<String>) -> ItemId {
        let id = ItemId::new(Uuid::new_v4().to_string());
        self.insert_item(id.clone(), name, Metadata::new());
        id
    }

    pub fn insert_item(&self, id: ItemId, name: impl Into<String>, metadata: Metadata) {
        let mut state = self.lock();
        state.scene.items.push(HostItem {
            id,
            name: name.into(),
            metadata,
        });
        let ids = state.item_ids();
        state.emit(HostEvent::ItemsChanged(ids));
        if let Err(e) = state.persist() {
            log::warn!("Failed to persist scene snapshot: {}", e);
        }
    }

    /// Deletes an item. A selected item also drops out of the selection.
    pub fn remove_item(&self, id: &ItemId) -> bool {
        let mut state = self.lock();
        let before = state.scene.items.len();
        state.scene.items.retain(|item| &item.id != id);
        if state.scene.items.len() == before {
            return false;
        }
        let ids = state.item_ids();
        state.emit(HostEvent::ItemsChanged(ids));

        if state.scene.selection.contains(id) {
            state.scene.selection.retain(|selected| selected != id);
            let selection = state.scene.selection.clone();
            state.emit(HostEvent::SelectionChanged(selection));
        }
        if let Err(e) = state.persist() {
            log::warn!("Failed to persist scene snapshot: {}", e);
        }
        true
    }

    pub fn select(&self, ids: Vec<ItemId>) {
        let mut state = self.lock();
        state.scene.selection = ids.clone();
        state.emit(HostEvent::SelectionChanged(ids));
    }

    // Moves the selection to the next item, wrapping to "nothing selected" after the last one.
    pub fn cycle_selection(&self) -> Option<ItemId> {
        let next = {
            let state = self.lock();
            let ids = state.item_ids();
            match state.scene.selection.first() {
                None => ids.first().cloned(),
                Some(current) => ids
                    .iter()
                    .position(|id| id == current)
                    .and_then(|index| ids.get(index + 1))
                    .cloned(),
            }
        };
        self.select(next.iter().cloned().collect());
        next
    }
}

#[async_trait]
impl MetadataHost for InMemoryHost {
    async fn scene_metadata(&self) -> Result<Metadata, HostError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state.scene.metadata.clone())
    }

    async fn set_scene_metadata(&self, metadata: Metadata) -> Result<(), HostError> {
        let mut state = self.lock();
        state.check_available()?;
        state.scene.metadata = metadata;
        state.writes += 1;
        state.persist()
    }

    async fn item_metadata(&self, id: &ItemId) -> Result<Option<Metadata>, HostError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state
            .scene
            .items
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.metadata.clone()))
    }

    async fn set_item_metadata(&self, id: &ItemId, metadata: Metadata) -> Result<(), HostError> {
        let mut state = self.lock();
        state.check_available()?;
        let item = state
            .scene
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| HostError::ItemNotFound(id.clone()))?;
        item.metadata = metadata;
        state.writes += 1;
        state.persist()
    }

    async fn selection(&self) -> Result<Vec<ItemId>, HostError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state.scene.selection.clone())
    }
}
