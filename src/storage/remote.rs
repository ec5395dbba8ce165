// /storage/remote.rs
use super::{ItemId, Metadata, MetadataHost, SheetBackend, Slot};
use crate::error::{HostError, Result, SheetError};
use crate::record::CharacterRecord;
use crate::schema::{FieldSchema, META_KEY};

use async_trait::async_trait;

/// Integrated persistence: the record lives under one namespaced key in the
/// scene's metadata or in the selected token's metadata.
#[derive(Debug, Clone)]
pub struct RemoteBackend<H: MetadataHost> {
    host: H,
    key: String,
}

impl<H: MetadataHost> RemoteBackend<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            key: META_KEY.to_string(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn record_from(&self, schema: &FieldSchema, metadata: Option<&Metadata>) -> CharacterRecord {
        match metadata.and_then(|metadata| metadata.get(&self.key)) {
            Some(value) if value.is_object() => CharacterRecord::from_value(schema, value),
            Some(_) => {
                log::warn!("Ignoring non-object sheet stored under {}", self.key);
                CharacterRecord::empty(schema)
            }
            None => CharacterRecord::empty(schema),
        }
    }

    pub async fn load_scene(&self, schema: &FieldSchema) -> Result<CharacterRecord> {
        let metadata = self.host.scene_metadata().await?;
        Ok(self.record_from(schema, Some(&metadata)))
    }

    // Replaces only the sheet key; every other scene metadata key is written back as read.
    pub async fn save_scene(&self, record: &CharacterRecord) -> Result<()> {
        let mut metadata = self.host.scene_metadata().await?;
        metadata.insert(self.key.clone(), record.to_value()?);
        self.host.set_scene_metadata(metadata).await?;
        log::debug!("Saved sheet to scene metadata");
        Ok(())
    }

    pub async fn load_token(&self, id: &ItemId, schema: &FieldSchema) -> Result<CharacterRecord> {
        let metadata = self.host.item_metadata(id).await?;
        if metadata.is_none() {
            log::debug!("Token {} is gone, loading an empty sheet", id);
        }
        Ok(self.record_from(schema, metadata.as_ref()))
    }

    pub async fn save_token(&self, id: &ItemId, record: &CharacterRecord) -> Result<()> {
        let mut metadata = self
            .host
            .item_metadata(id)
            .await?
            .ok_or_else(|| HostError::ItemNotFound(id.clone()))?;
        metadata.insert(self.key.clone(), record.to_value()?);
        self.host.set_item_metadata(id, metadata).await?;
        log::debug!("Saved sheet to token {}", id);
        Ok(())
    }
}

#[async_trait]
impl<H: MetadataHost> SheetBackend for RemoteBackend<H> {
    async fn load(&self, slot: &Slot, schema: &FieldSchema) -> Result<CharacterRecord> {
        match slot {
            Slot::Scene => self.load_scene(schema).await,
            Slot::Token(id) => self.load_token(id, schema).await,
            Slot::Local => Err(SheetError::UnsupportedSlot(slot.to_string())),
        }
    }

    async fn save(&self, slot: &Slot, record: &CharacterRecord) -> Result<()> {
        match slot {
            Slot::Scene => self.save_scene(record).await,
            Slot::Token(id) => self.save_token(id, record).await,
            Slot::Local => Err(SheetError::UnsupportedSlot(slot.to_string())),
        }
    }
}
