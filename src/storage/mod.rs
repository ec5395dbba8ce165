// /storage/mod.rs
mod host;
mod local;
mod remote;

pub use self::host::*;
pub use self::local::*;
pub use self::remote::*;

use crate::error::Result;
use crate::record::CharacterRecord;
use crate::schema::FieldSchema;

use async_trait::async_trait;
use std::fmt;

/// Addressable location holding one character record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Local,
    Scene,
    Token(ItemId),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Local => write!(f, "local"),
            Slot::Scene => write!(f, "scene"),
            Slot::Token(id) => write!(f, "token {}", id),
        }
    }
}

/// Where the sheet is read from and written to.
///
/// `load` always yields a record shaped by `schema`; an absent slot loads as
/// the empty record.
#[async_trait]
pub trait SheetBackend: Send + Sync {
    async fn load(&self, slot: &Slot, schema: &FieldSchema) -> Result<CharacterRecord>;
    async fn save(&self, slot: &Slot, record: &CharacterRecord) -> Result<()>;
}
