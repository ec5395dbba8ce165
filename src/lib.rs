pub mod app;
pub mod context;
pub mod controller;
pub mod derived;
pub mod error;
pub mod form;
pub mod logging;
pub mod record;
pub mod schema;
pub mod session;
pub mod settings;
pub mod status;
pub mod storage;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use controller::{SheetController, SheetEvent};
pub use error::{HostError, SheetError};
pub use form::{Form, FormView, MemoryView};
pub use record::CharacterRecord;
pub use schema::{FieldSchema, META_KEY};
pub use session::{Session, StorageMode};
pub use settings::{Settings, Variant};
pub use storage::{
    FileSlotStore, HostEvent, InMemoryHost, ItemId, LocalBackend, MemorySlotStore, MetadataHost,
    RemoteBackend, SheetBackend, Slot, SlotStore,
};
