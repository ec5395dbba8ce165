use crate::storage::ItemId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SheetError>;

// Enum for handling the sheet-level errors.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Host error: {0}")]
    Host(#[from] HostError), // Errors raised by the tabletop metadata bridge.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error), // Errors related to data serialization.

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error), // Input/output errors.

    #[error("Slot {0} is not served by this backend")]
    UnsupportedSlot(String),

    #[error("Could not locate the home directory")]
    NoHomeDir,

    #[error("Logger error: {0}")]
    Logger(String),
}

impl From<log::SetLoggerError> for SheetError {
    fn from(error: log::SetLoggerError) -> Self {
        SheetError::Logger(error.to_string())
    }
}

// Errors coming back from the virtual tabletop host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host unavailable: {0}")]
    Unavailable(String),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Scene snapshot error: {0}")]
    Snapshot(String),
}

impl From<std::io::Error> for HostError {
    fn from(error: std::io::Error) -> Self {
        HostError::Snapshot(error.to_string())
    }
}

impl From<serde_json::Error> for HostError {
    fn from(error: serde_json::Error) -> Self {
        HostError::Snapshot(error.to_string())
    }
}
