// Import necessary libraries and modules for file I/O and serialization.
use crate::error::{Result, SheetError};
use crate::schema::FieldSchema;
use crate::status::DEFAULT_STATUS_TIMEOUT;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum_macros::{Display, EnumString};

// Which persistence flavour the sheet runs with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Variant {
    #[default]
    Standalone, // Local slot file only.
    Integrated, // Scene and token metadata on the tabletop host.
}

// Define a structure to hold application settings with serialization and deserialization capabilities.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub variant: Variant,
    pub status_timeout_ms: u64, // How long a status message stays on screen.
    pub dice_badges: Option<bool>, // Overrides whether the `<attr>_dice` badges are derived.
    pub storage_path: Option<PathBuf>, // Overrides the local slot store file.
    pub scene_path: Option<PathBuf>,   // Overrides the tabletop scene snapshot file.
    pub debug_mode: bool,              // Flag to enable or disable debug logging.
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            variant: Variant::Standalone,
            status_timeout_ms: DEFAULT_STATUS_TIMEOUT.as_millis() as u64,
            dice_badges: None,
            storage_path: None,
            scene_path: None,
            debug_mode: false,
        }
    }
}

/// Base directory for settings, logs and local data: `~/woin_sheet/data`.
pub fn data_dir() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or(SheetError::NoHomeDir)?;
    Ok(dirs.home_dir().join("woin_sheet").join("data"))
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // Load settings from the default file path.
    pub fn load() -> Result<Self> {
        Self::load_settings_from_file(data_dir()?.join("settings.json"))
    }

    // Save current settings to the default file path.
    pub fn save(&self) -> Result<()> {
        self.save_to_file(data_dir()?.join("settings.json"))
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?; // Read settings from file.
        let settings = serde_json::from_str(&data)?; // Deserialize JSON data into settings.
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?; // Serialize settings into pretty JSON format.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?; // Create or overwrite the file.
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Field schema of the configured variant, with the badge override applied.
    pub fn schema(&self) -> FieldSchema {
        let schema = FieldSchema::for_variant(self.variant);
        match self.dice_badges {
            Some(enabled) => schema.with_dice_badges(enabled),
            None => schema,
        }
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }

    pub fn storage_path(&self) -> Result<PathBuf> {
        match &self.storage_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("local_storage.json")),
        }
    }

    pub fn scene_path(&self) -> Result<PathBuf> {
        match &self.scene_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("scene.json")),
        }
    }
}
