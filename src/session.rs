// /session.rs
use crate::settings::Variant;
use crate::storage::{ItemId, Slot};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

// Which tabletop slot the sheet targets in the integrated variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageMode {
    #[default]
    Scene,
    Token,
}

impl StorageMode {
    pub fn toggled(self) -> Self {
        match self {
            StorageMode::Scene => StorageMode::Token,
            StorageMode::Token => StorageMode::Scene,
        }
    }
}

/// Mutable state shared by every sheet handler: variant, storage mode, the
/// tracked token and the ready flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    variant: Variant,
    mode: StorageMode,
    selected: Option<ItemId>,
    ready: bool,
}

impl Session {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            mode: StorageMode::default(),
            selected: None,
            ready: false,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn selected(&self) -> Option<&ItemId> {
        self.selected.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_integrated(&self) -> bool {
        self.variant == Variant::Integrated
    }

    /// Slot that save and load currently address. `None` in token mode with
    /// nothing selected.
    pub fn active_slot(&self) -> Option<Slot> {
        match (self.variant, self.mode) {
            (Variant::Standalone, _) => Some(Slot::Local),
            (Variant::Integrated, StorageMode::Scene) => Some(Slot::Scene),
            (Variant::Integrated, StorageMode::Token) => self.selected.clone().map(Slot::Token),
        }
    }

    // The "no token selected" warning stays up for as long as this holds.
    pub fn warning_visible(&self) -> bool {
        self.is_integrated() && self.mode == StorageMode::Token && self.selected.is_none()
    }

    pub fn set_mode(&mut self, mode: StorageMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    // Tracks the first selected item, or nothing for an empty selection.
    pub fn track_selection(&mut self, selection: &[ItemId]) -> bool {
        let next = selection.first().cloned();
        let changed = self.selected != next;
        self.selected = next;
        changed
    }

    /// Forgets the tracked token when it is not among `existing`. Returns true
    /// when the token was dropped.
    pub fn retain_tracked(&mut self, existing: &[ItemId]) -> bool {
        match &self.selected {
            Some(id) if !existing.contains(id) => {
                self.selected = None;
                true
            }
            _ => false,
        }
    }
}
