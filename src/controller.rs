// /controller.rs
use crate::form::{Form, FormView};
use crate::record::CharacterRecord;
use crate::schema::FieldSchema;
use crate::session::{Session, StorageMode};
use crate::settings::Variant;
use crate::status::{StatusLine, StatusTicket};
use crate::storage::{HostEvent, ItemId, SheetBackend, Slot};

use std::time::Duration;
use tokio::sync::mpsc;

pub const SAVED_LOCAL: &str = "Saved successfully";
pub const SAVED_SCENE: &str = "Saved to scene";
pub const SAVED_TOKEN: &str = "Saved to token";
pub const NO_TOKEN_SELECTED: &str = "No token selected";
pub const ERROR_SAVING: &str = "Error saving";
pub const ERROR_LOADING: &str = "Error loading";

/// Everything that can happen to a sheet. Routed to its handler by
/// [`SheetController::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetEvent {
    Input { field: String, value: String },
    Save,
    ToggleMode,
    SetMode(StorageMode),
    SelectionChanged(Vec<ItemId>),
    ItemsChanged(Vec<ItemId>),
    StatusExpired(StatusTicket),
    Reload,
}

impl From<HostEvent> for SheetEvent {
    fn from(event: HostEvent) -> Self {
        match event {
            HostEvent::SelectionChanged(selection) => SheetEvent::SelectionChanged(selection),
            HostEvent::ItemsChanged(items) => SheetEvent::ItemsChanged(items),
        }
    }
}

/// Owns the form, its session and the persistence backend.
///
/// Handlers take `&mut self`, so a single event loop driving the controller
/// runs them one after another: a reload triggered by the host always
/// starts after a pending save has settled.
pub struct SheetController<B: SheetBackend, V: FormView> {
    form: Form<V>,
    session: Session,
    backend: B,
    status: StatusLine,
    status_timeout: Duration,
    events: mpsc::UnboundedSender<SheetEvent>,
}

impl<B: SheetBackend, V: FormView> SheetController<B, V> {
    /// Builds a controller and the receiving end of its own event queue
    /// (status expiry is delivered through it).
    pub fn new(
        schema: FieldSchema,
        view: V,
        backend: B,
        variant: Variant,
        status_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SheetEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            form: Form::new(schema, view),
            session: Session::new(variant),
            backend,
            status: StatusLine::new(),
            status_timeout,
            events,
        };
        (controller, receiver)
    }

    pub fn form(&self) -> &Form<V> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form<V> {
        &mut self.form
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn status(&self) -> Option<&str> {
        self.status.message()
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<SheetEvent> {
        self.events.clone()
    }

    pub fn collect(&self) -> CharacterRecord {
        self.form.collect()
    }

    /// Called once the persistence side is reachable. Picks up the initial
    /// selection (integrated variant) and loads the active slot.
    pub async fn ready(&mut self, initial_selection: Vec<ItemId>) {
        self.session.mark_ready();
        log::info!("Sheet ready ({} variant)", self.session.variant());
        if self.session.is_integrated() {
            self.session.track_selection(&initial_selection);
        }
        self.reload().await;
    }

    pub async fn dispatch(&mut self, event: SheetEvent) {
        match event {
            SheetEvent::StatusExpired(ticket) => self.on_status_expired(ticket),
            _ if !self.session.is_ready() => {
                log::debug!("Dropping {:?}, sheet is not ready", event);
            }
            SheetEvent::Input { field, value } => self.on_input(&field, &value),
            SheetEvent::Save => self.on_save().await,
            SheetEvent::ToggleMode => {
                let mode = self.session.mode().toggled();
                self.on_mode_change(mode).await
            }
            SheetEvent::SetMode(mode) => self.on_mode_change(mode).await,
            SheetEvent::SelectionChanged(selection) => self.on_selection_change(selection).await,
            SheetEvent::ItemsChanged(items) => self.on_items_change(items).await,
            SheetEvent::Reload => self.reload().await,
        }
    }

    pub fn on_input(&mut self, field: &str, value: &str) {
        self.form.input(field, value);
    }

    pub async fn on_save(&mut self) {
        if !self.session.is_ready() {
            return;
        }
        let Some(slot) = self.session.active_slot() else {
            log::info!("Save rejected, no token selected");
            self.show_status(NO_TOKEN_SELECTED);
            return;
        };

        let record = self.form.collect();
        let result = self.backend.save(&slot, &record).await;

        match result {
            Ok(()) => {
                log::info!("Saved sheet to {}", slot);
                self.show_status(match slot {
                    Slot::Local => SAVED_LOCAL,
                    Slot::Scene => SAVED_SCENE,
                    Slot::Token(_) => SAVED_TOKEN,
                });
            }
            Err(e) => {
                log::error!("Failed to save sheet to {}: {}", slot, e);
                self.show_status(ERROR_SAVING);
            }
        }
    }

    /// Switches the storage mode and reloads from the new slot. Unsaved edits
    /// are dropped, never written to the previous slot.
    pub async fn on_mode_change(&mut self, mode: StorageMode) {
        if !self.session.is_integrated() {
            log::debug!("Storage mode has no effect on the standalone sheet");
            return;
        }
        self.session.set_mode(mode);
        log::debug!("Storage mode set to {}", mode);
        self.reload().await;
    }

    pub async fn on_selection_change(&mut self, selection: Vec<ItemId>) {
        if !self.session.is_integrated() {
            return;
        }
        self.session.track_selection(&selection);
        log::debug!("Tracking token {:?}", self.session.selected());
        if self.session.mode() == StorageMode::Token {
            self.reload().await;
        }
    }

    pub async fn on_items_change(&mut self, existing: Vec<ItemId>) {
        if !self.session.is_integrated() {
            return;
        }
        if self.session.retain_tracked(&existing) {
            log::info!("Tracked token was removed from the scene");
            if self.session.mode() == StorageMode::Token {
                self.reload().await;
            }
        }
    }

    pub fn on_status_expired(&mut self, ticket: StatusTicket) {
        self.status.expire(ticket);
    }

    /// Loads the active slot into the form. Without a slot (token mode,
    /// nothing selected) the form is emptied. A failed load keeps the form as is.
    pub async fn reload(&mut self) {
        let schema = self.form.schema().clone();
        let Some(slot) = self.session.active_slot() else {
            self.form.apply(&CharacterRecord::empty(&schema));
            return;
        };
        match self.backend.load(&slot, &schema).await {
            Ok(record) => {
                log::debug!("Loaded sheet from {}", slot);
                self.form.apply(&record);
            }
            Err(e) => {
                log::error!("Failed to load sheet from {}: {}", slot, e);
                self.show_status(ERROR_LOADING);
            }
        }
    }

    // Shows `message` and schedules its expiry on the controller's own queue.
    fn show_status(&mut self, message: &str) {
        let ticket = self.status.show(message);
        let events = self.events.clone();
        let timeout = self.status_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = events.send(SheetEvent::StatusExpired(ticket));
        });
    }
}
