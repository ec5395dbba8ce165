// /app.rs
use crate::context::Context;
use crate::controller::{SheetController, SheetEvent};
use crate::storage::{HostEvent, InMemoryHost, MetadataHost, SheetBackend};
use crate::tui::{Tui, TuiEvent};
use crate::ui::{Component, TuiView};

use color_eyre::eyre::Result;
use crossterm::event::{KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

pub enum Action {
    Quit,
    Sheet(SheetEvent),
    Host(HostAction),
}

// Operations on the self-contained tabletop, standing in for the host's own UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    AddToken,
    CycleSelection,
    DeleteSelected,
}

pub struct App<B: SheetBackend> {
    running: bool,
    controller: SheetController<B, TuiView>,
    sheet_events: mpsc::UnboundedReceiver<SheetEvent>,

    // --- Tabletop (integrated variant only)
    host: Option<InMemoryHost>,
    host_events: Option<mpsc::UnboundedReceiver<HostEvent>>,
}

impl<B: SheetBackend> App<B> {
    pub fn new(
        controller: SheetController<B, TuiView>,
        sheet_events: mpsc::UnboundedReceiver<SheetEvent>,
    ) -> Self {
        Self {
            running: true,
            controller,
            sheet_events,
            host: None,
            host_events: None,
        }
    }

    pub fn with_host(mut self, host: InMemoryHost) -> Self {
        self.host_events = Some(host.subscribe());
        self.host = Some(host);
        self
    }

    // Asynchronous function to run the sheet until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?
            .tick_rate(4.0) // 4 ticks per second
            .frame_rate(30.0); // 30 frames per second

        tui.enter()?; // Starts the event task.

        let initial_selection = match &self.host {
            Some(host) => host.selection().await.unwrap_or_else(|e| {
                log::error!("Could not read the initial selection: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.controller.ready(initial_selection).await;

        loop {
            self.draw(&mut tui)?;

            tokio::select! {
                Some(event) = tui.next() => self.handle_tui_event(event).await,
                Some(event) = self.sheet_events.recv() => self.controller.dispatch(event).await,
                Some(event) = next_host_event(&mut self.host_events) => {
                    self.controller.dispatch(event.into()).await
                }
                else => self.quit(),
            }

            if !self.running {
                break;
            }
        }

        tui.exit()?; // stops event handler, exits raw mode, exits alternate screen
        Ok(())
    }

    fn draw(&self, tui: &mut Tui) -> Result<()> {
        let session = self.controller.session();
        let token_name = match (&self.host, session.selected()) {
            (Some(host), Some(id)) => host.item_name(id),
            _ => None,
        };
        tui.draw(|frame| {
            let context = Context {
                session,
                status: self.controller.status(),
                token_name,
            };
            self.controller
                .form()
                .view()
                .render(frame.area(), frame.buffer_mut(), &context)
        })?;
        Ok(())
    }

    async fn handle_tui_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.on_key(key_event).await
            }
            TuiEvent::Error => log::warn!("Terminal event stream reported an error"),
            TuiEvent::Key(_)
            | TuiEvent::Paste(_)
            | TuiEvent::Mouse(_)
            | TuiEvent::Init
            | TuiEvent::Tick
            | TuiEvent::Render
            | TuiEvent::FocusGained
            | TuiEvent::FocusLost
            | TuiEvent::Resize(_, _) => {}
        }
    }

    async fn on_key(&mut self, key_event: KeyEvent) {
        let action = self.controller.form_mut().view_mut().on_key(key_event);
        if let Some(action) = action {
            self.handle_action(action).await
        }
    }

    async fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.quit(),
            Action::Sheet(event) => self.controller.dispatch(event).await,
            Action::Host(host_action) => self.handle_host_action(host_action),
        }
    }

    // Host changes come back as host events, like they would from a real tabletop.
    fn handle_host_action(&mut self, action: HostAction) {
        let Some(host) = &self.host else {
            log::debug!("Ignoring {:?}, no tabletop attached", action);
            return;
        };
        match action {
            HostAction::AddToken => {
                let name = format!("Token {}", host.items().len() + 1);
                let id = host.add_item(name);
                log::info!("Added token {}", id);
            }
            HostAction::CycleSelection => {
                host.cycle_selection();
            }
            HostAction::DeleteSelected => {
                if let Some(id) = host.current_selection().first().cloned() {
                    host.remove_item(&id);
                    log::info!("Deleted token {}", id);
                }
            }
        }
    }

    fn quit(&mut self) {
        self.running = false;
    }
}

async fn next_host_event(
    receiver: &mut Option<mpsc::UnboundedReceiver<HostEvent>>,
) -> Option<HostEvent> {
    match receiver {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
