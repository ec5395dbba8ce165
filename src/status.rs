// /status.rs
use std::time::Duration;

pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_millis(1200);

// Identifies one display of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusTicket(u64);

/// Transient one-line status display.
///
/// Each message gets a fresh ticket; expiring a ticket only clears the line
/// when that ticket is still the one on display.
#[derive(Debug, Default)]
pub struct StatusLine {
    current: Option<(StatusTicket, String)>,
    issued: u64,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>) -> StatusTicket {
        self.issued += 1;
        let ticket = StatusTicket(self.issued);
        self.current = Some((ticket, message.into()));
        ticket
    }

    pub fn expire(&mut self, ticket: StatusTicket) -> bool {
        match &self.current {
            Some((current, _)) if *current == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, message)| message.as_str())
    }
}
