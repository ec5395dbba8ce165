// /ui/view.rs
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{buffer::Buffer, layout::Rect};

use super::component::Component;
use super::sheet::draw_sheet;
use crate::app::{Action, HostAction};
use crate::context::Context;
use crate::controller::SheetEvent;
use crate::form::FormView;
use crate::schema::{ABILITIES, FieldSchema};

// One labelled input of the terminal sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: &'static str,
    pub label: String,
    pub value: String,
    pub read_only: bool,
    pub multiline: bool,
}

/// Terminal rendition of the sheet: one control per schema field plus the
/// keyboard focus.
#[derive(Debug, Clone)]
pub struct TuiView {
    controls: Vec<Control>,
    focus: usize,
}

impl TuiView {
    pub fn for_schema(schema: &FieldSchema) -> Self {
        let controls = schema
            .fields()
            .iter()
            .copied()
            .map(|id| Control {
                id,
                label: label_for(id),
                value: String::new(),
                read_only: schema.is_derived(id),
                multiline: id.ends_with("-text"),
            })
            .collect::<Vec<_>>();
        let focus = controls
            .iter()
            .position(|control| !control.read_only)
            .unwrap_or(0);
        Self { controls, focus }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, id: &str) -> Option<&Control> {
        self.controls.iter().find(|control| control.id == id)
    }

    pub fn focused(&self) -> Option<&Control> {
        self.controls.get(self.focus)
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.focused().is_some_and(|control| control.id == id)
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(self.controls.len().saturating_sub(1));
    }

    // Steps through the controls, skipping read-only ones.
    fn move_focus(&mut self, step: usize) {
        let len = self.controls.len();
        if len == 0 {
            return;
        }
        let mut next = self.focus;
        for _ in 0..len {
            next = (next + step) % len;
            if !self.controls[next].read_only {
                self.focus = next;
                return;
            }
        }
    }

    // New value of the focused control after `edit`, as an input event.
    fn edit_focused(&self, edit: impl FnOnce(&mut String)) -> Option<Action> {
        let control = self.focused().filter(|control| !control.read_only)?;
        let mut value = control.value.clone();
        edit(&mut value);
        Some(Action::Sheet(SheetEvent::Input {
            field: control.id.to_string(),
            value,
        }))
    }
}

impl FormView for TuiView {
    fn read(&self, id: &str) -> Option<String> {
        self.control(id).map(|control| control.value.clone())
    }

    fn write(&mut self, id: &str, value: &str) -> bool {
        match self.controls.iter_mut().find(|control| control.id == id) {
            Some(control) => {
                value.clone_into(&mut control.value);
                true
            }
            None => false,
        }
    }
}

impl Component for TuiView {
    fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('s') => Some(Action::Sheet(SheetEvent::Save)),
                KeyCode::Char('t') => Some(Action::Sheet(SheetEvent::ToggleMode)),
                KeyCode::Char('r') => Some(Action::Sheet(SheetEvent::Reload)),
                KeyCode::Char('n') => Some(Action::Host(HostAction::AddToken)),
                KeyCode::Char('p') => Some(Action::Host(HostAction::CycleSelection)),
                KeyCode::Char('d') => Some(Action::Host(HostAction::DeleteSelected)),
                KeyCode::Char('u') => self.edit_focused(String::clear),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                None
            }
            KeyCode::Enter => {
                if self.focused().is_some_and(|control| control.multiline) {
                    self.edit_focused(|value| value.push('\n'))
                } else {
                    self.focus_next();
                    None
                }
            }
            KeyCode::Backspace => self.edit_focused(|value| {
                value.pop();
            }),
            KeyCode::Char(c) => self.edit_focused(|value| value.push(c)),
            _ => None,
        }
    }

    fn render(&self, area: Rect, buffer: &mut Buffer, context: &Context) {
        draw_sheet(buffer, self, area, context);
    }
}

/// Human label for a schema field id.
pub fn label_for(id: &str) -> String {
    if ABILITIES.iter().any(|ability| *ability == id) {
        return id.to_uppercase();
    }
    if id.ends_with("_dice") {
        return "Dice".to_string();
    }
    let base = id.strip_suffix("-text").unwrap_or(id);
    let words = base.replace(['_', '-'], " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
