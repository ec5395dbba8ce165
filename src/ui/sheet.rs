// /ui/sheet.rs
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use super::view::{Control, TuiView};
use crate::context::Context;
use crate::schema::ABILITIES;
use crate::session::StorageMode;

use strum::IntoEnumIterator;

pub const MIN_WIDTH: u16 = 90;
pub const MIN_HEIGHT: u16 = 32;

const IDENTITY: [&str; 5] = ["name", "species", "career", "descriptor", "grade"];

pub fn draw_sheet(buffer: &mut Buffer, view: &TuiView, area: Rect, context: &Context) {
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        Paragraph::new("Terminal too small. Please resize.")
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .render(area, buffer);
        return;
    }

    // Layout for the different sections of the sheet.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(14),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(buffer, context, chunks[0]);
    draw_identity(buffer, view, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);
    draw_abilities(buffer, view, body[0]);
    draw_combat(buffer, view, body[1]);

    draw_notes(buffer, view, chunks[3]);
    draw_warning(buffer, context, chunks[4]);
    draw_status(buffer, context, chunks[5]);
    draw_key_hints(buffer, context, chunks[6]);
}

fn label_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn value_style(view: &TuiView, control: &Control) -> Style {
    if view.is_focused(control.id) {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else if control.read_only {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    }
}

// "Label: value" on one line, with the focus highlight on the value.
fn field_line<'a>(view: &TuiView, control: &'a Control) -> Line<'a> {
    let value = if view.is_focused(control.id) {
        format!("{}▏", control.value)
    } else {
        control.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", control.label), label_style()),
        Span::styled(value, value_style(view, control)),
    ])
}

fn draw_header(buffer: &mut Buffer, context: &Context, area: Rect) {
    let mut spans = vec![Span::styled(
        format!("W.O.I.N. Character Sheet v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Green),
    )];

    if context.session.is_integrated() {
        spans.push(Span::raw(" | "));
        for mode in StorageMode::iter() {
            let selected = context.session.mode() == mode;
            let marker = if selected { "(•)" } else { "( )" };
            let style = if selected {
                label_style()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!("{} {} ", marker, mode), style));
        }
        if let Some(id) = context.session.selected() {
            let name = context.token_name.clone().unwrap_or_else(|| id.to_string());
            spans.push(Span::raw("| Token: "));
            spans.push(Span::styled(name, Style::default().fg(Color::Cyan)));
        }
    } else {
        spans.push(Span::styled(" | local", Style::default().fg(Color::DarkGray)));
    }

    Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .alignment(Alignment::Center)
        .render(area, buffer);
}

fn draw_identity(buffer: &mut Buffer, view: &TuiView, area: Rect) {
    let controls: Vec<&Control> = IDENTITY
        .iter()
        .filter_map(|id| view.control(id))
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Identity ");
    let inner = block.inner(area);
    block.render(area, buffer);

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Fill(1); controls.len().max(1)])
        .split(inner);
    for (control, cell) in controls.iter().zip(cells.iter()) {
        Paragraph::new(field_line(view, control)).render(*cell, buffer);
    }
}

fn draw_abilities(buffer: &mut Buffer, view: &TuiView, area: Rect) {
    let rows: Vec<Row> = ABILITIES
        .iter()
        .filter_map(|ability| {
            let control = view.control(ability)?;
            let dice = view
                .control(&format!("{}_dice", ability))
                .map(|badge| Cell::from(badge.value.clone()).style(value_style(view, badge)))
                .unwrap_or_else(|| Cell::from(""));
            Some(Row::new(vec![
                Cell::from(control.label.clone()).style(label_style()),
                Cell::from(if view.is_focused(control.id) {
                    format!("{}▏", control.value)
                } else {
                    control.value.clone()
                })
                .style(value_style(view, control)),
                dice,
            ]))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["Attr", "Score", "Dice"])
            .style(Style::default().fg(Color::DarkGray)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Attributes "),
    );
    Widget::render(table, area, buffer);
}

// Everything that is neither identity, ability, badge nor free text.
fn draw_combat(buffer: &mut Buffer, view: &TuiView, area: Rect) {
    let controls: Vec<&Control> = view
        .controls()
        .iter()
        .filter(|control| {
            !IDENTITY.contains(&control.id)
                && !ABILITIES.contains(&control.id)
                && !control.id.ends_with("_dice")
                && !control.multiline
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Combat & Details ");
    let inner = block.inner(area);
    block.render(area, buffer);

    let per_column = usize::from(inner.height.max(1));
    let columns = controls.len().div_ceil(per_column).max(1);
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Fill(1); columns])
        .split(inner);

    for (chunk, column) in controls.chunks(per_column).zip(areas.iter()) {
        let lines: Vec<Line> = chunk
            .iter()
            .map(|control| field_line(view, control))
            .collect();
        Paragraph::new(lines).render(*column, buffer);
    }
}

fn draw_notes(buffer: &mut Buffer, view: &TuiView, area: Rect) {
    let notes: Vec<&Control> = view
        .controls()
        .iter()
        .filter(|control| control.multiline)
        .collect();
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Fill(1); notes.len().max(1)])
        .split(area);

    for (control, note_area) in notes.iter().zip(areas.iter()) {
        let focused = view.is_focused(control.id);
        let text = if focused {
            format!("{}▏", control.value)
        } else {
            control.value.clone()
        };
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(border_style)
                    .title(Span::styled(format!(" {} ", control.label), label_style())),
            )
            .render(*note_area, buffer);
    }
}

fn draw_warning(buffer: &mut Buffer, context: &Context, area: Rect) {
    if context.session.warning_visible() {
        Paragraph::new("⚠ No token selected: select a token to load or save its sheet")
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .render(area, buffer);
    }
}

fn draw_status(buffer: &mut Buffer, context: &Context, area: Rect) {
    if let Some(message) = context.status {
        Paragraph::new(message)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .render(area, buffer);
    }
}

fn draw_key_hints(buffer: &mut Buffer, context: &Context, area: Rect) {
    let hints = if context.session.is_integrated() {
        "Tab/↑↓ move | Ctrl+S save | Ctrl+T scene/token | Ctrl+N add token | Ctrl+P select next | Ctrl+D delete token | Esc quit"
    } else {
        "Tab/↑↓ move | Ctrl+S save | Ctrl+R reload | Esc quit"
    };
    Paragraph::new(hints)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .render(area, buffer);
}
