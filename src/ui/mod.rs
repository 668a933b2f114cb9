//! UI rendering.
//!
//! Single conversation screen: transcript on top, one status line, input
//! box at the bottom. The transcript is pinned to its bottom edge while
//! replies stream in.

mod theme;

pub use theme::{COLOR_ACTIVE, COLOR_AGENT, COLOR_BORDER, COLOR_DIM, COLOR_ERROR};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::transcript::{MessageUnit, Role};

/// Trailing cursor shown on the unit currently receiving text.
const STREAM_CURSOR: &str = "▌";

/// Render the UI.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Transcript
            Constraint::Length(1), // Status line
            Constraint::Length(3), // Input box
        ])
        .split(frame.area());

    render_transcript(frame, app, chunks[0]);
    render_status(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
}

fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let lines = transcript_lines(app.transcript.units());

    // Pin to the bottom: scroll past everything that does not fit.
    let total: usize = lines
        .iter()
        .map(|line| wrapped_height(line.width(), area.width))
        .sum();
    let offset = total
        .saturating_sub(area.height as usize)
        .min(u16::MAX as usize) as u16;

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    frame.render_widget(paragraph, area);
}

/// Build display lines for the transcript, one blank line between units.
fn transcript_lines(units: &[MessageUnit]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for (i, unit) in units.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        match unit.role {
            Role::User => {
                // Echo format: `> <text>`, dimmed.
                for part in unit.content.split('\n') {
                    lines.push(Line::from(Span::styled(
                        format!("> {part}"),
                        Style::default().fg(COLOR_DIM),
                    )));
                }
            }
            Role::Agent => {
                // Payload-internal newlines become line breaks within the
                // same unit.
                let parts: Vec<&str> = unit.content.split('\n').collect();
                let last = parts.len() - 1;
                for (j, part) in parts.into_iter().enumerate() {
                    let mut spans = vec![Span::styled(part, Style::default().fg(COLOR_AGENT))];
                    if unit.is_streaming && j == last {
                        spans.push(Span::styled(
                            STREAM_CURSOR,
                            Style::default().fg(COLOR_ACTIVE),
                        ));
                    }
                    lines.push(Line::from(spans));
                }
            }
        }
    }
    lines
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(error) = &app.status {
        Line::from(Span::styled(
            format!("✗ {error}"),
            Style::default().fg(COLOR_ERROR),
        ))
    } else if app.is_streaming() {
        Line::from(Span::styled(
            "● streaming…",
            Style::default().fg(COLOR_ACTIVE),
        ))
    } else {
        Line::from(Span::styled(
            "Enter send · Esc quit",
            Style::default().fg(COLOR_DIM),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(" message ");
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(app.input.as_str()).block(block), area);

    // Cursor after the typed text, clamped to the box.
    let cursor_x = inner
        .x
        .saturating_add(app.input.chars().count() as u16)
        .min(inner.right().saturating_sub(1));
    frame.set_cursor_position((cursor_x, inner.y));
}

/// Estimate how many terminal rows a line occupies once wrapped.
fn wrapped_height(line_width: usize, area_width: u16) -> usize {
    if area_width == 0 {
        return 1;
    }
    line_width.div_ceil(area_width as usize).max(1)
}
