use ratatui::Frame;
use ratatui::layout::Position as ScreenPosition;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::app::Model;

use super::{GUTTER_WIDTH, status};

/// Render the complete UI: buffer with gutter, then the status bar.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    render_buffer(model, frame, chunks[0]);
    status::render_status_bar(model, frame, chunks[1]);
    place_cursor(model, frame, chunks[0]);
}

fn render_buffer(model: &Model, frame: &mut Frame, area: Rect) {
    let range = model.viewport.visible_range();
    let mut lines: Vec<Line> = Vec::with_capacity(range.len());

    for line_idx in range {
        let text = model.buffer.line_at(line_idx).unwrap_or_default();
        let gutter = format!("{:>4} ", line_idx + 1);
        let mut spans = vec![Span::styled(gutter, Style::default().fg(Color::DarkGray))];
        if model.show_whitespace {
            spans.extend(whitespace_spans(&text));
        } else {
            spans.push(Span::raw(text));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

/// Split a line into spans with whitespace runs rendered as dim markers.
fn whitespace_spans(text: &str) -> Vec<Span<'static>> {
    let marker_style = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_is_ws = false;

    for ch in text.chars() {
        let is_ws = ch.is_whitespace();
        if is_ws != run_is_ws && !run.is_empty() {
            spans.push(styled_run(run, run_is_ws, marker_style));
            run = String::new();
        }
        run_is_ws = is_ws;
        run.push(match ch {
            ' ' => '·',
            '\t' => '→',
            c if c.is_whitespace() => '·',
            c => c,
        });
    }
    if !run.is_empty() {
        spans.push(styled_run(run, run_is_ws, marker_style));
    }
    spans
}

fn styled_run(run: String, is_ws: bool, marker_style: Style) -> Span<'static> {
    if is_ws {
        Span::styled(run, marker_style)
    } else {
        Span::raw(run)
    }
}

/// Put the terminal cursor on the buffer cursor, if it is on screen.
fn place_cursor(model: &Model, frame: &mut Frame, area: Rect) {
    let cursor = model.buffer.cursor();
    if !model.viewport.visible_range().contains(&cursor.line) {
        return;
    }
    let text = model.buffer.line_at(cursor.line).unwrap_or_default();
    let col = cursor.col.min(text.len());
    let col_width = text[..col].width().min(usize::from(u16::MAX));
    #[allow(clippy::cast_possible_truncation)]
    let x = (area.x + GUTTER_WIDTH).saturating_add(col_width as u16);
    #[allow(clippy::cast_possible_truncation)]
    let y = area.y + (cursor.line - model.viewport.offset()) as u16;
    if x < area.x + area.width && y < area.y + area.height {
        frame.set_cursor_position(ScreenPosition::new(x, y));
    }
}
