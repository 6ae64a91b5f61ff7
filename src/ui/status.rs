use ratatui::Frame;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.as_ref().map_or_else(
        || "[scratch]".to_string(),
        |p| {
            p.file_name()
                .map_or_else(|| p.display().to_string(), |s| s.to_string_lossy().to_string())
        },
    );
    let dirty = if model.buffer.is_dirty() { " +" } else { "" };
    let cursor = model.buffer.cursor();

    let note = model.status_note.as_ref().map_or_else(
        || {
            model
                .last_outcome
                .map_or_else(String::new, |o| format!("  [{o}]"))
        },
        |n| format!("  {n}"),
    );

    let ws_indicator = if model.show_whitespace { " [ws]" } else { "" };
    let status = format!(
        " {filename}{dirty}  {cursor}{note}{ws_indicator}  ^S:save ^Z:undo ^W:whitespace ^Q:quit"
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}
