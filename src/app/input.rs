use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, Message, Model};
use crate::host::MoveCommand;
use crate::ui::GUTTER_WIDTH;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => Some(Message::Resize(*w, *h)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent) -> Option<Message> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('q' | 'c') => Some(Message::Quit),
                KeyCode::Char('s') => Some(Message::Save),
                KeyCode::Char('z') => Some(Message::Undo),
                KeyCode::Char('w') => Some(Message::ToggleWhitespace),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
                Some(Message::Insert(c))
            }
            KeyCode::Enter => Some(Message::Newline),
            KeyCode::Backspace => Some(Message::Backspace),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Up => Some(Message::Move(MoveCommand::Up)),
            KeyCode::Down => Some(Message::Move(MoveCommand::Down)),
            KeyCode::Left => Some(Message::Move(MoveCommand::Left)),
            KeyCode::Right => Some(Message::Move(MoveCommand::Right)),
            KeyCode::Home => Some(Message::Home),
            KeyCode::End => Some(Message::End),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Esc => Some(Message::Quit),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let rel_row = mouse.row as usize;
                if rel_row >= model.viewport.height() as usize {
                    // Status bar row
                    return None;
                }
                let max_line = model.buffer.line_count().saturating_sub(1);
                let line = (model.viewport.offset() + rel_row).min(max_line);
                let display_col = mouse.column.saturating_sub(GUTTER_WIDTH) as usize;
                let text = model.buffer.line_at(line).unwrap_or_default();
                let col = display_col_to_byte(&text, display_col);
                Some(Message::Click { line, col })
            }
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(3)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(3)),
            _ => None,
        }
    }
}

/// Map a display column to a byte offset within `text`, snapping to the
/// nearest character boundary at or past the column.
fn display_col_to_byte(text: &str, display_col: usize) -> usize {
    let mut width_acc = 0;
    for (byte_idx, ch) in text.char_indices() {
        if width_acc >= display_col {
            return byte_idx;
        }
        width_acc += ch.width().unwrap_or(0);
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_col_to_byte_ascii() {
        assert_eq!(display_col_to_byte("hello", 0), 0);
        assert_eq!(display_col_to_byte("hello", 3), 3);
        assert_eq!(display_col_to_byte("hello", 99), 5);
    }

    #[test]
    fn test_display_col_to_byte_wide_chars() {
        // Each ideograph is 3 bytes and 2 columns wide.
        assert_eq!(display_col_to_byte("日本", 2), 3);
        assert_eq!(display_col_to_byte("日本", 4), 6);
    }
}
