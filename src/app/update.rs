use crate::app::Model;
use crate::coordinator::IndentFollow;
use crate::host::MoveCommand;

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Type a character at the cursor
    Insert(char),
    /// Split the line at the cursor (Enter)
    Newline,
    /// Delete the character before the cursor
    Backspace,
    /// Delete the character at the cursor
    DeleteForward,
    /// Arrow-key movement, routed through the coordinator
    Move(MoveCommand),
    /// Mouse click at a buffer position
    Click { line: usize, col: usize },
    /// Jump to start of line
    Home,
    /// Jump to end of line
    End,
    /// Scroll the viewport up without moving the cursor
    ScrollUp(usize),
    /// Scroll the viewport down without moving the cursor
    ScrollDown(usize),
    /// Scroll up one page
    PageUp,
    /// Scroll down one page
    PageDown,
    /// Write the buffer back to its file
    Save,
    /// Undo the last edit step
    Undo,
    /// Toggle whitespace markers
    ToggleWhitespace,
    /// Terminal was resized
    Resize(u16, u16),
    /// Quit the application
    Quit,
}

/// Apply one message to the model.
///
/// Every message that can move the cursor ends by raising the
/// selection-change trigger, mirroring a host that notifies on every
/// selection change; the coordinator's own duplicate suppression keeps
/// that cheap.
pub async fn apply(coordinator: &IndentFollow, model: &mut Model, msg: Message) {
    model.status_note = None;
    // Scrolling must not chase the cursor; everything else keeps it visible.
    let keep_cursor_visible = !matches!(
        msg,
        Message::ScrollUp(_) | Message::ScrollDown(_) | Message::PageUp | Message::PageDown
    );

    match msg {
        Message::Insert(ch) => {
            model.buffer.insert_char(ch);
            notify_selection_changed(coordinator, model).await;
        }
        Message::Newline => {
            model.buffer.split_line();
            notify_selection_changed(coordinator, model).await;
        }
        Message::Backspace => {
            model.buffer.delete_back();
            notify_selection_changed(coordinator, model).await;
        }
        Message::DeleteForward => {
            model.buffer.delete_forward();
            notify_selection_changed(coordinator, model).await;
        }
        Message::Move(mv) => {
            match coordinator.on_move(Some(&mut model.buffer), mv).await {
                Ok(outcome) => model.note_outcome(outcome),
                Err(err) => model.status_note = Some(format!("move failed: {err}")),
            }
            notify_selection_changed(coordinator, model).await;
        }
        Message::Click { line, col } => {
            model.buffer.move_to(line, col);
            notify_selection_changed(coordinator, model).await;
        }
        Message::Home => {
            model.buffer.move_home();
            notify_selection_changed(coordinator, model).await;
        }
        Message::End => {
            model.buffer.move_end();
            notify_selection_changed(coordinator, model).await;
        }
        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => model.viewport.scroll_down(n),
        Message::PageUp => {
            let page = model.viewport.height() as usize;
            model.viewport.scroll_up(page);
        }
        Message::PageDown => {
            let page = model.viewport.height() as usize;
            model.viewport.scroll_down(page);
        }
        Message::Save => save(model),
        Message::Undo => {
            if model.buffer.undo() {
                notify_selection_changed(coordinator, model).await;
            } else {
                model.status_note = Some("nothing to undo".to_string());
            }
        }
        Message::ToggleWhitespace => model.show_whitespace = !model.show_whitespace,
        Message::Resize(width, height) => {
            model.viewport.resize(width, height.saturating_sub(1));
        }
        Message::Quit => model.should_quit = true,
    }

    if keep_cursor_visible {
        model.sync_viewport();
    }
}

async fn notify_selection_changed(coordinator: &IndentFollow, model: &mut Model) {
    match coordinator.on_selection_changed(Some(&mut model.buffer)).await {
        Ok(outcome) => model.note_outcome(outcome),
        Err(err) => model.status_note = Some(format!("selection handler failed: {err}")),
    }
}

fn save(model: &mut Model) {
    let Some(path) = model.file_path.clone() else {
        model.status_note = Some("no file to save to".to_string());
        return;
    };
    match std::fs::write(&path, model.buffer.text()) {
        Ok(()) => {
            model.buffer.mark_clean();
            model.status_note = Some(format!("saved {}", path.display()));
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "save failed");
            model.status_note = Some(format!("save failed: {err}"));
        }
    }
}
