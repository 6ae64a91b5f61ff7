use std::path::PathBuf;

use crate::coordinator::Outcome;
use crate::editor::ScratchBuffer;
use crate::ui::viewport::Viewport;

/// The complete application state.
#[derive(Debug)]
pub struct Model {
    /// The buffer being edited; doubles as the coordinator's host.
    pub buffer: ScratchBuffer,
    /// Scroll state for the text area.
    pub viewport: Viewport,
    /// File backing the buffer, if any.
    pub file_path: Option<PathBuf>,
    /// Render whitespace as visible markers.
    pub show_whitespace: bool,
    /// Most recent coordinator decision, shown in the status bar.
    pub last_outcome: Option<Outcome>,
    /// One-shot status message (save results, undo misses).
    pub status_note: Option<String>,
    /// Set when the user asked to quit.
    pub should_quit: bool,
}

impl Model {
    /// Create a model for a buffer shown in a `(width, height)` terminal.
    ///
    /// The bottom row is reserved for the status bar.
    pub fn new(file_path: Option<PathBuf>, buffer: ScratchBuffer, size: (u16, u16)) -> Self {
        let total_lines = buffer.line_count();
        Self {
            buffer,
            viewport: Viewport::new(size.0, size.1.saturating_sub(1), total_lines),
            file_path,
            show_whitespace: false,
            last_outcome: None,
            status_note: None,
            should_quit: false,
        }
    }

    /// Record a coordinator decision worth showing. Suppressed repeats are
    /// not: they would immediately overwrite the interesting one.
    pub(crate) fn note_outcome(&mut self, outcome: Outcome) {
        if outcome != Outcome::Suppressed {
            self.last_outcome = Some(outcome);
        }
    }

    /// Refresh the viewport after the buffer or cursor changed.
    pub(crate) fn sync_viewport(&mut self) {
        self.viewport.set_total_lines(self.buffer.line_count());
        self.viewport.ensure_visible(self.buffer.cursor().line);
    }
}
