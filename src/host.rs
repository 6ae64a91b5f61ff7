//! The host editing environment boundary.
//!
//! The coordinator never owns a buffer or a cursor; it reads both through
//! [`HostEditor`] and mutates them only by delegating native movements and
//! submitting edit batches. Anything that can supply line snapshots, a
//! selection start, and atomic batch application can host the coordinator —
//! the in-crate [`ScratchBuffer`](crate::editor::ScratchBuffer) is one such
//! host.

use std::fmt;
use std::ops::Range;

use thiserror::Error;

/// Identifier prefix under which the movement commands are registered.
pub const COMMAND_PREFIX: &str = "autodent";

/// A (line, column) pair: the start of the host's current selection.
///
/// `col` is a byte offset within the line, matching the buffer's own
/// column convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
}

impl Position {
    /// Create a position.
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// One of the four native cursor movements the coordinator can delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCommand {
    Up,
    Down,
    Left,
    Right,
}

impl MoveCommand {
    /// The host's identifier for the underlying native movement.
    pub const fn native_id(self) -> &'static str {
        match self {
            Self::Up => "cursorUp",
            Self::Down => "cursorDown",
            Self::Left => "cursorLeft",
            Self::Right => "cursorRight",
        }
    }

    /// The namespaced identifier the coordinator registers the command under.
    pub fn command_id(self) -> String {
        format!("{COMMAND_PREFIX}.{}", self.native_id())
    }
}

/// Snapshot of one buffer line at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    /// Zero-based line index the snapshot was taken from.
    pub line: usize,
    /// The line's text without its trailing newline.
    pub text: String,
}

impl LineSnapshot {
    /// True only for zero-length lines.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True when the line is empty or contains only whitespace.
    pub fn is_empty_or_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }

    /// Character index of the first non-whitespace character.
    ///
    /// For lines without one (empty or all-whitespace) this is the
    /// character length of the line.
    pub fn first_non_whitespace_col(&self) -> usize {
        self.text
            .chars()
            .position(|c| !c.is_whitespace())
            .unwrap_or_else(|| self.text.chars().count())
    }

    /// Byte range covering the whole line text (not the trailing newline).
    pub fn full_range(&self) -> Range<usize> {
        0..self.text.len()
    }
}

/// A single edit operation inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Insert `text` at `at`. A cursor sitting exactly at `at` is pushed
    /// past the inserted text rather than staying anchored before it.
    Insert { at: Position, text: String },
    /// Delete the byte range `start..end` on `line`. The line itself
    /// survives; only its text is removed.
    Delete { line: usize, start: usize, end: usize },
}

/// An ordered batch of edits the host applies atomically.
///
/// Deletes are applied before inserts. The undo-stop flags control history
/// grouping: with both disabled the batch merges into the adjacent undo
/// step instead of forming its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBatch {
    pub ops: Vec<EditOp>,
    pub undo_stop_before: bool,
    pub undo_stop_after: bool,
}

impl EditBatch {
    /// An empty batch that forms its own undo step.
    pub const fn new() -> Self {
        Self {
            ops: Vec::new(),
            undo_stop_before: true,
            undo_stop_after: true,
        }
    }

    /// An empty batch that merges into the surrounding undo step.
    pub const fn merging() -> Self {
        Self {
            ops: Vec::new(),
            undo_stop_before: false,
            undo_stop_after: false,
        }
    }

    /// Queue an insertion.
    pub fn insert(&mut self, at: Position, text: impl Into<String>) {
        self.ops.push(EditOp::Insert {
            at,
            text: text.into(),
        });
    }

    /// Queue a deletion of `span` on `line`.
    pub fn delete(&mut self, line: usize, span: Range<usize>) {
        self.ops.push(EditOp::Delete {
            line,
            start: span.start,
            end: span.end,
        });
    }

    /// Whether the batch contains no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Default for EditBatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Failures at the host boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// A trigger fired with no editor to act on.
    #[error("no active editor")]
    NoActiveEditor,
    /// A line read landed outside the buffer.
    #[error("line {line} out of range (buffer has {count} lines)")]
    LineOutOfRange { line: usize, count: usize },
    /// The host refused an edit batch.
    #[error("edit rejected: {0}")]
    EditRejected(String),
}

/// The host editing environment, as seen by the coordinator.
///
/// The two async methods are the handler's only suspension points: the
/// coordinator awaits the host's own cursor logic before re-reading the
/// selection, and awaits batch application before releasing its lock.
#[allow(async_fn_in_trait)]
pub trait HostEditor {
    /// Number of lines in the buffer. Always at least 1.
    fn line_count(&self) -> usize;

    /// Snapshot one line.
    fn line(&self, line: usize) -> Result<LineSnapshot, HostError>;

    /// The current selection start.
    fn selection_start(&self) -> Position;

    /// Run one native movement to completion. The destination is the
    /// host's decision (sticky columns, clamping at buffer edges).
    async fn execute_move(&mut self, mv: MoveCommand) -> Result<(), HostError>;

    /// Apply one batch atomically: either every operation lands or the
    /// call fails and the buffer is untouched.
    async fn apply_edits(&mut self, batch: EditBatch) -> Result<(), HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_line_is_empty_and_blank() {
        let snap = LineSnapshot {
            line: 0,
            text: String::new(),
        };
        assert!(snap.is_empty());
        assert!(snap.is_empty_or_whitespace());
    }

    #[test]
    fn test_whitespace_line_is_blank_but_not_empty() {
        let snap = LineSnapshot {
            line: 0,
            text: "   \t".to_string(),
        };
        assert!(!snap.is_empty());
        assert!(snap.is_empty_or_whitespace());
    }

    #[test]
    fn test_first_non_whitespace_col() {
        let snap = LineSnapshot {
            line: 0,
            text: "    fn main()".to_string(),
        };
        assert_eq!(snap.first_non_whitespace_col(), 4);
    }

    #[test]
    fn test_first_non_whitespace_col_on_blank_line_is_length() {
        let snap = LineSnapshot {
            line: 0,
            text: "   ".to_string(),
        };
        assert_eq!(snap.first_non_whitespace_col(), 3);
    }

    #[test]
    fn test_command_id_is_namespaced() {
        assert_eq!(MoveCommand::Up.command_id(), "autodent.cursorUp");
        assert_eq!(MoveCommand::Right.native_id(), "cursorRight");
    }

    #[test]
    fn test_merging_batch_disables_undo_stops() {
        let batch = EditBatch::merging();
        assert!(!batch.undo_stop_before);
        assert!(!batch.undo_stop_after);

        let batch = EditBatch::new();
        assert!(batch.undo_stop_before);
        assert!(batch.undo_stop_after);
    }
}
