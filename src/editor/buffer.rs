use ropey::Rope;

use crate::host::{EditBatch, EditOp, HostEditor, HostError, LineSnapshot, MoveCommand, Position};

/// Undo snapshots kept before the oldest is dropped.
const MAX_UNDO_DEPTH: usize = 512;

/// Cursor state with a remembered column for vertical movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CursorState {
    /// Zero-based line index.
    line: usize,
    /// Zero-based column (byte offset within the line).
    col: usize,
    /// Sticky column restored when a vertical move passes a shorter line.
    col_memory: usize,
}

impl CursorState {
    const fn origin() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Update column and reset the sticky column to match.
    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

/// Buffer and cursor state captured before an undo step's first edit.
#[derive(Debug, Clone)]
struct UndoSnapshot {
    rope: Rope,
    cursor: CursorState,
}

/// A text buffer backed by a rope, acting as the in-memory host.
///
/// Owns the cursor (the selection start the coordinator reads) and a
/// linear undo history. Edit batches keep atomicity by validating every
/// operation before the first one is applied.
pub struct ScratchBuffer {
    rope: Rope,
    cursor: CursorState,
    dirty: bool,
    undo_stack: Vec<UndoSnapshot>,
}

impl ScratchBuffer {
    /// Create a buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: CursorState::origin(),
            dirty: false,
            undo_stack: Vec::new(),
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Position {
        Position {
            line: self.cursor.line,
            col: self.cursor.col,
        }
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g. after saving).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_idx);
        let s = line.to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Snapshot one line for the host boundary.
    pub fn line_snapshot(&self, line_idx: usize) -> Result<LineSnapshot, HostError> {
        self.line_at(line_idx)
            .map(|text| LineSnapshot {
                line: line_idx,
                text,
            })
            .ok_or(HostError::LineOutOfRange {
                line: line_idx,
                count: self.line_count(),
            })
    }

    // --- User edits (each one its own undo step) ---

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        self.remember(true);
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, ch);
        self.cursor.set_col(self.cursor.col + ch.len_utf8());
        self.dirty = true;
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        self.remember(true);
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
        self.dirty = true;
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor.col == 0 && self.cursor.line == 0 {
            return false;
        }
        self.remember(true);

        if self.cursor.col == 0 {
            // Join with previous line
            let prev_line_len = self.line_len(self.cursor.line - 1);
            let char_idx = self.cursor_char_idx();
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.line -= 1;
            self.cursor.set_col(prev_line_len);
        } else {
            let char_idx = self.cursor_char_idx();
            let line = self.rope.line(self.cursor.line);
            let line_str = line.to_string();
            let before = &line_str[..self.cursor.col];
            let prev_char_len = before.chars().next_back().map_or(1, char::len_utf8);
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        }
        self.dirty = true;
        true
    }

    /// Delete the character at the cursor (Delete key).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_forward(&mut self) -> bool {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len && self.cursor.line + 1 >= self.line_count() {
            return false;
        }
        self.remember(true);

        let char_idx = self.cursor_char_idx();
        self.rope.remove(char_idx..=char_idx);
        self.dirty = true;
        true
    }

    // --- Cursor movement ---

    /// Move the cursor in the given direction.
    pub fn move_cursor(&mut self, mv: MoveCommand) {
        match mv {
            MoveCommand::Left => self.move_left(),
            MoveCommand::Right => self.move_right(),
            MoveCommand::Up => self.move_up(),
            MoveCommand::Down => self.move_down(),
        }
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor to a specific line and column, clamping both.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let max_col = self.line_len(self.cursor.line);
        self.cursor.set_col(col.min(max_col));
    }

    // --- Undo ---

    /// Restore the most recent undo snapshot.
    ///
    /// Returns `true` if there was one.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        self.rope = snapshot.rope;
        self.cursor = snapshot.cursor;
        self.dirty = true;
        true
    }

    /// Number of undo steps currently available.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    // --- Private helpers ---

    /// Record an undo snapshot for an edit about to be applied.
    ///
    /// A leading undo stop opens a new step; without one the edit merges
    /// into the step on top of the stack. With snapshots the trailing stop
    /// carries no extra state, so it is not recorded here.
    fn remember(&mut self, undo_stop_before: bool) {
        if undo_stop_before || self.undo_stack.is_empty() {
            if self.undo_stack.len() == MAX_UNDO_DEPTH {
                self.undo_stack.remove(0);
            }
            self.undo_stack.push(UndoSnapshot {
                rope: self.rope.clone(),
                cursor: self.cursor,
            });
        }
    }

    /// Convert cursor position to a ropey char index.
    fn cursor_char_idx(&self) -> usize {
        self.char_idx_at(self.cursor.line, self.cursor.col)
    }

    /// Convert a (line, byte col) pair to a ropey char index, clamping the
    /// column into the line.
    fn char_idx_at(&self, line_idx: usize, col: usize) -> usize {
        let line_start = self.rope.line_to_char(line_idx);
        let line_str = self.rope.line(line_idx).to_string();
        let byte_col = col.min(line_str.len());
        let char_offset = line_str[..byte_col].chars().count();
        line_start + char_offset
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let before = &line[..self.cursor.col];
            let prev_char_len = before.chars().next_back().map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let next_char_len = line[self.cursor.col..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col + next_char_len);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            let max_col = self.line_len(self.cursor.line);
            self.cursor.col = self.cursor.col_memory.min(max_col);
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            let max_col = self.line_len(self.cursor.line);
            self.cursor.col = self.cursor.col_memory.min(max_col);
        }
    }

    // --- Batch application ---

    /// Validate and apply one edit batch (the host primitive behind
    /// [`HostEditor::apply_edits`]).
    ///
    /// Every operation is checked before the first one lands, so a bad
    /// batch leaves the buffer untouched. Deletes apply before inserts.
    pub fn apply_edit_batch(&mut self, batch: &EditBatch) -> Result<(), HostError> {
        if batch.is_empty() {
            return Ok(());
        }
        for op in &batch.ops {
            self.validate_op(op)?;
        }

        self.remember(batch.undo_stop_before);
        for op in &batch.ops {
            if let EditOp::Delete { line, start, end } = *op {
                self.apply_delete(line, start, end);
            }
        }
        for op in &batch.ops {
            if let EditOp::Insert { at, text } = op {
                self.apply_insert(*at, text);
            }
        }
        self.dirty = true;
        Ok(())
    }

    fn validate_op(&self, op: &EditOp) -> Result<(), HostError> {
        match op {
            EditOp::Insert { at, text } => {
                let line_text = self.line_at(at.line).ok_or(HostError::LineOutOfRange {
                    line: at.line,
                    count: self.line_count(),
                })?;
                if text.contains('\n') {
                    return Err(HostError::EditRejected(
                        "insert text must not span lines".to_string(),
                    ));
                }
                if at.col > line_text.len() || !line_text.is_char_boundary(at.col) {
                    return Err(HostError::EditRejected(format!(
                        "insert column {} invalid on line {}",
                        at.col, at.line
                    )));
                }
                Ok(())
            }
            EditOp::Delete { line, start, end } => {
                let line_text = self.line_at(*line).ok_or(HostError::LineOutOfRange {
                    line: *line,
                    count: self.line_count(),
                })?;
                let valid = start <= end
                    && *end <= line_text.len()
                    && line_text.is_char_boundary(*start)
                    && line_text.is_char_boundary(*end);
                if valid {
                    Ok(())
                } else {
                    Err(HostError::EditRejected(format!(
                        "delete span {start}..{end} invalid on line {line}"
                    )))
                }
            }
        }
    }

    /// Delete `start..end` (bytes) on `line`. The line itself survives;
    /// only its text shrinks, so no other line index shifts.
    fn apply_delete(&mut self, line: usize, start: usize, end: usize) {
        let start_char = self.char_idx_at(line, start);
        let end_char = self.char_idx_at(line, end);
        self.rope.remove(start_char..end_char);

        if self.cursor.line == line {
            if self.cursor.col >= end {
                self.cursor.set_col(self.cursor.col - (end - start));
            } else if self.cursor.col > start {
                self.cursor.set_col(start);
            }
        }
    }

    /// Insert `text` at `at`. A cursor at or after the insertion point on
    /// the same line is pushed past the inserted text.
    fn apply_insert(&mut self, at: Position, text: &str) {
        let char_idx = self.char_idx_at(at.line, at.col);
        self.rope.insert(char_idx, text);

        if self.cursor.line == at.line && self.cursor.col >= at.col {
            self.cursor.set_col(self.cursor.col + text.len());
        }
    }
}

impl HostEditor for ScratchBuffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, line: usize) -> Result<LineSnapshot, HostError> {
        self.line_snapshot(line)
    }

    fn selection_start(&self) -> Position {
        self.cursor()
    }

    async fn execute_move(&mut self, mv: MoveCommand) -> Result<(), HostError> {
        self.move_cursor(mv);
        Ok(())
    }

    async fn apply_edits(&mut self, batch: EditBatch) -> Result<(), HostError> {
        self.apply_edit_batch(&batch)
    }
}

impl std::fmt::Debug for ScratchBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .field("undo_depth", &self.undo_stack.len())
            .finish()
    }
}
