//! The indent-follow coordinator.
//!
//! Watches cursor movement and keeps indentation whitespace tidy along the
//! way: an empty line the cursor lands on is filled with the indentation of
//! the next non-blank line below it, and a whitespace-only line the cursor
//! leaves by keyboard is cleared. Both fix-ups merge into the surrounding
//! undo step, so they never show up as separate history entries.
//!
//! One decide-and-edit sequence runs per trigger, serialized by an
//! async-aware lock: handlers suspend while the host performs the native
//! movement and while the edit batch applies, and a fast key repeat must
//! not let a second trigger read buffer state the first is about to
//! change.

use std::sync::Mutex as SyncMutex;

use tokio::sync::Mutex;

use crate::host::{EditBatch, HostEditor, HostError, MoveCommand, Position};

/// What caused a decide-and-edit sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A registered movement command (key-driven).
    Move(MoveCommand),
    /// A selection-change notification (mouse click, programmatic move).
    SelectionChanged,
}

impl Trigger {
    /// True for key-driven movements, which leave their origin line behind.
    pub const fn is_key_move(self) -> bool {
        matches!(self, Self::Move(_))
    }
}

/// The edit decision a single trigger resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Duplicate selection-change for an already-handled line; nothing ran.
    Suppressed,
    /// The sequence ran and no edit was needed.
    NoEdit,
    /// An empty destination line was filled with `cols` spaces.
    IndentFilled {
        cols: usize,
        /// Whether the whitespace-only origin line was cleared in the
        /// same batch.
        cleared_origin: bool,
    },
    /// Only the whitespace-only origin line was cleared.
    OriginCleared,
}

impl Outcome {
    /// Whether the trigger produced an edit batch.
    pub const fn edited(self) -> bool {
        !matches!(self, Self::Suppressed | Self::NoEdit)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Suppressed => write!(f, "suppressed"),
            Self::NoEdit => write!(f, "no edit"),
            Self::IndentFilled {
                cols,
                cleared_origin: false,
            } => write!(f, "indent +{cols}"),
            Self::IndentFilled {
                cols,
                cleared_origin: true,
            } => write!(f, "indent +{cols}, origin cleared"),
            Self::OriginCleared => write!(f, "origin cleared"),
        }
    }
}

/// The indent-follow coordinator.
///
/// One instance per process, constructed eagerly; the lock and the
/// last-handled click line are its only state. The instance is shared by
/// reference between handlers, never cloned.
#[derive(Debug)]
pub struct IndentFollow {
    /// Serializes every decide-and-edit sequence. Acquisition order is
    /// FIFO, so back-to-back key repeats run in the order they arrived.
    lock: Mutex<()>,
    /// Line of the most recent selection-change that was handled, used to
    /// drop repeat notifications for the same line (including the ones
    /// raised by our own edits).
    last_click_line: SyncMutex<Option<usize>>,
}

impl IndentFollow {
    /// Create a coordinator with no handled-click history.
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            last_click_line: SyncMutex::new(None),
        }
    }

    /// Handle one of the registered movement commands.
    ///
    /// Delegates the native movement to the host, then adjusts whitespace
    /// on the destination and origin lines as needed.
    ///
    /// # Errors
    ///
    /// [`HostError::NoActiveEditor`] when `host` is `None`; host errors
    /// from movement delegation or edit application are passed through.
    pub async fn on_move<H: HostEditor>(
        &self,
        host: Option<&mut H>,
        mv: MoveCommand,
    ) -> Result<Outcome, HostError> {
        let host = host.ok_or(HostError::NoActiveEditor)?;
        let _guard = self.lock.lock().await;
        // Sampled after the lock: a trigger queued behind another must see
        // the buffer as that one committed it, not as it was on arrival.
        let pos = host.selection_start();
        tracing::debug!(command = mv.native_id(), line = pos.line, "movement trigger");
        self.indent_and_clear(host, pos, Trigger::Move(mv)).await
    }

    /// Handle a selection-change notification.
    ///
    /// Repeat notifications for the line handled last time are dropped
    /// without running the sequence; this also swallows the notifications
    /// raised by the coordinator's own insertions.
    ///
    /// # Errors
    ///
    /// [`HostError::NoActiveEditor`] when `host` is `None`; host errors
    /// from edit application are passed through.
    pub async fn on_selection_changed<H: HostEditor>(
        &self,
        host: Option<&mut H>,
    ) -> Result<Outcome, HostError> {
        let host = host.ok_or(HostError::NoActiveEditor)?;
        let event_line = host.selection_start().line;
        if self.last_handled_click_line() == Some(event_line) {
            tracing::trace!(line = event_line, "selection change suppressed");
            return Ok(Outcome::Suppressed);
        }

        let _guard = self.lock.lock().await;
        let pos = host.selection_start();
        tracing::debug!(line = pos.line, "selection change trigger");
        let outcome = self
            .indent_and_clear(host, pos, Trigger::SelectionChanged)
            .await?;
        *self
            .last_click_line
            .lock()
            .expect("last click line lock poisoned") = Some(pos.line);
        Ok(outcome)
    }

    /// Line of the most recent handled selection-change, if any.
    pub fn last_handled_click_line(&self) -> Option<usize> {
        *self
            .last_click_line
            .lock()
            .expect("last click line lock poisoned")
    }

    /// The decide-and-edit sequence. Caller holds the coordination lock.
    async fn indent_and_clear<H: HostEditor>(
        &self,
        host: &mut H,
        pos: Position,
        trigger: Trigger,
    ) -> Result<Outcome, HostError> {
        let prev_line = host.line(pos.line)?;
        // Stray whitespace is only cleared after key movements; a click
        // does not leave a stale line behind the way typing-then-moving
        // does.
        let clear_prev =
            trigger.is_key_move() && !prev_line.is_empty() && prev_line.is_empty_or_whitespace();

        if let Trigger::Move(mv) = trigger {
            host.execute_move(mv).await?;
        }

        // For a selection-change the event already carries the landing
        // position; for a key move the host's cursor logic decides it.
        let new_pos = match trigger {
            Trigger::SelectionChanged => pos,
            Trigger::Move(_) => host.selection_start(),
        };
        let new_line_text = match trigger {
            Trigger::SelectionChanged => prev_line.text.clone(),
            Trigger::Move(_) => host.line(new_pos.line)?.text,
        };

        if new_line_text.is_empty() {
            let indent = next_content_indent(host, new_pos.line);
            tracing::trace!(line = new_pos.line, indent, "look-ahead scan");
            if indent > 0 {
                let mut batch = EditBatch::merging();
                if clear_prev {
                    batch.delete(prev_line.line, prev_line.full_range());
                }
                batch.insert(new_pos, " ".repeat(indent));
                host.apply_edits(batch).await?;
                tracing::debug!(
                    line = new_pos.line,
                    cols = indent,
                    cleared_origin = clear_prev,
                    "indent filled"
                );
                return Ok(Outcome::IndentFilled {
                    cols: indent,
                    cleared_origin: clear_prev,
                });
            }
            Ok(Outcome::NoEdit)
        } else if clear_prev {
            let mut batch = EditBatch::merging();
            batch.delete(prev_line.line, prev_line.full_range());
            host.apply_edits(batch).await?;
            tracing::debug!(line = prev_line.line, "origin cleared");
            Ok(Outcome::OriginCleared)
        } else {
            Ok(Outcome::NoEdit)
        }
    }
}

impl Default for IndentFollow {
    fn default() -> Self {
        Self::new()
    }
}

/// First-non-whitespace column of the next line with real content below
/// `line`, skipping blank lines.
///
/// The scan never wraps past end of buffer; reaching it, or any read
/// failure along the way, resolves to 0 (no insertion).
fn next_content_indent<H: HostEditor>(host: &H, line: usize) -> usize {
    for i in (line + 1)..host.line_count() {
        let Ok(snapshot) = host.line(i) else {
            return 0;
        };
        if snapshot.is_empty_or_whitespace() {
            continue;
        }
        return snapshot.first_non_whitespace_col();
    }
    0
}

#[cfg(test)]
mod tests;
