use super::{IndentFollow, Outcome, Trigger};
use crate::editor::ScratchBuffer;
use crate::host::{EditBatch, HostEditor, HostError, LineSnapshot, MoveCommand, Position};

fn buffer(text: &str) -> ScratchBuffer {
    ScratchBuffer::from_text(text)
}

/// Host whose line reads start failing past `fail_from`, with an inflated
/// line count so the look-ahead scan walks into the failing region.
struct FlakyHost {
    buf: ScratchBuffer,
    fail_from: usize,
    claimed_count: usize,
}

impl HostEditor for FlakyHost {
    fn line_count(&self) -> usize {
        self.claimed_count
    }

    fn line(&self, line: usize) -> Result<LineSnapshot, HostError> {
        if line >= self.fail_from {
            return Err(HostError::LineOutOfRange {
                line,
                count: self.fail_from,
            });
        }
        self.buf.line_snapshot(line)
    }

    fn selection_start(&self) -> Position {
        self.buf.cursor()
    }

    async fn execute_move(&mut self, mv: MoveCommand) -> Result<(), HostError> {
        self.buf.move_cursor(mv);
        Ok(())
    }

    async fn apply_edits(&mut self, batch: EditBatch) -> Result<(), HostError> {
        HostEditor::apply_edits(&mut self.buf, batch).await
    }
}

// --- Key-driven moves ---

#[tokio::test]
async fn test_move_onto_empty_line_fills_indent() {
    let coord = IndentFollow::new();
    let mut buf = buffer("fn main() {\n\n    body\n}");

    let outcome = coord.on_move(Some(&mut buf), MoveCommand::Down).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::IndentFilled {
            cols: 4,
            cleared_origin: false
        }
    );
    assert_eq!(buf.line_at(1), Some("    ".to_string()));
    assert_eq!(buf.cursor(), Position::new(1, 4));
}

#[tokio::test]
async fn test_move_off_whitespace_line_clears_it() {
    let coord = IndentFollow::new();
    let mut buf = buffer("x\n    \ny");
    buf.move_to(1, 2);

    let outcome = coord.on_move(Some(&mut buf), MoveCommand::Down).await.unwrap();

    assert_eq!(outcome, Outcome::OriginCleared);
    assert_eq!(buf.line_at(1), Some(String::new()));
    assert_eq!(buf.line_at(2), Some("y".to_string()));
}

#[tokio::test]
async fn test_move_off_whitespace_onto_empty_fills_and_clears() {
    let coord = IndentFollow::new();
    let mut buf = buffer("    \n\n  z");
    buf.move_to(0, 4);

    let outcome = coord.on_move(Some(&mut buf), MoveCommand::Down).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::IndentFilled {
            cols: 2,
            cleared_origin: true
        }
    );
    assert_eq!(buf.line_at(0), Some(String::new()));
    assert_eq!(buf.line_at(1), Some("  ".to_string()));
    assert_eq!(buf.cursor(), Position::new(1, 2));
}

#[tokio::test]
async fn test_noop_on_content_landing_with_clean_origin() {
    let coord = IndentFollow::new();
    let mut buf = buffer("abc\ndef");

    let outcome = coord.on_move(Some(&mut buf), MoveCommand::Down).await.unwrap();

    assert_eq!(outcome, Outcome::NoEdit);
    assert_eq!(buf.text(), "abc\ndef");
}

#[tokio::test]
async fn test_empty_origin_line_is_not_cleared() {
    let coord = IndentFollow::new();
    let mut buf = buffer("\nabc");

    // Zero-length origin has nothing to clear; only nonzero whitespace
    // lines are cleanup candidates.
    let outcome = coord.on_move(Some(&mut buf), MoveCommand::Down).await.unwrap();

    assert_eq!(outcome, Outcome::NoEdit);
    assert_eq!(buf.text(), "\nabc");
}

#[tokio::test]
async fn test_no_insertion_when_no_content_below() {
    let coord = IndentFollow::new();
    let mut buf = buffer("x\n\n");

    let outcome = coord.on_move(Some(&mut buf), MoveCommand::Down).await.unwrap();

    assert_eq!(outcome, Outcome::NoEdit);
    assert_eq!(buf.text(), "x\n\n");
}

#[tokio::test]
async fn test_look_ahead_skips_blank_lines() {
    let coord = IndentFollow::new();
    let mut buf = buffer("a\n\n   \n\t\n    done");

    let outcome = coord.on_move(Some(&mut buf), MoveCommand::Down).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::IndentFilled {
            cols: 4,
            cleared_origin: false
        }
    );
    assert_eq!(buf.line_at(1), Some("    ".to_string()));
}

#[tokio::test]
async fn test_left_move_within_line_is_noop() {
    let coord = IndentFollow::new();
    let mut buf = buffer("abc");
    buf.move_to(0, 2);

    let outcome = coord.on_move(Some(&mut buf), MoveCommand::Left).await.unwrap();

    assert_eq!(outcome, Outcome::NoEdit);
    assert_eq!(buf.cursor(), Position::new(0, 1));
}

// --- Selection changes ---

#[tokio::test]
async fn test_selection_change_fills_clicked_empty_line() {
    let coord = IndentFollow::new();
    let mut buf = buffer("\n    code");
    buf.move_to(0, 0);

    let outcome = coord.on_selection_changed(Some(&mut buf)).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::IndentFilled {
            cols: 4,
            cleared_origin: false
        }
    );
    assert_eq!(buf.line_at(0), Some("    ".to_string()));
    assert_eq!(coord.last_handled_click_line(), Some(0));
}

#[tokio::test]
async fn test_selection_change_suppressed_for_same_line() {
    let coord = IndentFollow::new();
    let mut buf = buffer("abc\ndef");
    buf.move_to(1, 0);

    let first = coord.on_selection_changed(Some(&mut buf)).await.unwrap();
    let second = coord.on_selection_changed(Some(&mut buf)).await.unwrap();

    assert_eq!(first, Outcome::NoEdit);
    assert_eq!(second, Outcome::Suppressed);
}

#[tokio::test]
async fn test_selection_change_reruns_after_line_changes() {
    let coord = IndentFollow::new();
    let mut buf = buffer("abc\ndef\nghi");
    buf.move_to(1, 0);
    coord.on_selection_changed(Some(&mut buf)).await.unwrap();

    buf.move_to(2, 0);
    let outcome = coord.on_selection_changed(Some(&mut buf)).await.unwrap();

    assert_eq!(outcome, Outcome::NoEdit);
    assert_eq!(coord.last_handled_click_line(), Some(2));
}

#[tokio::test]
async fn test_selection_change_never_clears_origin() {
    let coord = IndentFollow::new();
    let mut buf = buffer("    \nabc");
    buf.move_to(1, 0);

    let outcome = coord.on_selection_changed(Some(&mut buf)).await.unwrap();

    assert_eq!(outcome, Outcome::NoEdit);
    assert_eq!(buf.line_at(0), Some("    ".to_string()));
}

// --- Failure paths ---

#[tokio::test]
async fn test_no_active_editor_fails_fast() {
    let coord = IndentFollow::new();

    let err = coord
        .on_move::<ScratchBuffer>(None, MoveCommand::Down)
        .await
        .unwrap_err();
    assert_eq!(err, HostError::NoActiveEditor);

    let err = coord
        .on_selection_changed::<ScratchBuffer>(None)
        .await
        .unwrap_err();
    assert_eq!(err, HostError::NoActiveEditor);
}

#[tokio::test]
async fn test_scan_read_failure_degrades_to_no_edit() {
    let coord = IndentFollow::new();
    let mut host = FlakyHost {
        buf: buffer("x\n"),
        fail_from: 2,
        claimed_count: 10,
    };

    let outcome = coord.on_move(Some(&mut host), MoveCommand::Down).await.unwrap();

    assert_eq!(outcome, Outcome::NoEdit);
    assert_eq!(host.buf.text(), "x\n");
}

// --- Plumbing ---

#[test]
fn test_trigger_classification() {
    assert!(Trigger::Move(MoveCommand::Up).is_key_move());
    assert!(!Trigger::SelectionChanged.is_key_move());
}

#[test]
fn test_outcome_display_and_edited() {
    assert_eq!(Outcome::NoEdit.to_string(), "no edit");
    assert_eq!(
        Outcome::IndentFilled {
            cols: 4,
            cleared_origin: false
        }
        .to_string(),
        "indent +4"
    );
    assert_eq!(
        Outcome::IndentFilled {
            cols: 2,
            cleared_origin: true
        }
        .to_string(),
        "indent +2, origin cleared"
    );
    assert_eq!(Outcome::OriginCleared.to_string(), "origin cleared");
    assert!(Outcome::OriginCleared.edited());
    assert!(!Outcome::Suppressed.edited());
}
