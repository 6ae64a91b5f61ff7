use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::app::Model;
use crate::editor::ScratchBuffer;

fn model_from(text: &str) -> Model {
    Model::new(None, ScratchBuffer::from_text(text), (40, 10))
}

fn render_rows(model: &Model) -> Vec<String> {
    let backend = TestBackend::new(40, 10);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| super::render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect()
}

#[test]
fn test_renders_gutter_and_text() {
    let model = model_from("hello\nworld");
    let rows = render_rows(&model);
    assert!(rows[0].contains("   1 hello"));
    assert!(rows[1].contains("   2 world"));
}

#[test]
fn test_whitespace_markers_follow_toggle() {
    let mut model = model_from("  indented");
    let plain = render_rows(&model);
    assert!(plain[0].contains("  indented"));

    model.show_whitespace = true;
    let marked = render_rows(&model);
    assert!(marked[0].contains("··indented"));
}

#[test]
fn test_status_bar_shows_scratch_and_dirty_flag() {
    let mut model = model_from("x");
    let rows = render_rows(&model);
    assert!(rows[9].contains("[scratch]"));
    assert!(!rows[9].contains('+'));

    model.buffer.insert_char('!');
    let rows = render_rows(&model);
    assert!(rows[9].contains("[scratch] +"));
}

#[test]
fn test_scrolled_viewport_starts_at_offset() {
    let text = (1..=50).map(|i| format!("line{i}\n")).collect::<String>();
    let mut model = model_from(&text);
    model.viewport.scroll_down(20);
    let rows = render_rows(&model);
    assert!(rows[0].contains("  21 line21"));
}
