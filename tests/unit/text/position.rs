use super::*;
use crate::render::backend::{GraphicsBackend, ParagraphHandle};
use crate::render::recording::RecordingBackend;
use crate::style::paragraph::{ParagraphStyle, TextStyle};

// 10px text: 5px per char, 12px per line.
fn metrics(text: &str, width: f32) -> Vec<LineMetrics> {
    let style = ParagraphStyle {
        text_style: TextStyle {
            font_size: 10.0,
            ..TextStyle::default()
        },
        ..ParagraphStyle::default()
    };
    let mut b = RecordingBackend::new();
    let mut p = b.build_paragraph(&style, text, None).unwrap();
    p.layout(width);
    p.line_metrics()
}

#[test]
fn wrapped_line_boundaries() {
    let m = metrics("hello world", 30.0);
    assert_eq!(m.len(), 2);
    assert_eq!(Position::from_index(0, &m), Some(Position::new(0, 0)));
    assert_eq!(Position::from_index(5, &m), Some(Position::new(0, 5)));
    // The break space belongs to line 0 only through its end index.
    assert_eq!(Position::from_index(6, &m), Some(Position::new(1, 0)));
    assert_eq!(Position::from_index(11, &m), Some(Position::new(1, 5)));
}

#[test]
fn out_of_range_index_has_no_position() {
    let m = metrics("hello world", 30.0);
    assert_eq!(Position::from_index(12, &m), None);
    assert_eq!(Position::from_index(0, &[]), None);
    assert_eq!(Position::new(5, 0).to_index(&m), None);
}

#[test]
fn index_round_trips_through_position() {
    let m = metrics("the quick brown fox\njumps", 40.0);
    let last = m.last().unwrap().end_index;
    for i in 0..=last {
        let pos = Position::from_index(i, &m).unwrap();
        assert_eq!(pos.to_index(&m), Some(i), "index {i} via {pos:?}");
    }
}
