use super::*;

fn para(b: &mut RecordingBackend, text: &str) -> RecordedParagraph {
    b.build_paragraph(&ParagraphStyle::default(), text, None)
        .unwrap()
}

#[test]
fn wide_layout_keeps_one_line_and_narrow_layout_wraps() {
    let mut b = RecordingBackend::new();
    let mut p = para(&mut b, "AAAA BBBB");
    p.layout(1000.0);
    assert_eq!(p.line_count(), 1);

    p.layout(50.0);
    let lines = p.line_metrics();
    assert!(lines.len() >= 2);
    assert_eq!(lines[0].start_index, 0);
    for pair in lines.windows(2) {
        assert_eq!(pair[0].end_index, pair[1].start_index);
    }
    assert_eq!(lines.last().unwrap().end_index, 9);
}

#[test]
fn wraps_at_whitespace_when_the_word_fits() {
    let mut b = RecordingBackend::new();
    let mut p = para(&mut b, "AAAA BBBB");
    // 50px font: 25px per char, so 4 chars fit in 100px.
    p.layout(100.0);
    let lines = p.line_metrics();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        (lines[0].start_index, lines[0].end_excluding_whitespace, lines[0].end_index),
        (0, 4, 5)
    );
    assert_eq!((lines[1].start_index, lines[1].end_index), (5, 9));
    assert_eq!(lines[1].baseline, 60.0 + 50.0);
}

#[test]
fn empty_text_has_a_single_empty_line() {
    let mut b = RecordingBackend::new();
    let mut p = para(&mut b, "");
    p.layout(100.0);
    let lines = p.line_metrics();
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].start_index, lines[0].end_index), (0, 0));
}

#[test]
fn newlines_end_lines() {
    let mut b = RecordingBackend::new();
    let mut p = para(&mut b, "ab\n\ncd");
    p.layout(1000.0);
    let lines = p.line_metrics();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].end_index, 2);
    assert_eq!(lines[0].end_including_newline, 3);
    assert_eq!((lines[1].start_index, lines[1].end_index), (3, 3));
    assert_eq!((lines[2].start_index, lines[2].end_index), (4, 6));
}

#[test]
fn max_lines_truncates() {
    let mut b = RecordingBackend::new();
    let style = ParagraphStyle {
        max_lines: Some(2),
        ..ParagraphStyle::default()
    };
    let mut p = b.build_paragraph(&style, "a\nb\nc\nd", None).unwrap();
    p.layout(500.0);
    assert_eq!(p.line_count(), 2);
    assert_eq!(p.height(), 120.0);
}

#[test]
fn hit_testing_maps_points_to_indices() {
    let mut b = RecordingBackend::new();
    let mut p = para(&mut b, "AAAA BBBB");
    p.layout(100.0);
    assert_eq!(p.glyph_position_at(0.0, 10.0), Some(0));
    assert_eq!(p.glyph_position_at(52.0, 10.0), Some(2));
    assert_eq!(p.glyph_position_at(99.0, 10.0), Some(4));
    assert_eq!(p.glyph_position_at(30.0, 70.0), Some(6));
    assert_eq!(p.glyph_position_at(-1.0, 10.0), None);
    assert_eq!(p.glyph_position_at(10.0, 500.0), None);
}

#[test]
fn range_rects_split_per_line() {
    let mut b = RecordingBackend::new();
    let mut p = para(&mut b, "AAAA BBBB");
    p.layout(100.0);
    let rects = p.rects_for_range(2, 7);
    assert_eq!(rects.len(), 2);
    assert_eq!(rects[0], Rect::new(50.0, 0.0, 125.0, 60.0));
    assert_eq!(rects[1], Rect::new(0.0, 60.0, 50.0, 120.0));
    assert!(p.rects_for_range(3, 3).is_empty());
}

#[test]
fn tallies_track_allocations_and_releases() {
    let mut b = RecordingBackend::new();
    let paint = b.make_paint();
    let font = b.make_font(12.0);
    assert_eq!(b.live(ResourceKind::Paint), 1);
    b.delete_paint(paint);
    b.delete_font(font);
    assert_eq!(b.allocated(ResourceKind::Paint), 1);
    assert_eq!(b.released(ResourceKind::Paint), 1);
    assert_eq!(b.live(ResourceKind::Paint), 0);
    assert_eq!(b.live(ResourceKind::Font), 0);
}

#[test]
fn bad_svg_yields_none_without_allocating() {
    let mut b = RecordingBackend::new();
    assert!(b.make_path_from_svg("M 0 0 L").is_none());
    assert_eq!(b.allocated(ResourceKind::Path), 0);
    assert!(b.make_path_from_svg("M 0 0 L 10 10 Z").is_some());
    assert_eq!(b.live(ResourceKind::Path), 1);
}

#[test]
fn zero_sized_surface_is_a_backend_error() {
    let mut b = RecordingBackend::new();
    assert!(matches!(b.make_surface(0, 10), Err(SkeneError::Backend(_))));
}

#[test]
fn draw_calls_are_logged_per_surface() {
    let mut b = RecordingBackend::new();
    let mut s = b.make_surface(10, 10).unwrap();
    let paint = b.make_paint();
    b.save(&mut s);
    b.clear(&mut s, Color::WHITE);
    b.draw_line(&mut s, Point::ZERO, Point::new(1.0, 1.0), &paint);
    b.restore(&mut s);
    assert_eq!(s.save_depth(), 0);
    let cmds: Vec<_> = b.commands_for(s.id()).cloned().collect();
    assert_eq!(cmds.len(), 4);
    assert_eq!(cmds[1], DrawCommand::Clear(Color::WHITE));
}
