use super::*;
use crate::render::backend::ResourceKind;
use crate::render::recording::{DrawCommand, RecordingBackend};
use crate::style::paint::PaintMode;
use serde_json::json;

#[test]
fn draws_from_endpoints_with_red_fill() {
    let mut b = RecordingBackend::new();
    let mut s = b.make_surface(16, 16).unwrap();
    let mut l = LineNode::new(&mut b);
    l.set_prop("x2", &json!(4.5)).unwrap();
    l.render(&mut b, &mut s).unwrap();

    let Some(DrawCommand::Line { p0, p1, paint }) = b.commands().last().map(|r| r.command.clone())
    else {
        panic!("expected a line draw");
    };
    assert_eq!(p0, Point::new(0.0, 10.0));
    assert_eq!(p1, Point::new(4.5, 0.0));
    assert_eq!(paint.mode, PaintMode::Fill);
    assert_eq!(paint.color, Color::rgba(0.9, 0.0, 0.0, 1.0));
}

#[test]
fn moving_endpoints_needs_no_layout_rebuild() {
    let mut b = RecordingBackend::new();
    let mut s = b.make_surface(16, 16).unwrap();
    let mut l = LineNode::new(&mut b);
    l.render(&mut b, &mut s).unwrap();
    l.set_points(Point::new(1.0, 1.0), Point::new(2.0, 2.0));
    assert!(!l.flags.layout);
    l.render(&mut b, &mut s).unwrap();
    assert_eq!(l.points(), (Point::new(1.0, 1.0), Point::new(2.0, 2.0)));
    assert!(LineNode::<RecordingBackend>::LAYOUT_PROPS.is_empty());
}

#[test]
fn delete_is_idempotent() {
    let mut b = RecordingBackend::new();
    let mut l = LineNode::new(&mut b);
    l.delete(&mut b);
    l.delete(&mut b);
    assert_eq!(b.released(ResourceKind::Paint), 1);
    assert!(l.paint().is_none());
}
