use super::*;
use crate::foundation::core::Point;
use crate::render::backend::ResourceKind;
use crate::render::recording::RecordingBackend;
use serde_json::json;

#[test]
fn svg_takes_precedence_over_cmds() {
    let mut b = RecordingBackend::new();
    let mut p = PathNode::new(&mut b);
    p.set_prop("cmds", &json!([[0, 0, 0], [1, 5, 5]])).unwrap();
    p.set_prop("svg", &json!("M 1 1 L 9 9 Z")).unwrap();
    p.layout(&mut b).unwrap();
    let bbox = kurbo::Shape::bounding_box(p.path().unwrap().path());
    assert_eq!(bbox.origin(), Point::new(1.0, 1.0));
}

#[test]
fn cmds_build_when_no_svg() {
    let mut b = RecordingBackend::new();
    let mut s = b.make_surface(16, 16).unwrap();
    let mut p = PathNode::new(&mut b);
    p.set_cmds(Some(vec![
        PathCmd::MoveTo(Point::new(0.0, 0.0)),
        PathCmd::LineTo(Point::new(4.0, 8.0)),
        PathCmd::Close,
    ]));
    p.render(&mut b, &mut s).unwrap();
    assert_eq!(p.path().unwrap().path().elements().len(), 3);
}

#[test]
fn empty_path_without_data() {
    let mut b = RecordingBackend::new();
    let mut p = PathNode::new(&mut b);
    p.layout(&mut b).unwrap();
    assert!(p.path().unwrap().path().elements().is_empty());
}

#[test]
fn relayout_releases_the_previous_path() {
    let mut b = RecordingBackend::new();
    let mut s = b.make_surface(16, 16).unwrap();
    let mut p = PathNode::new(&mut b);
    for d in ["M0 0 L1 1", "M0 0 L2 2", "M0 0 L3 3"] {
        p.set_svg(Some(d.to_owned()));
        p.render(&mut b, &mut s).unwrap();
    }
    assert_eq!(b.allocated(ResourceKind::Path), 3);
    assert_eq!(b.live(ResourceKind::Path), 1);
}

#[test]
fn invalid_svg_is_a_validation_error() {
    let mut b = RecordingBackend::new();
    let mut p = PathNode::new(&mut b);
    p.set_svg(Some("M 0 0 L".to_owned()));
    let err = p.layout(&mut b).unwrap_err();
    assert!(matches!(err, SkeneError::Validation(_)));
    assert_eq!(b.live(ResourceKind::Path), 0);
}

#[test]
fn untouched_props_do_not_reparse() {
    let mut b = RecordingBackend::new();
    let mut s = b.make_surface(16, 16).unwrap();
    let mut p = PathNode::new(&mut b);
    p.set_svg(Some("M0 0 L1 1".to_owned()));
    p.render(&mut b, &mut s).unwrap();
    p.set_style(Some(PaintStyle::color("blue")));
    p.render(&mut b, &mut s).unwrap();
    assert_eq!(b.allocated(ResourceKind::Path), 1);
}

#[test]
fn delete_releases_path_and_paint() {
    let mut b = RecordingBackend::new();
    let mut p = PathNode::new(&mut b);
    p.layout(&mut b).unwrap();
    p.delete(&mut b);
    p.delete(&mut b);
    assert_eq!(b.live(ResourceKind::Path), 0);
    assert_eq!(b.live(ResourceKind::Paint), 0);
}
