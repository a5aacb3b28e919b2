use super::*;
use crate::host::props::{Props, apply_props};
use crate::render::backend::{PaintHandle, ResourceKind};
use crate::render::recording::{DrawCommand, RecordingBackend};
use crate::scene::node::Node;
use serde_json::json;

fn cycle(n: &mut SurfaceNode<RecordingBackend>, b: &mut RecordingBackend, parent: &mut <RecordingBackend as GraphicsBackend>::Surface) {
    let s = n.take_target(b).unwrap();
    n.put_target(s);
    n.composite(b, parent).unwrap();
}

#[test]
fn surface_is_allocated_lazily_once() {
    let mut b = RecordingBackend::new();
    let mut parent = b.make_surface(64, 64).unwrap();
    let mut n = SurfaceNode::new(&mut b);
    n.set_prop("width", &json!(20)).unwrap();
    n.set_prop("height", &json!(10)).unwrap();
    assert!(!n.is_allocated());

    cycle(&mut n, &mut b, &mut parent);
    cycle(&mut n, &mut b, &mut parent);
    // The parent plus one private surface.
    assert_eq!(b.allocated(ResourceKind::Surface), 2);
    assert!(n.is_allocated());
}

#[test]
fn composite_draws_snapshot_at_offset_and_drops_image() {
    let mut b = RecordingBackend::new();
    let mut parent = b.make_surface(64, 64).unwrap();
    let mut n = SurfaceNode::new(&mut b);
    n.set_prop("dx", &json!(3)).unwrap();
    n.set_prop("dy", &json!(4)).unwrap();
    cycle(&mut n, &mut b, &mut parent);

    let drawn: Vec<_> = b.commands_for(parent.id()).cloned().collect();
    assert!(matches!(
        drawn.as_slice(),
        [DrawCommand::Image { origin, .. }] if *origin == Point::new(3.0, 4.0)
    ));
    assert_eq!(b.live(ResourceKind::Image), 0);
}

#[test]
fn render_paint_is_rebuilt_only_after_a_paint_change() {
    let mut b = RecordingBackend::new();
    let mut parent = b.make_surface(64, 64).unwrap();
    let mut n = SurfaceNode::new(&mut b);
    n.set_paint(Some(PaintStyle {
        alpha: Some(0.5),
        ..PaintStyle::default()
    }));
    for _ in 0..3 {
        cycle(&mut n, &mut b, &mut parent);
    }
    assert_eq!(n.render_paint().unwrap().alpha(), 0.5);
    // Default paint plus a single render paint across three frames.
    assert_eq!(b.allocated(ResourceKind::Paint), 2);
    assert!(!n.flags.paint);

    n.set_paint(Some(PaintStyle {
        alpha: Some(0.25),
        ..PaintStyle::default()
    }));
    cycle(&mut n, &mut b, &mut parent);
    assert_eq!(n.render_paint().unwrap().alpha(), 0.25);
    assert_eq!(b.allocated(ResourceKind::Paint), 3);
    assert_eq!(b.live(ResourceKind::Paint), 2);

    n.set_paint(None);
    cycle(&mut n, &mut b, &mut parent);
    assert!(n.render_paint().is_none());
    assert_eq!(b.live(ResourceKind::Paint), 1);
}

#[test]
fn resize_after_allocation_keeps_the_first_surface() {
    let mut b = RecordingBackend::new();
    let mut parent = b.make_surface(64, 64).unwrap();
    let mut node = Node::Surface(SurfaceNode::new(&mut b));
    let Node::Surface(n) = &mut node else {
        unreachable!()
    };
    cycle(n, &mut b, &mut parent);

    let new = json!({"width": 50}).as_object().unwrap().clone();
    apply_props(&mut node, &new, &Props::new()).unwrap();
    let Node::Surface(n) = &mut node else {
        unreachable!()
    };
    assert!(n.flags.layout);
    assert_eq!(n.size(), (50, 100));

    let s = n.take_target(&mut b).unwrap();
    assert_eq!(s.size(), (100, 100));
    n.put_target(s);
    assert!(!n.flags.layout);
    assert_eq!(b.allocated(ResourceKind::Surface), 2);
}

#[test]
fn delete_releases_surface_and_paints() {
    let mut b = RecordingBackend::new();
    let mut parent = b.make_surface(64, 64).unwrap();
    let mut n = SurfaceNode::new(&mut b);
    n.set_paint(Some(PaintStyle::default()));
    cycle(&mut n, &mut b, &mut parent);
    n.delete(&mut b);
    n.delete(&mut b);
    assert_eq!(b.live(ResourceKind::Paint), 0);
    assert_eq!(b.live(ResourceKind::Surface), 1);
}
