use super::*;
use crate::render::backend::ResourceKind;
use crate::render::recording::{DrawCommand, RecordingBackend};
use serde_json::json;

fn setup() -> (RecordingBackend, SceneGraph<RecordingBackend>) {
    (RecordingBackend::new(), SceneGraph::new())
}

#[test]
fn insert_before_orders_children() {
    let (mut b, mut g) = setup();
    let canvas = g.create(NodeKind::Canvas, &mut b);
    let a = g.create(NodeKind::Rect, &mut b);
    let bb = g.create(NodeKind::Rect, &mut b);
    let c = g.create(NodeKind::Rect, &mut b);
    g.append_child(canvas, a).unwrap();
    g.append_child(canvas, bb).unwrap();
    g.insert_before(canvas, c, bb).unwrap();
    assert_eq!(g.children(canvas).unwrap(), &[a, c, bb]);
    assert_eq!(g.parent(c), Some(canvas));
}

#[test]
fn appending_an_attached_child_moves_it() {
    let (mut b, mut g) = setup();
    let canvas = g.create(NodeKind::Canvas, &mut b);
    let a = g.create(NodeKind::Line, &mut b);
    let c = g.create(NodeKind::Line, &mut b);
    g.append_child(canvas, a).unwrap();
    g.append_child(canvas, c).unwrap();
    g.append_child(canvas, a).unwrap();
    assert_eq!(g.children(canvas).unwrap(), &[c, a]);
}

#[test]
fn leaves_cannot_take_children() {
    let (mut b, mut g) = setup();
    let rect = g.create(NodeKind::Rect, &mut b);
    let line = g.create(NodeKind::Line, &mut b);
    assert!(g.append_child(rect, line).unwrap_err().is_structural());
}

#[test]
fn cycles_are_rejected() {
    let (mut b, mut g) = setup();
    let outer = g.create(NodeKind::Canvas, &mut b);
    let surface = g.create(NodeKind::Surface, &mut b);
    g.append_child(outer, surface).unwrap();
    assert!(g.append_child(surface, outer).unwrap_err().is_structural());
}

#[test]
fn remove_child_deletes_subtree_and_invalidates_ids() {
    let (mut b, mut g) = setup();
    let canvas = g.create(NodeKind::Canvas, &mut b);
    let surface = g.create(NodeKind::Surface, &mut b);
    let inner = g.create(NodeKind::Canvas, &mut b);
    let text = g.create(NodeKind::Text, &mut b);
    g.append_to_root(canvas).unwrap();
    g.append_child(canvas, surface).unwrap();
    g.append_child(surface, inner).unwrap();
    g.append_child(inner, text).unwrap();

    g.remove_child(canvas, surface, &mut b).unwrap();
    assert!(g.children(canvas).unwrap().is_empty());
    assert!(!g.is_alive(text));
    assert!(g.get(inner).is_none());
    assert_eq!(b.live(ResourceKind::Font), 0);
    assert_eq!(b.live(ResourceKind::Paint), 0);
    assert_eq!(g.len(), 1);

    // The freed slot is reused under a new generation.
    let fresh = g.create(NodeKind::Line, &mut b);
    assert!(g.is_alive(fresh));
    assert_ne!(fresh, text);
    assert!(g.children(surface).unwrap_err().is_structural());
}

#[test]
fn removing_a_stranger_is_structural() {
    let (mut b, mut g) = setup();
    let canvas = g.create(NodeKind::Canvas, &mut b);
    let rect = g.create(NodeKind::Rect, &mut b);
    assert!(g.remove_child(canvas, rect, &mut b).unwrap_err().is_structural());
    assert!(g.remove_from_root(rect, &mut b).unwrap_err().is_structural());
}

#[test]
fn render_root_walks_in_paint_order_then_flushes() {
    let (mut b, mut g) = setup();
    let mut target = b.make_surface(64, 64).unwrap();
    let canvas = g.create(NodeKind::Canvas, &mut b);
    let rect = g.create(NodeKind::Rect, &mut b);
    let line = g.create(NodeKind::Line, &mut b);
    g.append_to_root(canvas).unwrap();
    g.append_child(canvas, rect).unwrap();
    g.append_child(canvas, line).unwrap();
    g.get_mut(canvas)
        .unwrap()
        .set_prop("rotate", &json!({"degree": 90, "px": 32, "py": 32}))
        .unwrap();

    g.render_root(&mut b, &mut target).unwrap();
    let kinds: Vec<&'static str> = b
        .commands_for(target.id())
        .map(|c| match c {
            DrawCommand::Save => "save",
            DrawCommand::Clear(_) => "clear",
            DrawCommand::Rotate { .. } => "rotate",
            DrawCommand::RRect { .. } => "rrect",
            DrawCommand::Line { .. } => "line",
            DrawCommand::Restore => "restore",
            DrawCommand::Flush => "flush",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        ["save", "clear", "rotate", "rrect", "line", "restore", "flush", "flush"]
    );
    assert!(!g.get(rect).unwrap().flags().layout);
}

#[test]
fn surface_renders_children_offscreen_and_composites() {
    let (mut b, mut g) = setup();
    let mut target = b.make_surface(64, 64).unwrap();
    let canvas = g.create(NodeKind::Canvas, &mut b);
    let surface = g.create(NodeKind::Surface, &mut b);
    let inner = g.create(NodeKind::Canvas, &mut b);
    let rect = g.create(NodeKind::Rect, &mut b);
    g.append_to_root(canvas).unwrap();
    g.append_child(canvas, surface).unwrap();
    g.append_child(surface, inner).unwrap();
    g.append_child(inner, rect).unwrap();

    g.render_root(&mut b, &mut target).unwrap();
    let on_target: Vec<_> = b.commands_for(target.id()).cloned().collect();
    assert!(on_target.iter().any(|c| matches!(c, DrawCommand::Image { .. })));
    assert!(!on_target.iter().any(|c| matches!(c, DrawCommand::RRect { .. })));
    let offscreen = b
        .commands()
        .iter()
        .filter(|r| r.surface != target.id())
        .any(|r| matches!(r.command, DrawCommand::RRect { .. }));
    assert!(offscreen);
    assert_eq!(b.live(ResourceKind::Image), 0);
}

#[test]
fn parent_type_rules_are_enforced() {
    let (mut b, mut g) = setup();
    let mut target = b.make_surface(64, 64).unwrap();

    let rect = g.create(NodeKind::Rect, &mut b);
    g.append_to_root(rect).unwrap();
    assert!(g.render_root(&mut b, &mut target).unwrap_err().is_structural());
    g.remove_from_root(rect, &mut b).unwrap();

    let surface = g.create(NodeKind::Surface, &mut b);
    g.append_to_root(surface).unwrap();
    assert!(g.render_root(&mut b, &mut target).unwrap_err().is_structural());
    g.remove_from_root(surface, &mut b).unwrap();

    let canvas = g.create(NodeKind::Canvas, &mut b);
    let nested = g.create(NodeKind::Canvas, &mut b);
    g.append_to_root(canvas).unwrap();
    g.append_child(canvas, nested).unwrap();
    assert!(g.render_root(&mut b, &mut target).unwrap_err().is_structural());
    // A failing child still pops the save point.
    assert_eq!(target.save_depth(), 0);
}

#[test]
fn rendering_a_deleted_node_is_structural() {
    let (mut b, mut g) = setup();
    let mut target = b.make_surface(64, 64).unwrap();
    let canvas = g.create(NodeKind::Canvas, &mut b);
    let rect = g.create(NodeKind::Rect, &mut b);
    g.append_to_root(canvas).unwrap();
    g.append_child(canvas, rect).unwrap();
    g.get_mut(rect).unwrap().delete(&mut b);
    assert!(g.render_root(&mut b, &mut target).unwrap_err().is_structural());
}

#[test]
fn stale_ids_fail_lookup() {
    let (mut b, mut g) = setup();
    let rect = g.create(NodeKind::Rect, &mut b);
    g.append_to_root(rect).unwrap();
    g.clear_root(&mut b).unwrap();
    assert!(g.get(rect).is_none());
    assert!(g.append_to_root(rect).unwrap_err().is_structural());
    assert_eq!(format!("{rect:?}"), "NodeId(0@gen0)");
    assert!(g.is_empty());
}

#[test]
fn clear_also_frees_detached_nodes() {
    let (mut b, mut g) = setup();
    let canvas = g.create(NodeKind::Canvas, &mut b);
    let rect = g.create(NodeKind::Rect, &mut b);
    let loose = g.create(NodeKind::Text, &mut b);
    g.append_to_root(canvas).unwrap();
    g.append_child(canvas, rect).unwrap();
    g.clear(&mut b).unwrap();
    assert!(g.is_empty());
    assert!(g.get(loose).is_none());
    assert!(g.root_children().is_empty());
    assert_eq!(b.live(ResourceKind::Paint), 0);
    assert_eq!(b.live(ResourceKind::Font), 0);
}
