use super::*;
use crate::foundation::core::Color;
use crate::render::recording::{DrawCommand, RecordingBackend};
use serde_json::json;

fn run(c: &mut CanvasNode) -> Vec<DrawCommand> {
    let mut b = RecordingBackend::new();
    let mut s = b.make_surface(8, 8).unwrap();
    c.begin(&mut b, &mut s).unwrap();
    c.end(&mut b, &mut s);
    b.commands().iter().map(|r| r.command.clone()).collect()
}

#[test]
fn default_clears_to_white() {
    let mut c = CanvasNode::new();
    assert_eq!(
        run(&mut c),
        vec![
            DrawCommand::Save,
            DrawCommand::Clear(Color::WHITE),
            DrawCommand::Restore,
            DrawCommand::Flush,
        ]
    );
}

#[test]
fn rotation_defaults_pivot_to_origin() {
    let mut c = CanvasNode::new();
    c.set_prop("clear", &json!("")).unwrap();
    c.set_prop("rotate", &json!({"degree": 45})).unwrap();
    assert_eq!(
        run(&mut c),
        vec![
            DrawCommand::Save,
            DrawCommand::Rotate {
                degrees: 45.0,
                px: 0.0,
                py: 0.0
            },
            DrawCommand::Restore,
            DrawCommand::Flush,
        ]
    );
}

#[test]
fn bad_clear_color_draws_nothing() {
    let mut b = RecordingBackend::new();
    let mut s = b.make_surface(8, 8).unwrap();
    let mut c = CanvasNode::new();
    c.set_prop("clear", &json!("nope")).unwrap();
    assert!(c.begin(&mut b, &mut s).is_err());
    assert!(b.commands().is_empty());
    assert_eq!(s.save_depth(), 0);
}

#[test]
fn null_clear_skips_clearing() {
    let mut c = CanvasNode::new();
    c.set_prop("clear", &json!(null)).unwrap();
    assert!(c.clear_color().is_none());
    assert_eq!(run(&mut c).len(), 3);
}

#[test]
fn delete_only_marks() {
    let mut b = RecordingBackend::new();
    let mut c = CanvasNode::new();
    c.delete(&mut b);
    assert!(c.deleted);
}
