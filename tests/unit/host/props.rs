use super::*;
use crate::render::recording::RecordingBackend;
use crate::scene::flags::DirtyFlags;
use crate::scene::node::NodeKind;
use serde_json::json;

fn props(v: Value) -> Props {
    match v {
        Value::Object(m) => m,
        _ => panic!("props must be an object"),
    }
}

fn clean(kind: NodeKind, b: &mut RecordingBackend) -> Node<RecordingBackend> {
    let mut n = Node::create(kind, b);
    *n.flags_mut() = DirtyFlags::CLEAN;
    n
}

#[test]
fn equal_props_only_clear_dirty() {
    let mut b = RecordingBackend::new();
    let mut n = clean(NodeKind::Rect, &mut b);
    n.flags_mut().dirty = true;
    let p = props(json!({"width": 10}));
    apply_props(&mut n, &p, &p).unwrap();
    assert_eq!(n.flags(), DirtyFlags::CLEAN);
}

#[test]
fn non_layout_change_keeps_layout_clean() {
    let mut b = RecordingBackend::new();
    let mut n = clean(NodeKind::Text, &mut b);
    let old = props(json!({"text": "a", "fontSize": 20}));
    let new = props(json!({"text": "b", "fontSize": 20}));
    apply_props(&mut n, &new, &old).unwrap();
    let f = n.flags();
    assert!(f.dirty);
    assert!(!f.layout);
    assert!(!f.paint);
    assert_eq!(n.as_text().unwrap().text(), "b");
}

#[test]
fn layout_change_sets_layout_only() {
    let mut b = RecordingBackend::new();
    let mut n = clean(NodeKind::Rect, &mut b);
    let old = props(json!({"width": 10, "style": {"color": "red"}}));
    let new = props(json!({"width": 20, "style": {"color": "red"}}));
    apply_props(&mut n, &new, &old).unwrap();
    assert!(n.flags().layout);
    assert!(!n.flags().paint);
    assert_eq!(n.as_rect().unwrap().frame().2, 20.0);
}

#[test]
fn style_change_sets_paint_only() {
    let mut b = RecordingBackend::new();
    let mut n = clean(NodeKind::Line, &mut b);
    let old = props(json!({"x1": 1, "style": {"color": "red"}}));
    let new = props(json!({"x1": 1, "style": {"color": "blue"}}));
    apply_props(&mut n, &new, &old).unwrap();
    assert!(n.flags().paint);
    assert!(!n.flags().layout);
}

#[test]
fn fresh_props_against_empty_mark_layout_keys() {
    let mut b = RecordingBackend::new();
    let mut n = clean(NodeKind::Paragraph, &mut b);
    apply_props(&mut n, &props(json!({"x": 3, "width": 200})), &Props::new()).unwrap();
    assert!(n.flags().layout);
    assert_eq!(n.as_paragraph().unwrap().width(), 200.0);
}

#[test]
fn reserved_and_unknown_keys_are_skipped() {
    let mut b = RecordingBackend::new();
    let mut n = clean(NodeKind::Rect, &mut b);
    let new = props(json!({"children": [1], "key": "k", "ref": 1, "onClick": 1}));
    apply_props(&mut n, &new, &Props::new()).unwrap();
    assert!(!n.flags().dirty);
}

#[test]
fn invalid_value_is_a_validation_error() {
    let mut b = RecordingBackend::new();
    let mut n = clean(NodeKind::Rect, &mut b);
    let err = apply_props(&mut n, &props(json!({"x": "left"})), &Props::new()).unwrap_err();
    assert!(matches!(err, crate::SkeneError::Validation(_)));
}

#[test]
fn failing_update_leaves_node_untouched() {
    let mut b = RecordingBackend::new();
    let mut n = clean(NodeKind::Rect, &mut b);
    let old = props(json!({"width": 10, "height": 10}));
    let new = props(json!({"width": 40, "height": "tall"}));
    assert!(apply_props(&mut n, &new, &old).is_err());
    assert_eq!(n.as_rect().unwrap().frame(), (0.0, 0.0, 10.0, 10.0));
    assert_eq!(n.flags(), DirtyFlags::CLEAN);

    let fixed = props(json!({"width": 40, "height": 12}));
    apply_props(&mut n, &fixed, &old).unwrap();
    assert_eq!(n.as_rect().unwrap().frame(), (0.0, 0.0, 40.0, 12.0));
    assert!(n.flags().layout);
}

#[test]
fn check_props_reports_known_keys() {
    let p = props(json!({"x": 1, "key": "k", "bogus": true, "style": {"color": "red"}}));
    let known = check_props::<RecordingBackend>(NodeKind::Rect, &p).unwrap();
    let mut keys: Vec<&str> = known.iter().map(|(k, _)| *k).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["style", "x"]);
    assert!(check_props::<RecordingBackend>(NodeKind::Line, &props(json!({"x1": []}))).is_err());
}
