use super::*;
use serde_json::json;

fn close(a: Color, b: Color) -> bool {
    (a.r - b.r).abs() < 1e-3
        && (a.g - b.g).abs() < 1e-3
        && (a.b - b.b).abs() < 1e-3
        && (a.a - b.a).abs() < 1e-3
}

#[test]
fn parses_hex_forms() {
    assert_eq!(parse_color_string("#ff0000").unwrap(), Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(parse_color_string("#f00").unwrap(), Color::rgba(1.0, 0.0, 0.0, 1.0));
    let c = parse_color_string("#0000ff80").unwrap();
    assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    assert!(parse_color_string("#12345").is_err());
    assert!(parse_color_string("#gg0000").is_err());
}

#[test]
fn parses_named_and_functional_colors() {
    assert_eq!(parse_color_string("black").unwrap(), Color::BLACK);
    assert_eq!(parse_color_string("DodgerBlue").unwrap(), Color::from_rgba8(30, 144, 255, 255));
    assert_eq!(parse_color_string("transparent").unwrap(), Color::TRANSPARENT);
    let c = parse_color_string("rgba(255, 0, 0, 0.5)").unwrap();
    assert!(close(c, Color::rgba(1.0, 0.0, 0.0, 0.5)));
    assert!(parse_color_string("notacolor").is_err());
}

#[test]
fn numeric_triples_default_alpha_to_one() {
    let c = resolve_color(&ColorDescriptor::Components(vec![255.0, 1.0, 0.0])).unwrap();
    assert!(close(c, Color::rgba(1.0, 1.0 / 255.0, 0.0, 1.0)));

    let c = resolve_color(&ColorDescriptor::Components(vec![255.0, 100.0, 10.0, 0.5])).unwrap();
    assert!((c.a - 0.5).abs() < 1e-6);

    assert!(resolve_color(&ColorDescriptor::Components(vec![1.0, 2.0])).is_err());
}

#[test]
fn float_buffers_pass_through() {
    let c = resolve_color(&ColorDescriptor::Float([0.25, 0.5, 0.75, 1.0])).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 1.0));
}

#[test]
fn deserializes_all_json_shapes() {
    let d: ColorDescriptor = serde_json::from_value(json!("#fff")).unwrap();
    assert_eq!(d, ColorDescriptor::css("#fff"));
    let d: ColorDescriptor = serde_json::from_value(json!([1, 2, 3])).unwrap();
    assert_eq!(d, ColorDescriptor::Components(vec![1.0, 2.0, 3.0]));
    let d: ColorDescriptor = serde_json::from_value(json!({"r": 0.5, "g": 0.5, "b": 0.5})).unwrap();
    assert_eq!(d, ColorDescriptor::Float([0.5, 0.5, 0.5, 1.0]));
}
