use super::*;
use crate::foundation::core::Color;
use crate::render::backend::PaintState;
use serde_json::json;

#[derive(Default)]
struct TestPaint {
    state: PaintState,
}

impl PaintHandle for TestPaint {
    fn state(&self) -> &PaintState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PaintState {
        &mut self.state
    }
}

#[test]
fn applies_string_color_and_stroke_tokens() {
    let mut p = TestPaint::default();
    let style: PaintStyle =
        serde_json::from_value(json!({"color": "red", "style": "stroke", "strokeWidth": 3}))
            .unwrap();
    apply_paint_style(&mut p, &style).unwrap();
    assert_eq!(p.color(), Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(p.mode(), PaintMode::Stroke);
    assert_eq!(p.stroke_width(), 3.0);
}

#[test]
fn native_enum_values_are_accepted() {
    let style: PaintStyle =
        serde_json::from_value(json!({"style": 1, "blendMode": 24})).unwrap();
    assert_eq!(style.style, Some(PaintMode::Stroke));
    assert_eq!(style.blend_mode, Some(BlendMode::Multiply));

    let style: PaintStyle = serde_json::from_value(json!({"blendMode": "screen"})).unwrap();
    assert_eq!(style.blend_mode, Some(BlendMode::Screen));
}

#[test]
fn falsy_scalars_are_treated_as_unset() {
    let mut p = TestPaint::default();
    p.set_stroke_width(4.0);
    p.set_alpha(0.5);
    p.set_anti_alias(true);
    let style = PaintStyle {
        stroke_width: Some(0.0),
        stroke_miter: Some(0.0),
        alpha: Some(0.0),
        anti_alias: Some(false),
        blend_mode: Some(BlendMode::Clear),
        ..PaintStyle::default()
    };
    apply_paint_style(&mut p, &style).unwrap();
    assert_eq!(p.stroke_width(), 4.0);
    assert_eq!(p.alpha(), 0.5);
    assert!(p.anti_alias());
    assert_eq!(p.blend_mode(), BlendMode::SrcOver);
}

#[test]
fn empty_color_string_falls_back_to_black() {
    let mut p = TestPaint::default();
    p.set_color(Color::WHITE);
    apply_paint_style(&mut p, &PaintStyle::color("")).unwrap();
    assert_eq!(p.color(), Color::BLACK);
}

#[test]
fn numeric_color_is_used_as_given() {
    let mut p = TestPaint::default();
    let style: PaintStyle = serde_json::from_value(json!({"color": [0, 255, 0]})).unwrap();
    apply_paint_style(&mut p, &style).unwrap();
    assert_eq!(p.color(), Color::rgba(0.0, 1.0, 0.0, 1.0));
}

#[test]
fn invalid_color_is_a_validation_error() {
    let mut p = TestPaint::default();
    let err = apply_paint_style(&mut p, &PaintStyle::color("nope")).unwrap_err();
    assert!(matches!(err, crate::SkeneError::Validation(_)));
}

#[test]
fn repeated_application_is_idempotent() {
    let mut p = TestPaint::default();
    let style = PaintStyle {
        color: Some("#336699".into()),
        style: Some(PaintMode::Fill),
        ..PaintStyle::default()
    };
    apply_paint_style(&mut p, &style).unwrap();
    let first = *p.state();
    apply_paint_style(&mut p, &style).unwrap();
    assert_eq!(*p.state(), first);
}
