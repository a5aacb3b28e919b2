use super::*;
use serde_json::json;

#[test]
fn defaults_match_original_grace_delay() {
    let opts = MountOpts::default();
    assert_eq!(opts.frameloop, FrameloopMode::Always);
    assert_eq!(opts.unmount_grace_ms, 500);
    assert_eq!(opts.dpr, 1.0);
}

#[test]
fn deserializes_partial_camel_case() {
    let opts: MountOpts =
        serde_json::from_value(json!({"frameloop": "demand", "unmountGraceMs": 10})).unwrap();
    assert_eq!(opts.frameloop, FrameloopMode::Demand);
    assert_eq!(opts.unmount_grace_ms, 10);
    assert_eq!(opts.dpr, 1.0);
}

#[test]
fn frameloop_parses_case_insensitively() {
    assert_eq!("Never".parse::<FrameloopMode>().unwrap(), FrameloopMode::Never);
    assert!("sometimes".parse::<FrameloopMode>().is_err());
}
