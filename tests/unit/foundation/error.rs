use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SkeneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SkeneError::structural("x")
            .to_string()
            .contains("structural error:")
    );
    assert!(
        SkeneError::backend("x")
            .to_string()
            .contains("backend error:")
    );
    assert!(
        SkeneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SkeneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn structural_is_classified() {
    assert!(SkeneError::structural("bad tag").is_structural());
    assert!(!SkeneError::validation("bad color").is_structural());
}

#[test]
fn json_errors_become_serde() {
    let err: SkeneError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, SkeneError::Serde(_)));
}
