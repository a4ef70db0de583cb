use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        KinetypeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        KinetypeError::missing_content("x")
            .to_string()
            .contains("missing content:")
    );
    assert!(
        KinetypeError::unsupported("x")
            .to_string()
            .contains("unsupported:")
    );
    assert!(
        KinetypeError::recording("x")
            .to_string()
            .contains("recording error:")
    );
    assert!(
        KinetypeError::transcode("x")
            .to_string()
            .contains("transcode error:")
    );
}

#[test]
fn preconditions_are_classified() {
    assert!(KinetypeError::missing_content("no image").is_precondition());
    assert!(KinetypeError::unsupported("no ffmpeg").is_precondition());
    assert!(!KinetypeError::recording("pipe closed").is_precondition());
    assert!(!KinetypeError::Cancelled.is_precondition());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = KinetypeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
