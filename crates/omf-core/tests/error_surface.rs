use omf_core::errors::{ErrorInfo, OmfError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("len", "3")
        .with_context("expected", "4")
}

#[test]
fn config_error_surface() {
    let err = OmfError::Config(sample_info("mask-length", "mask length mismatch"));
    assert_eq!(err.info().code, "mask-length");
    assert!(err.info().context.contains_key("len"));
}

#[test]
fn missing_artifact_error_surface() {
    let err = OmfError::MissingArtifact(
        ErrorInfo::new("artifact-missing", "no such model").with_hint("train with persistence"),
    );
    assert_eq!(err.info().code, "artifact-missing");
    let rendered = err.to_string();
    assert!(rendered.starts_with("missing artifact:"));
    assert!(rendered.contains("hint: train with persistence"));
}

#[test]
fn training_error_surface() {
    let err = OmfError::training("single-class", "only one class present");
    assert!(matches!(&err, OmfError::Training(info) if info.code == "single-class"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = OmfError::Io(sample_info("artifact-write", "disk full"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Io");
    let decoded: OmfError = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, err);
}
