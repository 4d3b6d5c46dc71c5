use std::io::Write;
use usc_records::config::{MissingAttributePolicy, ProcessOptions};
use usc_records::RecordError;

#[test]
fn test_defaults_when_fields_are_omitted() {
    let options: ProcessOptions = serde_json::from_str("{}").expect("Failed to parse config");
    assert_eq!(options, ProcessOptions::default());
    assert_eq!(options.missing_attribute_policy, MissingAttributePolicy::Skip);
    assert!(options.report_coverage_gaps);
    assert_eq!(options.max_concurrent_documents, 4);
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "missingAttributePolicy": "strict",
            "reportCoverageGaps": false,
            "maxConcurrentDocuments": 8
        }}"#
    )
    .unwrap();

    let options = ProcessOptions::load_from_file(file.path()).unwrap();
    assert_eq!(options.missing_attribute_policy, MissingAttributePolicy::Strict);
    assert!(!options.report_coverage_gaps);
    assert_eq!(options.max_concurrent_documents, 8);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = ProcessOptions::load_from_file(&path).unwrap_err();
    match err {
        RecordError::Io { path: reported, .. } => assert!(reported.ends_with("absent.json")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unknown_policy_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"missingAttributePolicy": "abort"}}"#).unwrap();

    let err = ProcessOptions::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, RecordError::Config(_)), "{err:?}");
}
