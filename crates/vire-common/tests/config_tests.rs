//! ---
//! vire_section: "01-core-functionality"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Shared primitives and utilities for the messaging model."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
use std::path::PathBuf;

use vire_common::config::AppConfig;
use vire_common::LogFormat;

#[test]
fn loads_first_existing_candidate() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.toml");
    let present = dir.path().join("vire.toml");
    std::fs::write(
        &present,
        r#"
[envelope]
emitter = "vire.cms.server"
body_layout_version = "2.1"

[envelope.metadata]
session = "42"

[logging]
format = "pretty"
"#,
    )
    .expect("write config");

    let loaded = AppConfig::load_with_source(&[missing, present.clone()]).expect("config loads");
    assert_eq!(loaded.source, present);
    assert_eq!(loaded.config.envelope.emitter, "vire.cms.server");
    assert_eq!(
        loaded.config.envelope.body_layout_version.as_deref(),
        Some("2.1")
    );
    assert_eq!(
        loaded.config.envelope.metadata.get("session").map(String::as_str),
        Some("42")
    );
    assert_eq!(loaded.config.logging.format, LogFormat::Pretty);
}

#[test]
fn reports_inspected_candidates_when_none_exist() {
    let candidates = [PathBuf::from("does/not/exist.toml")];
    let err = AppConfig::load(&candidates).expect_err("no config available");
    assert!(err.to_string().contains("does/not/exist.toml"));
}

#[test]
fn invalid_file_is_rejected_with_context() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), "[envelope]\nasynchronous = true\n").expect("write");
    let err = AppConfig::from_path(file.path()).expect_err("validation fails");
    assert!(err.to_string().contains("async_address"));
}
