//! Unit tests for property source precedence and loading.

use camino::Utf8Path;
use rstest::rstest;
use serial_test::serial;
use test_helpers::{env, properties};

use super::*;
use crate::BootstrapError;

#[rstest]
#[case::optional_only(Some("opt"), None, None, "opt")]
#[case::required_beats_optional(Some("opt"), Some("req"), None, "req")]
#[case::system_beats_required(Some("opt"), Some("req"), Some("sys"), "sys")]
#[case::system_beats_optional(Some("opt"), None, Some("sys"), "sys")]
fn highest_precedence_source_wins(
    #[case] optional: Option<&str>,
    #[case] required: Option<&str>,
    #[case] system: Option<&str>,
    #[case] expected: &str,
) {
    let single = |v: Option<&str>| v.map(|v| properties::map(&[("shared", v)])).unwrap_or_default();
    let optional = optional.map(|v| properties::map(&[("shared", v)]));
    let merged = combine_property_sources(optional.as_ref(), &single(required), &single(system));
    assert_eq!(merged.get("shared").map(String::as_str), Some(expected));
}

#[test]
fn merge_keeps_disjoint_keys_from_every_source() {
    let optional = properties::map(&[("a", "1")]);
    let merged = combine_property_sources(
        Some(&optional),
        &properties::map(&[("b", "2")]),
        &properties::map(&[("c", "3")]),
    );
    assert_eq!(merged, properties::map(&[("a", "1"), ("b", "2"), ("c", "3")]));
}

#[test]
fn explicit_required_properties_skip_the_config_file() {
    let explicit = properties::map(&[("x", "1")]);
    let system = properties::map(&[(CONFIG_PROPERTY, "/does/not/exist.properties")]);
    let loaded = load_required_properties(Some(&explicit), &system).expect("explicit source");
    assert_eq!(loaded, explicit);
}

#[test]
fn missing_config_property_yields_empty_source() {
    let loaded = load_required_properties(None, &PropertyMap::new()).expect("empty source");
    assert!(loaded.is_empty());
}

#[test]
fn loads_required_properties_from_named_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow::anyhow!("utf-8 tempdir"))?;
    let path = properties::write_file(root, "app.properties", &[("service.name", "demo")])?;
    let system = properties::map(&[(CONFIG_PROPERTY, path.as_str())]);
    let loaded = load_required_properties(None, &system)?;
    assert_eq!(loaded, properties::map(&[("service.name", "demo")]));
    Ok(())
}

#[test]
fn unreadable_config_file_is_fatal() {
    let system = properties::map(&[(CONFIG_PROPERTY, "/definitely/missing/app.properties")]);
    let err = load_required_properties(None, &system).expect_err("missing file");
    match err {
        BootstrapError::ConfigFile { path, .. } => {
            assert_eq!(path.as_str(), "/definitely/missing/app.properties");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[cfg(feature = "toml")]
#[test]
fn loads_toml_files_by_extension() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow::anyhow!("utf-8 tempdir"))?;
    let path = properties::write_raw(root, "app.toml", "[service]\nname = \"demo\"\n")?;
    let loaded = load_properties_from(&path)?;
    assert_eq!(loaded, properties::map(&[("service.name", "demo")]));
    Ok(())
}

#[cfg(feature = "toml")]
#[test]
fn malformed_toml_is_a_file_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow::anyhow!("utf-8 tempdir"))?;
    let path = properties::write_raw(root, "app.toml", "port = ")?;
    let err = load_properties_from(&path).expect_err("invalid toml");
    assert!(matches!(err, BootstrapError::ConfigFile { .. }));
    Ok(())
}

#[test]
#[serial]
fn reads_prefixed_environment_as_system_properties() {
    let _scope = env::scope([
        ("BOOTSEQ_SYS_HTTP__PORT", Some("8080")),
        ("BOOTSEQ_SYS_CONFIG", Some("/etc/app.properties")),
        ("BOOTSEQ_OTHER", Some("ignored")),
    ]);
    let system = system_properties("BOOTSEQ_SYS_");
    assert_eq!(system.get("http.port").map(String::as_str), Some("8080"));
    assert_eq!(
        system.get(CONFIG_PROPERTY).map(String::as_str),
        Some("/etc/app.properties")
    );
    assert!(!system.values().any(|v| v == "ignored"));
}
