//! Behavioural tests for the configure and initialize pipeline.

mod common;

use bootseq::{Bootstrap, BootstrapError, BootstrapState, PropertyMap};
use common::{FakeBinder, RecordingLifecycle};
use rstest::rstest;
use test_helpers::properties;

fn bootstrap(binder: FakeBinder) -> (Bootstrap<FakeBinder>, RecordingLifecycle) {
    let lifecycle = RecordingLifecycle::default();
    let bootstrap = Bootstrap::with_binder(binder)
        .do_not_initialize_logging()
        .with_system_properties(PropertyMap::new())
        .with_environment(PropertyMap::new())
        .with_lifecycle_manager(lifecycle.clone())
        .quiet();
    (bootstrap, lifecycle)
}

fn error_texts(err: &BootstrapError) -> Vec<String> {
    err.as_configuration()
        .expect("configuration error")
        .errors()
        .iter()
        .map(|m| m.text().to_owned())
        .collect()
}

#[rstest]
#[case::optional_only(Some("o"), None, None, "o")]
#[case::required_over_optional(Some("o"), Some("r"), None, "r")]
#[case::system_over_required(None, Some("r"), Some("s"), "s")]
#[case::system_over_everything(Some("o"), Some("r"), Some("s"), "s")]
fn binder_sees_highest_precedence_value(
    #[case] optional: Option<&str>,
    #[case] required: Option<&str>,
    #[case] system: Option<&str>,
    #[case] expected: &str,
) {
    let (mut bootstrap, _) = bootstrap(FakeBinder::consuming(&["shared"]));
    if let Some(value) = optional {
        bootstrap = bootstrap.set_optional_property("shared", value);
    }
    if let Some(value) = required {
        bootstrap = bootstrap.set_required_property("shared", value);
    }
    if let Some(value) = system {
        bootstrap = bootstrap.with_system_properties(properties::map(&[("shared", value)]));
    }
    bootstrap.configure().expect("configure");
    let bound = bootstrap.binder().bound();
    assert_eq!(bound.len(), 1);
    assert_eq!(
        bound.first().and_then(|m| m.get("shared")).map(String::as_str),
        Some(expected)
    );
}

#[rstest]
#[case::one_of_one("${A}", 1)]
#[case::one_of_three("${SET}-${A}-${SET}", 1)]
#[case::two_of_three("${A}${SET}${B}", 2)]
#[case::three_of_three("${A}${B}${C}", 3)]
fn every_failed_marker_is_reported(#[case] value: &str, #[case] failures: usize) {
    let (bootstrap, _) = bootstrap(FakeBinder::consuming(&["service.url", "service.name"]));
    let mut bootstrap = bootstrap
        .with_environment(properties::map(&[("SET", "ok")]))
        .set_required_property("service.url", value)
        .set_required_property("service.name", "${SET}");
    let err = bootstrap.configure().expect_err("unresolved markers");
    let errors = error_texts(&err);
    assert_eq!(errors.len(), failures, "{errors:?}");
    assert!(errors.iter().all(|e| e.contains("'service.url'")));

    let bound = bootstrap.binder().bound().first().expect("bind ran");
    assert!(!bound.contains_key("service.url"));
    assert_eq!(bound.get("service.name").map(String::as_str), Some("ok"));
}

#[test]
fn unresolved_port_scenario() {
    let (bootstrap, _) = bootstrap(FakeBinder::consuming(&["service.port"]));
    let mut bootstrap = bootstrap.set_required_property("service.port", "${PORT}");
    let err = bootstrap.configure().expect_err("PORT is unset");
    assert_eq!(
        error_texts(&err),
        ["Configuration property 'service.port' references environment variable 'PORT' which is not set"]
    );
    let bound = bootstrap.binder().bound().first().expect("bind ran");
    assert!(!bound.contains_key("service.port"));
}

#[rstest]
#[case::valid(true)]
#[case::invalid(false)]
fn configure_twice_always_fails(#[case] valid: bool) {
    let (bootstrap, _) = bootstrap(FakeBinder::consuming(&["service.name"]));
    let key = if valid { "service.name" } else { "typo.setting" };
    let mut bootstrap = bootstrap.set_required_property(key, "x");
    assert_eq!(bootstrap.configure().is_ok(), valid);
    let err = bootstrap.configure().expect_err("second configure");
    assert!(matches!(err, BootstrapError::AlreadyConfigured));
    assert_eq!(bootstrap.binder().bound().len(), 1);
}

#[test]
fn initialize_configures_then_starts_once() {
    let (bootstrap, lifecycle) = bootstrap(FakeBinder::consuming(&["service.name"]));
    let mut bootstrap = bootstrap.set_required_property("service.name", "x");
    assert_eq!(bootstrap.state(), BootstrapState::Uninitialized);
    let injector = bootstrap.initialize().expect("initialize");
    assert!(injector.used_properties().contains("service.name"));
    assert_eq!(bootstrap.binder().bound().len(), 1);
    assert_eq!(lifecycle.starts(), 1);
    assert_eq!(bootstrap.state(), BootstrapState::Initialized);

    let err = bootstrap.initialize().expect_err("second initialize");
    assert!(matches!(err, BootstrapError::AlreadyInitialized));
    assert_eq!(lifecycle.starts(), 1);
}

#[test]
fn failed_configuration_never_starts_components() {
    let (bootstrap, lifecycle) = bootstrap(FakeBinder::consuming(&[]));
    let mut bootstrap = bootstrap.set_required_property("typo.setting", "x");
    assert!(bootstrap.initialize().is_err());
    assert_eq!(lifecycle.starts(), 0);
    assert_eq!(bootstrap.state(), BootstrapState::Configured);
}

#[test]
fn unused_required_key_scenario() {
    let (bootstrap, _) = bootstrap(FakeBinder::consuming(&["service.name"]));
    let mut bootstrap = bootstrap.set_required_properties(properties::map(&[
        ("service.name", "x"),
        ("typo.setting", "y"),
    ]));
    let err = bootstrap.configure().expect_err("typo.setting is unused");
    assert_eq!(
        error_texts(&err),
        ["Configuration property 'typo.setting' was not used"]
    );
}

#[test]
fn unconsumed_system_and_optional_keys_are_exempt() {
    let (bootstrap, _) = bootstrap(FakeBinder::consuming(&[]));
    let mut bootstrap = bootstrap
        .set_optional_property("optional.only", "x")
        .with_system_properties(properties::map(&[("system.only", "y")]));
    let used = bootstrap.configure().expect("nothing required");
    assert!(used.is_empty());
}

#[test]
fn required_key_shadowed_by_system_is_still_checked() {
    let (bootstrap, _) = bootstrap(FakeBinder::consuming(&[]));
    let mut bootstrap = bootstrap
        .set_required_property("shared", "r")
        .with_system_properties(properties::map(&[("shared", "s")]));
    let err = bootstrap.configure().expect_err("shared is unused");
    assert_eq!(error_texts(&err), ["Configuration property 'shared' was not used"]);
}

#[test]
fn two_warnings_scenario_succeeds() {
    let binder = FakeBinder::consuming(&["service.name"])
        .with_warning("first deprecation")
        .with_warning("second deprecation");
    let (bootstrap, _) = bootstrap(binder);
    let mut bootstrap = bootstrap.set_required_property("service.name", "x");
    let used = bootstrap.configure().expect("warnings alone do not fail");
    assert_eq!(used.into_iter().collect::<Vec<_>>(), ["service.name"]);
}

#[test]
fn composite_failure_carries_every_error_and_warning() {
    let binder = FakeBinder::consuming(&["service.name"])
        .with_warning("deprecated")
        .with_error("bad value");
    let (bootstrap, _) = bootstrap(binder);
    let mut bootstrap = bootstrap.set_required_properties(properties::map(&[
        ("service.name", "x"),
        ("service.url", "${MISSING}"),
        ("typo.setting", "y"),
    ]));
    let err = bootstrap.configure().expect_err("three errors");
    let composite = err.as_configuration().expect("composite failure");
    assert_eq!(composite.errors().len(), 3);
    assert_eq!(composite.warnings().len(), 1);

    let rendered = err.to_string();
    assert!(rendered.starts_with("Configuration errors:\n\n1) "));
    assert!(rendered.contains("Configuration warnings:\n\n1) deprecated\n"));
    assert!(rendered.ends_with("3 errors"));
}
