#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use paramwall_engine::config;
use paramwall_engine::plugins::BuiltinPlugin;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
limits:
  max_url: 123 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");

    let bad_top = "version: 1\nrulez: page\n";
    assert!(config::load_from_str(bad_top).is_err());
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert!(cfg.rules.is_empty());
    assert_eq!(cfg.plugins.builtin, BuiltinPlugin::ALL.to_vec());
    assert!(!cfg.grammar.native_ranges);
    assert_eq!(cfg.limits.max_params, 128);
}

#[test]
fn rejects_bad_values() {
    for bad in [
        "version: 2\n",
        "version: 1\nplugins:\n  builtin: [range, nope]\n",
        "version: 1\nlimits:\n  max_params: 129\n",
        "version: 1\nlimits:\n  max_url_len: 0\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.code().as_str(), "INVALID_CONFIG", "config={bad}");
    }

    let err = config::load_from_str("version: 1\nlimits:\n  max_rules_bytes: 4\nrules: page&sort\n")
        .expect_err("rules over limit");
    assert_eq!(err.code().as_str(), "LIMIT_EXCEEDED");
}

#[test]
fn builds_engine_from_config() {
    let src = r#"
version: 1
rules: |
  page=[1-10]
  /api/*?*
grammar:
  native_ranges: false
plugins:
  builtin: [range]
limits:
  max_url_len: 2048
"#;
    let cfg = config::load_from_str(src).unwrap();
    let engine = cfg.build_engine().unwrap();
    assert_eq!(engine.plugin_names(), vec!["range"]);
    assert_eq!(engine.limits().max_url_len, 2048);
    assert!(engine.validate_url("/?page=3"));
    assert!(engine.validate_url("/api/x?anything=1"));
    assert!(!engine.validate_url("/?page=30"));
}

#[test]
fn rule_errors_surface_from_build() {
    let cfg = config::load_from_str("version: 1\nrules: \"page=[\"\n").unwrap();
    let err = cfg.build_engine().err().unwrap();
    assert_eq!(err.code().as_str(), "SYNTAX_ERROR");
}

#[test]
fn missing_file_is_config_error() {
    let err = config::load_from_file("tests/does-not-exist.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
}
