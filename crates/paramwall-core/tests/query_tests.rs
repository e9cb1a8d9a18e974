//! URL splitting, query iteration and single-rule evaluation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use paramwall_core::query::{count_params, query_params, split_url};
use paramwall_core::rule::{Callback, ParamRule, RuleKind};

#[test]
fn relative_urls_split_without_parsing() {
    let p = split_url("/products?page=1&sort=asc#top").unwrap();
    assert_eq!(p.prefix, "/products");
    assert_eq!(p.path, "/products");
    assert_eq!(p.query, "page=1&sort=asc");
    assert_eq!(p.fragment, Some("top"));

    let p = split_url("?x=1").unwrap();
    assert_eq!(p.path, "");
    assert_eq!(p.query, "x=1");

    // Only the first `?` separates the query.
    let p = split_url("/a?x=1?y").unwrap();
    assert_eq!(p.query, "x=1?y");
}

#[test]
fn absolute_urls_use_the_parsed_path() {
    let p = split_url("https://shop.example/api/users?id=3").unwrap();
    assert_eq!(p.prefix, "https://shop.example/api/users");
    assert_eq!(p.path, "/api/users");
    assert_eq!(p.query, "id=3");

    assert!(split_url("http://[broken/x?y=1").is_none());

    let p = split_url("http://shop.example?x=1").unwrap();
    assert_eq!(p.path, "/");
}

#[test]
fn absolute_and_relative_paths_match_byte_for_byte() {
    let abs = split_url("https://shop.example/café/a%2Fb?x=1").unwrap();
    let rel = split_url("/café/a%2Fb?x=1").unwrap();
    assert_eq!(abs.path, "/café/a%2Fb");
    assert_eq!(abs.path, rel.path);
}

#[test]
fn query_params_keep_raw_text() {
    let got: Vec<_> = query_params("a=1&&b&c=x=y&=v&d=%20")
        .map(|p| (p.raw, p.name, p.value))
        .collect();
    assert_eq!(
        got,
        vec![
            ("a=1", "a", "1"),
            ("b", "b", ""),
            ("c=x=y", "c", "x=y"),
            ("=v", "", "v"),
            ("d=%20", "d", "%20"),
        ]
    );
    assert_eq!(count_params("a=1&&b&"), 2);
    assert_eq!(count_params(""), 0);
}

#[test]
fn rule_kinds_evaluate() {
    assert!(ParamRule::any().check("q", "anything", None));
    assert!(ParamRule::new(RuleKind::KeyOnly).check("f", "", None));
    assert!(!ParamRule::new(RuleKind::KeyOnly).check("f", "1", None));

    let e = ParamRule::enumeration(["name", "date"]);
    assert!(e.check("sort", "date", None));
    assert!(!e.check("sort", "Date", None));

    let r = ParamRule::new(RuleKind::NumericRange { min: 1, max: 10 });
    assert!(r.check("page", "10", None));
    assert!(!r.check("page", "11", None));
    assert!(!r.check("page", "x", None));
}

#[test]
fn callback_and_inversion_evaluate() {
    let rule = ParamRule::new(RuleKind::Callback);
    assert!(!rule.check("token", "abc", None));

    let cb: Callback = Arc::new(|name: &str, value: &str| name == "token" && value.len() == 3);
    assert!(rule.check("token", "abc", Some(&cb)));
    assert!(!rule.check("token", "abcd", Some(&cb)));

    let not_admin = ParamRule::enumeration(["admin"]).inverted(true);
    assert!(!not_admin.check("role", "admin", None));
    assert!(not_admin.check("role", "guest", None));
}

#[test]
fn rules_render_in_grammar_form() {
    assert_eq!(ParamRule::any().to_string(), "");
    assert_eq!(ParamRule::enumeration(["b", "a"]).inverted(true).to_string(), "=![a,b]");
    assert_eq!(ParamRule::new(RuleKind::KeyOnly).to_string(), "=[]");
    assert_eq!(
        ParamRule::new(RuleKind::NumericRange { min: -1, max: 5 }).to_string(),
        "=[-1..5]"
    );
}
