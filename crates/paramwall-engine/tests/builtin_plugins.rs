//! Built-in constraint plugins as seen through rule sources.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use paramwall_core::error::ErrorCode;
use paramwall_engine::plugins::glob::glob_match;
use paramwall_engine::plugins::{BuiltinPlugin, RegexPlugin};
use paramwall_engine::Engine;

fn engine(rules: &str) -> Engine {
    Engine::new(rules).expect("rules must load")
}

#[test]
fn range() {
    let e = engine("page=[1-100]&temp=[-20..40]");
    assert!(e.validate_param("/", "page", "1"));
    assert!(e.validate_param("/", "page", "100"));
    assert!(!e.validate_param("/", "page", "0"));
    assert!(!e.validate_param("/", "page", "abc"));
    assert!(e.validate_param("/", "temp", "-20"));
    assert!(!e.validate_param("/", "temp", "41"));

    assert_eq!(Engine::new("x=[9-1]").err().unwrap().code(), ErrorCode::Plugin);
}

#[test]
fn compare() {
    let e = engine("a=[>10]&b=[<=3]&c=[!=0]&d=[==7]&f=[>=1]&g=[<5]");
    assert!(e.validate_param("/", "a", "11"));
    assert!(!e.validate_param("/", "a", "10"));
    assert!(e.validate_param("/", "b", "3"));
    assert!(!e.validate_param("/", "b", "4"));
    assert!(e.validate_param("/", "c", "5"));
    assert!(!e.validate_param("/", "c", "0"));
    assert!(e.validate_param("/", "d", "7"));
    assert!(e.validate_param("/", "f", "1"));
    assert!(!e.validate_param("/", "g", "5"));
    assert!(!e.validate_param("/", "a", "eleven"));

    assert_eq!(Engine::new("x=[>1a]").err().unwrap().code(), ErrorCode::Plugin);
    assert!(engine("n=[> -3]").validate_param("/", "n", "0"));
}

#[test]
fn operator_led_literals_stay_enums() {
    let e = engine("x=[<none>]&y=[>abc,!=x]");
    assert!(e.validate_param("/", "x", "<none>"));
    assert!(!e.validate_param("/", "x", "5"));
    assert!(e.validate_param("/", "y", ">abc"));
    assert!(e.validate_param("/", "y", "!=x"));
    assert!(!e.validate_param("/", "y", "abc"));
}

#[test]
fn length() {
    let e = engine("code=[len:3]&name=[len:1-4]&tag=[len:0..2]");
    assert!(e.validate_param("/", "code", "abc"));
    assert!(!e.validate_param("/", "code", "ab"));
    assert!(e.validate_param("/", "name", "abcd"));
    assert!(!e.validate_param("/", "name", ""));
    assert!(e.validate_param("/", "tag", ""));

    let err = Engine::new("x=[len:5-2]").err().unwrap();
    assert_eq!(err.code(), ErrorCode::Plugin);
    assert!(err.to_string().contains("length"), "{err}");
}

#[test]
fn glob() {
    let e = engine("img=[img_*.png]&f=[glob:a?c]");
    assert!(e.validate_param("/", "img", "img_cat.png"));
    assert!(e.validate_param("/", "img", "img_.png"));
    assert!(!e.validate_param("/", "img", "img_cat.jpg"));
    assert!(e.validate_param("/", "f", "abc"));
    assert!(!e.validate_param("/", "f", "abbc"));

    // Comma lists with `*` stay enums.
    let e = engine("v=[a*,b]");
    assert!(e.validate_param("/", "v", "a*"));
    assert!(!e.validate_param("/", "v", "ax"));
}

#[test]
fn glob_matcher() {
    assert!(glob_match(b"*", b""));
    assert!(glob_match(b"a*b*c", b"aXXbYYc"));
    assert!(!glob_match(b"a*b*c", b"aXXbYY"));
    assert!(glob_match(b"??", b"ab"));
    assert!(!glob_match(b"??", b"abc"));
    let text = "a".repeat(5000);
    assert!(!glob_match(b"*a*a*a*a*a*b", text.as_bytes()));
}

#[test]
fn regex_is_anchored() {
    let e = engine("slug=[/[a-z]+/]&id=[regex:\\d{2,4}]");
    assert!(e.validate_param("/", "slug", "hello"));
    assert!(!e.validate_param("/", "slug", "hello1"));
    assert!(e.validate_param("/", "id", "123"));
    assert!(!e.validate_param("/", "id", "1"));

    assert_eq!(Engine::new("x=[regex:(]").err().unwrap().code(), ErrorCode::Plugin);
}

#[test]
fn slash_wrapped_literal_is_not_a_regex() {
    let e = engine("a=[/home/]&b=[/a.b/]");
    assert!(e.validate_url("/?a=/home/"));
    assert!(!e.validate_url("/?a=home"));
    // A metacharacter makes it a regex.
    assert!(e.validate_param("/", "b", "axb"));
    assert!(!e.validate_param("/", "b", "/a.b/"));
}

#[test]
fn regex_size_limit() {
    let err = Engine::builder()
        .without_builtin_plugins()
        .plugin(RegexPlugin::with_size_limit(64))
        .build("x=[regex:\\w{500}]")
        .err()
        .unwrap();
    assert_eq!(err.code(), ErrorCode::Plugin);
}

#[test]
fn builtin_selection() {
    let e = Engine::builder()
        .builtin_plugins(&[BuiltinPlugin::Compare])
        .build("page=[1-10]&n=[>1]")
        .unwrap();
    assert_eq!(e.plugin_names(), vec!["compare"]);
    // Without the range plugin `1-10` is a literal.
    assert!(e.validate_param("/", "page", "1-10"));
    assert!(!e.validate_param("/", "page", "5"));
    assert!(e.validate_param("/", "n", "2"));
}
