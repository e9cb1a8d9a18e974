//! Plugin registry: claim order, compile cache and lifecycle hooks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use paramwall_core::plugin::{ConstraintPlugin, PluginRegistry};
use paramwall_core::rule::Validator;
use paramwall_core::ErrorCode;

/// Claims bodies starting with a fixed prefix and counts compiles.
struct Counting {
    name: &'static str,
    prefix: &'static str,
    fail: bool,
    compiles: AtomicUsize,
    closes: AtomicUsize,
}

impl Counting {
    fn new(name: &'static str, prefix: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            prefix,
            fail: false,
            compiles: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    fn failing(name: &'static str, prefix: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            prefix,
            fail: true,
            compiles: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }
}

impl ConstraintPlugin for Counting {
    fn name(&self) -> &str {
        self.name
    }
    fn can_parse(&self, body: &str) -> bool {
        body.starts_with(self.prefix)
    }
    fn parse(&self, _param: &str, body: &str) -> Result<Validator, String> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(format!("refused {body}"));
        }
        let want = body[self.prefix.len()..].to_string();
        Ok(Arc::new(move |v: &str| v == want))
    }
    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn unclaimed_body_returns_none() {
    let reg = PluginRegistry::with_plugins([Counting::new("eq", "eq:") as Arc<dyn ConstraintPlugin>]);
    assert!(reg.compile("page", "1,2").is_none());
    assert!(PluginRegistry::new().compile("page", "eq:1").is_none());
}

#[test]
fn identical_triples_compile_once() {
    let p = Counting::new("eq", "eq:");
    let reg = PluginRegistry::with_plugins([p.clone() as Arc<dyn ConstraintPlugin>]);

    let (name, v1) = reg.compile("page", "eq:7").unwrap().unwrap();
    assert_eq!(name, "eq");
    let (_, v2) = reg.compile("page", "eq:7").unwrap().unwrap();
    assert_eq!(p.compiles.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&v1, &v2));
    assert!(v1("7"));
    assert!(!v1("8"));

    // Different parameter, different key.
    reg.compile("size", "eq:7").unwrap().unwrap();
    assert_eq!(p.compiles.load(Ordering::SeqCst), 2);
    assert_eq!(reg.cache_len(), 2);

    reg.clear_cache();
    assert_eq!(reg.cache_len(), 0);
    reg.compile("page", "eq:7").unwrap().unwrap();
    assert_eq!(p.compiles.load(Ordering::SeqCst), 3);
}

#[test]
fn first_claimer_owns_the_body() {
    let first = Counting::failing("strict", "x:");
    let second = Counting::new("lenient", "x:");
    let reg = PluginRegistry::with_plugins([
        first.clone() as Arc<dyn ConstraintPlugin>,
        second.clone() as Arc<dyn ConstraintPlugin>,
    ]);

    let err = match reg.compile("q", "x:1").unwrap() {
        Ok(_) => panic!("expected plugin compile error"),
        Err(e) => e,
    };
    assert_eq!(err.code(), ErrorCode::Plugin);
    assert!(err.to_string().contains("strict"), "{err}");
    assert!(err.to_string().contains("refused x:1"), "{err}");
    // No fallback to the next plugin.
    assert_eq!(second.compiles.load(Ordering::SeqCst), 0);
    // Failures are not cached.
    assert_eq!(reg.cache_len(), 0);
    assert_eq!(reg.names(), vec!["strict", "lenient"]);
}

#[test]
fn detached_registry_has_own_cache() {
    let p = Counting::new("eq", "eq:");
    let reg = PluginRegistry::with_plugins([p.clone() as Arc<dyn ConstraintPlugin>]);
    reg.compile("a", "eq:1").unwrap().unwrap();

    let dry = reg.detached();
    assert_eq!(dry.cache_len(), 0);
    dry.compile("b", "eq:2").unwrap().unwrap();
    assert_eq!(reg.cache_len(), 1);
    assert_eq!(dry.names(), vec!["eq"]);
}

#[test]
fn close_calls_every_hook_and_drops_cache() {
    let a = Counting::new("a", "a:");
    let b = Counting::new("b", "b:");
    let reg = PluginRegistry::with_plugins([
        a.clone() as Arc<dyn ConstraintPlugin>,
        b.clone() as Arc<dyn ConstraintPlugin>,
    ]);
    reg.compile("p", "a:1").unwrap().unwrap();

    reg.close();
    assert_eq!(a.closes.load(Ordering::SeqCst), 1);
    assert_eq!(b.closes.load(Ordering::SeqCst), 1);
    assert_eq!(reg.cache_len(), 0);
}
