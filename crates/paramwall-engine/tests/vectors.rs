//! Table-driven URL vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use paramwall_engine::Engine;

use vector_loader::VectorFile;

fn load(name: &str) -> VectorFile {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

fn run(name: &str) {
    let file = load(name);
    let engine = Engine::new(&file.rules).unwrap();
    for v in &file.cases {
        assert_eq!(engine.validate_url(&v.url), v.valid, "{}: {}", v.description, v.url);
        assert_eq!(
            engine.normalize_url(&v.url),
            v.expected_normalized(),
            "{}: {}",
            v.description,
            v.url
        );
    }
}

#[test]
fn storefront_vectors() {
    run("storefront.json");
}

#[test]
fn wildcard_vectors() {
    run("wildcards.json");
}
