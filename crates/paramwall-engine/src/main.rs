//! paramwall filter
//!
//! Loads a YAML config (first argument, default `paramwall.yaml`), then
//! reads URLs from stdin, one per line, and prints the verdict and the
//! normalized URL for each.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use paramwall_engine::config;

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "paramwall.yaml".to_string());

    let engine = match config::load_from_file(&path).and_then(|cfg| cfg.build_engine()) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(config = %path, code = e.code().as_str(), error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(config = %path, plugins = ?engine.plugin_names(), "paramwall ready");

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        let verdict = if engine.validate_url(url) { "ALLOW" } else { "DENY" };
        if writeln!(out, "{verdict} {url} -> {}", engine.normalize_url(url)).is_err() {
            break;
        }
    }

    engine.close();
    ExitCode::SUCCESS
}
