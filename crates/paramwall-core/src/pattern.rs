//! URL pattern matching and specificity scoring.
//!
//! Patterns are plain strings with `*` wildcards. Everything here is a
//! single forward scan over segments: there is no regex and no
//! backtracking, so an adversarial path or pattern costs at most
//! `O(len(path) + len(pattern))`.
//!
//! Matching rules:
//! - exact equality, or the pattern `*`, always matches;
//! - a trailing `*` is a prefix match cut at a segment boundary
//!   (`/api/*` and `/api*` match `/api` and `/api/x`, never `/apiv2`);
//! - any other `*` matches exactly one non-empty segment.

use std::cmp::Ordering;

/// Collapse `*` runs, resolve `.`/`..` segments and add a leading `/`
/// unless the pattern starts with `*`.
pub fn normalize_pattern(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len() + 1);
    let mut prev_star = false;
    for c in pattern.chars() {
        let star = c == '*';
        if !(star && prev_star) {
            collapsed.push(c);
        }
        prev_star = star;
    }

    if !collapsed.starts_with('*') && !collapsed.starts_with('/') {
        collapsed.insert(0, '/');
    }
    resolve_dots(&collapsed)
}

/// Normalize a request path the same way patterns are stored, minus the
/// wildcard handling. An empty path is `/`.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        resolve_dots(path)
    } else {
        resolve_dots(&format!("/{path}"))
    }
}

fn resolve_dots(s: &str) -> String {
    let absolute = s.starts_with('/');
    let trailing = s.len() > 1 && s.ends_with('/');

    let mut segs: Vec<&str> = Vec::new();
    for seg in s.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segs.pop();
            }
            seg => segs.push(seg),
        }
    }

    let mut out = String::with_capacity(s.len());
    if absolute {
        out.push('/');
    }
    out.push_str(&segs.join("/"));
    if trailing && !segs.is_empty() {
        out.push('/');
    }
    out
}

/// Does `path` fall under `pattern`? Both are expected in normal form.
pub fn url_matches(path: &str, pattern: &str) -> bool {
    if path == pattern || pattern == "*" {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
        return prefix_matches(path, prefix);
    }

    if pattern.contains('*') {
        return segments_match(path, pattern);
    }

    false
}

fn prefix_matches(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }

    if prefix.contains('*') {
        let mut path_segs = path.split('/');
        return prefix
            .split('/')
            .all(|p| matches!(path_segs.next(), Some(s) if segment_matches(p, s)));
    }

    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn segments_match(path: &str, pattern: &str) -> bool {
    let mut path_segs = path.split('/');
    let mut pat_segs = pattern.split('/');
    loop {
        match (pat_segs.next(), path_segs.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if segment_matches(p, s) => {}
            _ => return false,
        }
    }
}

#[inline]
fn segment_matches(pattern_seg: &str, seg: &str) -> bool {
    if pattern_seg == "*" {
        !seg.is_empty()
    } else {
        pattern_seg == seg
    }
}

/// Specificity score of a pattern; higher is more specific.
pub fn specificity(pattern: &str) -> i64 {
    let segments = pattern.split('/').filter(|s| !s.is_empty()).count() as i64;
    let wildcards = wildcard_count(pattern) as i64;

    let mut score = segments * 100;
    if wildcards == 0 {
        score += 1500;
    } else {
        score -= wildcards * 200;
        if pattern.ends_with('*') {
            score -= 300;
        }
        if pattern.find('*').is_some_and(|i| i + 1 < pattern.len()) {
            score -= 100;
        }
    }

    let slashes = pattern.matches('/').count() as i64;
    if slashes > 1 {
        score += slashes * 50;
    }
    score
}

fn wildcard_count(pattern: &str) -> usize {
    pattern.bytes().filter(|b| *b == b'*').count()
}

/// Ranking key for a pattern. `Ord` puts the more specific pattern last:
/// higher score, then fewer wildcards, then the longer pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specificity {
    pub score: i64,
    pub wildcards: usize,
    pub len: usize,
}

impl Specificity {
    pub fn of(pattern: &str) -> Self {
        Self {
            score: specificity(pattern),
            wildcards: wildcard_count(pattern),
            len: pattern.len(),
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.wildcards.cmp(&self.wildcards))
            .then_with(|| self.len.cmp(&other.len))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order over patterns: specificity first, then byte order (the
/// smaller pattern ranks higher) so the choice is always deterministic.
pub fn compare_specificity(a: &str, b: &str) -> Ordering {
    Specificity::of(a)
        .cmp(&Specificity::of(b))
        .then_with(|| b.cmp(a))
}
