use std::sync::Arc;

use paramwall_core::plugin::ConstraintPlugin;
use paramwall_core::rule::Validator;

const PREFIX: &str = "glob:";

/// Shell-style wildcard over the whole value: `*` any run, `?` one byte.
///
/// Claims `glob:<pattern>` and any comma-free body containing `*`.
#[derive(Debug, Default)]
pub struct GlobPlugin;

impl ConstraintPlugin for GlobPlugin {
    fn name(&self) -> &str {
        "glob"
    }

    fn can_parse(&self, body: &str) -> bool {
        body.starts_with(PREFIX) || (body.contains('*') && !body.contains(','))
    }

    fn parse(&self, _param: &str, body: &str) -> Result<Validator, String> {
        let pattern = body.strip_prefix(PREFIX).unwrap_or(body);
        if pattern.is_empty() {
            return Err("empty glob pattern".into());
        }
        let pattern = pattern.as_bytes().to_vec();
        Ok(Arc::new(move |v: &str| glob_match(&pattern, v.as_bytes())))
    }
}

/// Iterative matcher. On mismatch it only rewinds to the most recent `*`,
/// so the cost is bounded by `len(pattern) * len(text)` with no
/// exponential blow-up.
pub fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                star = Some(p);
                mark = t;
                p += 1;
            }
            Some(&c) if c == b'?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some(s) => {
                    p = s + 1;
                    mark += 1;
                    t = mark;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == b'*')
}
