use std::sync::Arc;

use regex::RegexBuilder;

use paramwall_core::plugin::ConstraintPlugin;
use paramwall_core::rule::Validator;

const PREFIX: &str = "regex:";

/// Whole-value regular expression: `regex:<expr>` or `/<expr>/`.
///
/// The slash form is claimed only when `<expr>` holds a regex
/// metacharacter; `/home/` is left to the enum parser as a literal path.
///
/// The `regex` crate guarantees linear-time matching; the compiled program
/// size is capped so a hostile rule cannot allocate without bound.
#[derive(Debug)]
pub struct RegexPlugin {
    size_limit: usize,
}

impl Default for RegexPlugin {
    fn default() -> Self {
        Self {
            size_limit: 1 << 20,
        }
    }
}

impl RegexPlugin {
    pub fn with_size_limit(size_limit: usize) -> Self {
        Self { size_limit }
    }

    fn expr(body: &str) -> Option<&str> {
        if let Some(e) = body.strip_prefix(PREFIX) {
            return Some(e);
        }
        body.strip_prefix('/')
            .and_then(|b| b.strip_suffix('/'))
            .filter(|e| e.contains(is_meta))
    }
}

fn is_meta(c: char) -> bool {
    matches!(
        c,
        '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
    )
}

impl ConstraintPlugin for RegexPlugin {
    fn name(&self) -> &str {
        "regex"
    }

    fn can_parse(&self, body: &str) -> bool {
        Self::expr(body).is_some()
    }

    fn parse(&self, _param: &str, body: &str) -> Result<Validator, String> {
        let expr = Self::expr(body).ok_or_else(|| format!("not a regex constraint: `{body}`"))?;
        if expr.is_empty() {
            return Err("empty regex".into());
        }
        let re = RegexBuilder::new(&format!("^(?:{expr})$"))
            .size_limit(self.size_limit)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Arc::new(move |v: &str| re.is_match(v)))
    }
}
