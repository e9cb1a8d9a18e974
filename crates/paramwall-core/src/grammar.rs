//! Rule-language parser.
//!
//! A rule source is a list of clauses separated by `;` or newlines. A clause
//! is either global (`&`-separated parameter rules) or URL-scoped
//! (`<pattern>?<param-rules>`). Separators inside `[...]` never split.
//!
//! Parameter rule forms, highest precedence first:
//!
//! | form              | meaning                                   |
//! |-------------------|-------------------------------------------|
//! | `name=[]`         | key only, value must be empty             |
//! | `name=[?]`        | delegate to the engine callback           |
//! | `name=![...]`     | any form below, result inverted           |
//! | `name=[body]`     | plugin, else `a,b,c` enum / single literal |
//! | `name[]`, `name`  | any value                                 |
//! | `name=[*]`        | any value                                 |
//! | `name=value`      | single literal, same as `name=[value]`    |
//! | `*`               | allow every parameter in this scope       |
//!
//! Parsing is all-or-nothing: the first error aborts the whole source.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ParamwallError, Result};
use crate::limits::Limits;
use crate::pattern::normalize_pattern;
use crate::plugin::{ConstraintPlugin, PluginRegistry};
use crate::rule::{ParamRule, RuleKind, ALLOW_ALL};

/// Parameter rules keyed by name.
pub type ParamMap = BTreeMap<String, ParamRule>;

/// Result of a successful parse.
#[derive(Debug, Clone, Default)]
pub struct ParsedRules {
    /// Rules applying to every path.
    pub global: ParamMap,
    /// Rules per normalized URL pattern.
    pub urls: BTreeMap<String, ParamMap>,
}

impl ParsedRules {
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.urls.is_empty()
    }

    /// Every parameter name mentioned anywhere, global names first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.global
            .keys()
            .chain(self.urls.values().flat_map(|m| m.keys()))
            .map(String::as_str)
    }

    /// Serialize back to the rule grammar. Parsing the output yields an
    /// equivalent rule set.
    pub fn to_rule_string(&self) -> String {
        let mut clauses = Vec::with_capacity(self.urls.len() + 1);
        if !self.global.is_empty() {
            clauses.push(render_params(&self.global));
        }
        for (pattern, params) in &self.urls {
            clauses.push(format!("{pattern}?{}", render_params(params)));
        }
        clauses.join(";")
    }
}

pub fn render_params(params: &ParamMap) -> String {
    let mut items: Vec<String> = params
        .iter()
        .filter(|(name, _)| name.as_str() != ALLOW_ALL)
        .map(|(name, rule)| format!("{name}{rule}"))
        .collect();
    // `*` goes last so a global clause never starts with it.
    if params.contains_key(ALLOW_ALL) {
        items.push(ALLOW_ALL.to_string());
    }
    items.join("&")
}

/// Grammar switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarOptions {
    /// Parse unclaimed `min-max` / `min..max` bodies as a built-in numeric
    /// range instead of an enum literal.
    #[serde(default)]
    pub native_ranges: bool,
}

/// Rule-source parser bound to a plugin registry and a set of limits.
pub struct RuleParser<'a> {
    plugins: &'a PluginRegistry,
    limits: &'a Limits,
    options: GrammarOptions,
}

enum Clause<'s> {
    Global(&'s str),
    Url { pattern: &'s str, body: &'s str },
}

impl<'a> RuleParser<'a> {
    pub fn new(plugins: &'a PluginRegistry, limits: &'a Limits) -> Self {
        Self {
            plugins,
            limits,
            options: GrammarOptions::default(),
        }
    }

    pub fn options(mut self, options: GrammarOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse(&self, source: &str) -> Result<ParsedRules> {
        ParamwallError::check_limit("rule source", source.len(), self.limits.max_rules_bytes)?;

        let mut out = ParsedRules::default();
        for clause in split_top_level(source, |c| c == ';' || c == '\n')? {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            match classify(clause)? {
                Clause::Global(body) => self.parse_params(body, &mut out.global)?,
                Clause::Url { pattern, body } => {
                    let pattern = self.parse_pattern(pattern)?;
                    let params = out.urls.entry(pattern).or_default();
                    self.parse_params(body, params)?;
                }
            }
        }

        tracing::debug!(
            global = out.global.len(),
            urls = out.urls.len(),
            "rule source parsed"
        );
        Ok(out)
    }

    fn parse_pattern(&self, raw: &str) -> Result<String> {
        let raw = raw.trim();
        ParamwallError::check_limit("url pattern", raw.len(), self.limits.max_url_len)?;
        if raw.is_empty() {
            return Err(ParamwallError::syntax("empty url pattern"));
        }
        if let Some(c) = raw
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '[' | ']' | '?' | '#' | '&'))
        {
            return Err(ParamwallError::syntax(format!(
                "invalid character {c:?} in url pattern `{raw}`"
            )));
        }
        Ok(normalize_pattern(raw))
    }

    fn parse_params(&self, body: &str, params: &mut ParamMap) -> Result<()> {
        for item in split_top_level(body, |c| c == '&')? {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (name, rule) = self.parse_param(item)?;
            if params.insert(name.clone(), rule).is_some() {
                tracing::debug!(param = %name, "parameter rule redefined; later rule wins");
            }
        }
        Ok(())
    }

    fn parse_param(&self, item: &str) -> Result<(String, ParamRule)> {
        if item == ALLOW_ALL {
            return Ok((ALLOW_ALL.to_string(), ParamRule::any()));
        }

        let Some(open) = item.find('[') else {
            return match item.split_once('=') {
                Some((name, value)) => {
                    let name = self.check_name(name.trim())?;
                    let value = value.trim();
                    let rule = if value.is_empty() {
                        ParamRule::new(RuleKind::KeyOnly)
                    } else {
                        ParamRule::enumeration([value])
                    };
                    Ok((name, rule))
                }
                None => Ok((self.check_name(item)?, ParamRule::any())),
            };
        };

        if matching_bracket(item, open) != Some(item.len() - 1) {
            return Err(ParamwallError::syntax(format!(
                "unexpected characters after constraint in `{item}`"
            )));
        }
        let body = item[open + 1..item.len() - 1].trim();

        let mut head = &item[..open];
        let inverted = head.ends_with('!');
        if inverted {
            head = &head[..head.len() - 1];
        }
        let had_eq = head.ends_with('=');
        if had_eq {
            head = &head[..head.len() - 1];
        }

        let name = self.check_name(head.trim())?;
        let kind = self.parse_constraint(&name, body, had_eq)?;
        Ok((name, ParamRule { kind, inverted }))
    }

    fn parse_constraint(&self, name: &str, body: &str, had_eq: bool) -> Result<RuleKind> {
        match body {
            "" if had_eq => return Ok(RuleKind::KeyOnly),
            "" => return Ok(RuleKind::Any),
            "?" => return Ok(RuleKind::Callback),
            "*" => return Ok(RuleKind::Any),
            _ => {}
        }

        ParamwallError::check_limit("constraint", body.len(), self.limits.max_constraint_len)?;

        if let Some(compiled) = self.plugins.compile(name, body) {
            let (plugin, validator) = compiled?;
            return Ok(RuleKind::Plugin {
                plugin,
                body: body.to_string(),
                validator,
            });
        }

        if self.options.native_ranges {
            if let Some((min, max)) = parse_int_range(body) {
                if min > max {
                    return Err(ParamwallError::syntax(format!(
                        "range for `{name}` has min {min} greater than max {max}"
                    )));
                }
                return Ok(RuleKind::NumericRange { min, max });
            }
        }

        let values: Vec<&str> = body
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(ParamwallError::syntax(format!("empty value list for `{name}`")));
        }
        Ok(ParamRule::enumeration(values).kind)
    }

    fn check_name(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(ParamwallError::syntax("empty parameter name"));
        }
        if name.len() > self.limits.max_param_name_len {
            return Err(ParamwallError::syntax(format!(
                "parameter name longer than {} bytes",
                self.limits.max_param_name_len
            )));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(ParamwallError::syntax(format!(
                "invalid character in parameter name `{name}`"
            )));
        }
        Ok(name.to_string())
    }
}

/// Stateless syntax check with default limits and a throwaway registry
/// built from `plugins`.
pub fn check_rules(source: &str, plugins: &[Arc<dyn ConstraintPlugin>]) -> Result<()> {
    let registry = PluginRegistry::with_plugins(plugins.iter().cloned());
    let limits = Limits::default();
    RuleParser::new(&registry, &limits).parse(source).map(|_| ())
}

/// Parse `min-max` or `min..max` with signed 64-bit bounds.
/// `None` when the body is not shaped like a range.
pub fn parse_int_range(body: &str) -> Option<(i64, i64)> {
    let (lo, hi) = match body.split_once("..") {
        Some(parts) => parts,
        None => {
            // Skip a leading sign so `-5-10` splits after the `5`.
            let cut = body.get(1..)?.find('-')? + 1;
            (&body[..cut], &body[cut + 1..])
        }
    };
    let lo = lo.trim().parse().ok()?;
    let hi = hi.trim().parse().ok()?;
    Some((lo, hi))
}

fn classify(clause: &str) -> Result<Clause<'_>> {
    if let Some(q) = find_top_level(clause, '?') {
        let pattern = clause[..q].trim();
        let body = &clause[q + 1..];
        if pattern.is_empty() {
            return Ok(Clause::Global(body));
        }
        return Ok(Clause::Url { pattern, body });
    }

    let inline = clause.starts_with('/') || clause.starts_with('*');
    let Some(open) = clause.find('[').filter(|_| inline) else {
        return Ok(Clause::Global(clause));
    };

    // Inline shorthand: `/path&a=[..]` or `/path/a=[..]`.
    if let Some(amp) = find_top_level(clause, '&').filter(|a| *a < open) {
        return Ok(Clause::Url {
            pattern: &clause[..amp],
            body: &clause[amp + 1..],
        });
    }
    match clause[..open].rfind('/') {
        Some(0) => Ok(Clause::Url {
            pattern: "/",
            body: &clause[1..],
        }),
        Some(slash) => Ok(Clause::Url {
            pattern: &clause[..slash],
            body: &clause[slash + 1..],
        }),
        None => Err(ParamwallError::syntax(format!(
            "cannot locate url pattern in clause `{clause}`"
        ))),
    }
}

/// Split on separator characters outside brackets. Fails on unbalanced
/// brackets.
fn split_top_level(s: &str, is_sep: impl Fn(char) -> bool) -> Result<Vec<&str>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ParamwallError::syntax(format!("unexpected `]` at byte {i}"))
                })?;
            }
            c if depth == 0 && is_sep(c) => {
                out.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParamwallError::syntax("unclosed `[`"));
    }
    out.push(&s[start..]);
    Ok(out)
}

fn find_top_level(s: &str, target: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn matching_bracket(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}
