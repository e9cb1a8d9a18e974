//! Compiled, immutable rule set.
//!
//! Built once per successful parse and shared behind an `Arc`. Every name
//! gets a bit in a per-set [`ParamIndex`], every scope gets a precomputed
//! [`ParamBitset`], and lookups resolve through three tiers:
//! specific URL rule, then other matching URL rules, then global rules.
//!
//! The query methods here are the fast path: external predicates run
//! without a panic guard. [`Engine`](super::Engine) wraps them for callers
//! that need containment.

use std::collections::HashMap;

use paramwall_core::bitset::ParamBitset;
use paramwall_core::grammar::{render_params, ParamMap, ParsedRules};
use paramwall_core::index::ParamIndex;
use paramwall_core::limits::Limits;
use paramwall_core::pattern::{normalize_path, url_matches, Specificity};
use paramwall_core::query::{count_params, query_params, QueryParam};
use paramwall_core::rule::{Callback, ParamRule, ALLOW_ALL};

/// Rules bound to one URL pattern.
#[derive(Debug)]
pub struct UrlRule {
    pub pattern: String,
    pub params: ParamMap,
    pub mask: ParamBitset,
    pub specificity: Specificity,
    /// Pattern carries the `*` sentinel.
    pub allow_all: bool,
}

/// Per-request tier masks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamMasks {
    pub global: ParamBitset,
    pub url_pattern: ParamBitset,
    pub specific_url: ParamBitset,
}

impl ParamMasks {
    pub fn combined(&self) -> ParamBitset {
        self.global.union(&self.url_pattern).union(&self.specific_url)
    }
}

/// Masks plus the URL rules that produced them.
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    pub masks: ParamMasks,
    /// Position of the most specific matching URL rule.
    pub specific: Option<usize>,
    /// Positions of every matching URL rule, ascending.
    pub matched: Vec<usize>,
}

#[derive(Debug)]
pub struct CompiledRuleSet {
    index: ParamIndex,
    global: ParamMap,
    global_mask: ParamBitset,
    global_by_index: HashMap<usize, ParamRule>,
    url_rules: Vec<UrlRule>,
    url_rules_by_index: HashMap<usize, Vec<usize>>,
    global_allow_all: bool,
    limits: Limits,
}

impl CompiledRuleSet {
    /// A rule set with no rules: every non-empty query is denied.
    pub fn empty(limits: &Limits) -> Self {
        Self::compile(ParsedRules::default(), limits)
    }

    pub fn compile(parsed: ParsedRules, limits: &Limits) -> Self {
        let index = ParamIndex::new(limits.max_params);
        // The allow-all sentinel is a tier flag, not a parameter, so it
        // never competes with real names for an index slot.
        for name in parsed.names().filter(|n| *n != ALLOW_ALL) {
            index.get_or_create(name);
        }

        let ParsedRules { global, urls } = parsed;

        let mut global_mask = ParamBitset::new();
        let mut global_by_index = HashMap::with_capacity(global.len());
        for (name, rule) in &global {
            if let Some(i) = index.get(name) {
                global_mask.set(i);
                global_by_index.insert(i, rule.clone());
            }
        }

        let mut url_rules = Vec::with_capacity(urls.len());
        let mut url_rules_by_index: HashMap<usize, Vec<usize>> = HashMap::new();
        for (pos, (pattern, params)) in urls.into_iter().enumerate() {
            let mask = ParamBitset::from_indices(params.keys().filter_map(|n| index.get(n)));
            for i in mask.indices() {
                url_rules_by_index.entry(i).or_default().push(pos);
            }
            url_rules.push(UrlRule {
                specificity: Specificity::of(&pattern),
                allow_all: params.contains_key(ALLOW_ALL),
                pattern,
                params,
                mask,
            });
        }

        let global_allow_all = global.contains_key(ALLOW_ALL);

        tracing::info!(
            global = global.len(),
            url_rules = url_rules.len(),
            indexed = index.len(),
            global_allow_all,
            "rule set compiled"
        );

        Self {
            index,
            global,
            global_mask,
            global_by_index,
            url_rules,
            url_rules_by_index,
            global_allow_all,
            limits: *limits,
        }
    }

    pub fn index(&self) -> &ParamIndex {
        &self.index
    }

    pub fn global_mask(&self) -> ParamBitset {
        self.global_mask
    }

    /// URL rules in pattern order.
    pub fn url_rules(&self) -> &[UrlRule] {
        &self.url_rules
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.url_rules.is_empty()
    }

    /// Serialize back to the rule grammar.
    pub fn to_rule_string(&self) -> String {
        let mut clauses = Vec::with_capacity(self.url_rules.len() + 1);
        if !self.global.is_empty() {
            clauses.push(render_params(&self.global));
        }
        for r in &self.url_rules {
            clauses.push(format!("{}?{}", r.pattern, render_params(&r.params)));
        }
        clauses.join(";")
    }

    /// Compute the tier masks for a request path.
    pub fn masks_for(&self, path: &str) -> RequestScope {
        let path = normalize_path(path);

        let mut url_pattern = ParamBitset::new();
        let mut matched = Vec::new();
        let mut specific: Option<usize> = None;

        for (pos, rule) in self.url_rules.iter().enumerate() {
            if !url_matches(&path, &rule.pattern) {
                continue;
            }
            url_pattern = url_pattern.union(&rule.mask);
            matched.push(pos);
            // Ties keep the earlier (byte-smaller) pattern.
            specific = match specific {
                Some(best) if rule.specificity <= self.url_rules[best].specificity => Some(best),
                _ => Some(pos),
            };
        }

        RequestScope {
            masks: ParamMasks {
                global: self.global_mask,
                url_pattern,
                specific_url: specific
                    .map(|s| self.url_rules[s].mask)
                    .unwrap_or_default(),
            },
            specific,
            matched,
        }
    }

    /// True when the global tier or any matching URL rule carries `*`.
    pub fn allows_all(&self, scope: &RequestScope) -> bool {
        self.global_allow_all || scope.matched.iter().any(|p| self.url_rules[*p].allow_all)
    }

    /// Pick the rule governing `name` in this scope, by tier priority.
    pub fn resolve(&self, scope: &RequestScope, name: &str) -> Option<&ParamRule> {
        let idx = self.index.get(name)?;

        if let Some(s) = scope.specific {
            if scope.masks.specific_url.get(idx) {
                if let Some(rule) = self.url_rules[s].params.get(name) {
                    return Some(rule);
                }
            }
        }

        if scope.masks.url_pattern.get(idx) {
            let best = self
                .url_rules_by_index
                .get(&idx)
                .into_iter()
                .flatten()
                .filter(|p| scope.matched.binary_search(p).is_ok())
                .max_by(|a, b| {
                    self.url_rules[**a]
                        .specificity
                        .cmp(&self.url_rules[**b].specificity)
                        .then_with(|| b.cmp(a))
                });
            if let Some(rule) = best.and_then(|p| self.url_rules[*p].params.get(name)) {
                return Some(rule);
            }
        }

        if scope.masks.global.get(idx) {
            return self.global_by_index.get(&idx);
        }
        None
    }

    /// Resolve and evaluate one parameter. Missing rule is a deny.
    pub fn check(&self, scope: &RequestScope, name: &str, value: &str, cb: Option<&Callback>) -> bool {
        match self.resolve(scope, name) {
            Some(rule) => {
                let ok = rule.check(name, value, cb);
                if !ok {
                    tracing::debug!(param = %name, "parameter value rejected");
                }
                ok
            }
            None => {
                tracing::debug!(param = %name, "parameter not permitted here");
                false
            }
        }
    }

    fn within_limits(&self, path: &str, query: &str) -> bool {
        if path.len() + query.len() > self.limits.max_url_len {
            tracing::debug!(len = path.len() + query.len(), "url over length limit");
            return false;
        }
        if count_params(query) > self.limits.max_query_params {
            tracing::debug!("query over parameter count limit");
            return false;
        }
        true
    }

    /// Accept the query only if every parameter passes. Empty is valid.
    pub fn validate_query(&self, path: &str, query: &str, cb: Option<&Callback>) -> bool {
        if query.is_empty() {
            return true;
        }
        if !self.within_limits(path, query) {
            return false;
        }

        let scope = self.masks_for(path);
        if self.allows_all(&scope) {
            return true;
        }
        if scope.masks.combined().is_empty() {
            tracing::debug!(path = %path, "no parameters permitted for path");
            return false;
        }
        query_params(query).all(|p| self.check(&scope, p.name, p.value, cb))
    }

    /// Rebuild `query` keeping only parameters that pass, in their original
    /// order and spelling.
    pub fn filter_query(&self, path: &str, query: &str, cb: Option<&Callback>) -> String {
        self.filter_with(path, query, |scope, p| self.check(scope, p.name, p.value, cb))
    }

    /// [`filter_query`](Self::filter_query) with the per-parameter decision
    /// supplied by the caller. `keep` is not consulted under allow-all.
    pub fn filter_with<F>(&self, path: &str, query: &str, mut keep: F) -> String
    where
        F: FnMut(&RequestScope, &QueryParam<'_>) -> bool,
    {
        if query.is_empty() || !self.within_limits(path, query) {
            return String::new();
        }

        let scope = self.masks_for(path);
        let allow_all = self.allows_all(&scope);
        query_params(query)
            .filter(|p| allow_all || keep(&scope, p))
            .map(|p| p.raw)
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Check one already-decomposed parameter.
    pub fn validate_param(&self, path: &str, name: &str, value: &str, cb: Option<&Callback>) -> bool {
        if path.len() + name.len() + value.len() > self.limits.max_url_len {
            return false;
        }
        let scope = self.masks_for(path);
        self.allows_all(&scope) || self.check(&scope, name, value, cb)
    }
}
