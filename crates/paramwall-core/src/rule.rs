//! Parameter rule model.

use std::fmt;
use std::sync::Arc;

/// Sentinel parameter name meaning "accept every parameter".
pub const ALLOW_ALL: &str = "*";

/// Compiled value predicate produced by a constraint plugin.
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Externally supplied `(name, value)` predicate backing `=[?]` rules.
pub type Callback = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// What a single parameter rule checks.
#[derive(Clone)]
pub enum RuleKind {
    /// Present with any value.
    Any,
    /// Present with an empty value only.
    KeyOnly,
    /// Value must equal one of the literals (sorted, deduplicated).
    Enum(Vec<String>),
    /// Value must parse as an integer within `min..=max`.
    NumericRange { min: i64, max: i64 },
    /// Delegated to the engine's callback.
    Callback,
    /// Delegated to a plugin-compiled validator.
    Plugin {
        plugin: String,
        body: String,
        validator: Validator,
    },
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Any => f.write_str("Any"),
            RuleKind::KeyOnly => f.write_str("KeyOnly"),
            RuleKind::Enum(v) => f.debug_tuple("Enum").field(v).finish(),
            RuleKind::NumericRange { min, max } => f
                .debug_struct("NumericRange")
                .field("min", min)
                .field("max", max)
                .finish(),
            RuleKind::Callback => f.write_str("Callback"),
            RuleKind::Plugin { plugin, body, .. } => f
                .debug_struct("Plugin")
                .field("plugin", plugin)
                .field("body", body)
                .finish_non_exhaustive(),
        }
    }
}

/// One parameter rule: a kind plus the inversion flag.
#[derive(Debug, Clone)]
pub struct ParamRule {
    pub kind: RuleKind,
    pub inverted: bool,
}

impl ParamRule {
    pub fn new(kind: RuleKind) -> Self {
        Self { kind, inverted: false }
    }

    pub fn any() -> Self {
        Self::new(RuleKind::Any)
    }

    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Build an enum rule, sorting and deduplicating the literals.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut v: Vec<String> = values.into_iter().map(Into::into).collect();
        v.sort();
        v.dedup();
        Self::new(RuleKind::Enum(v))
    }

    /// Evaluate `value` against this rule. Inversion is applied last.
    /// A callback rule with no callback installed denies.
    pub fn check(&self, name: &str, value: &str, callback: Option<&Callback>) -> bool {
        let ok = match &self.kind {
            RuleKind::Any => true,
            RuleKind::KeyOnly => value.is_empty(),
            RuleKind::Enum(values) => values.binary_search_by(|v| v.as_str().cmp(value)).is_ok(),
            RuleKind::NumericRange { min, max } => value
                .parse::<i64>()
                .map(|n| (*min..=*max).contains(&n))
                .unwrap_or(false),
            RuleKind::Callback => match callback {
                Some(cb) => cb(name, value),
                None => false,
            },
            RuleKind::Plugin { validator, .. } => validator(value),
        };
        ok != self.inverted
    }
}

/// Renders the constraint part of a rule in grammar form, e.g. `=[a,b]`.
/// `Any` renders as nothing so `name` + rule reads as a bare name.
impl fmt::Display for ParamRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bang = if self.inverted { "!" } else { "" };
        match &self.kind {
            RuleKind::Any if self.inverted => write!(f, "=![*]"),
            RuleKind::Any => Ok(()),
            RuleKind::KeyOnly => write!(f, "={bang}[]"),
            RuleKind::Enum(values) => write!(f, "={bang}[{}]", values.join(",")),
            RuleKind::NumericRange { min, max } => write!(f, "={bang}[{min}..{max}]"),
            RuleKind::Callback => write!(f, "={bang}[?]"),
            RuleKind::Plugin { body, .. } => write!(f, "={bang}[{body}]"),
        }
    }
}
