use std::sync::Arc;

use paramwall_core::plugin::ConstraintPlugin;
use paramwall_core::rule::Validator;

#[derive(Debug, Clone, Copy)]
enum Op {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl Op {
    // Two-character operators first so `>=` is not read as `>`.
    const TABLE: [(&'static str, Op); 6] = [
        (">=", Op::Ge),
        ("<=", Op::Le),
        ("==", Op::Eq),
        ("!=", Op::Ne),
        (">", Op::Gt),
        ("<", Op::Lt),
    ];

    fn split(body: &str) -> Option<(Op, &str)> {
        Self::TABLE
            .iter()
            .find_map(|(tok, op)| body.strip_prefix(tok).map(|rest| (*op, rest)))
    }

    fn eval(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Op::Gt => lhs > rhs,
            Op::Ge => lhs >= rhs,
            Op::Lt => lhs < rhs,
            Op::Le => lhs <= rhs,
            Op::Eq => lhs == rhs,
            Op::Ne => lhs != rhs,
        }
    }
}

/// Numeric comparison against a constant: `>10`, `>=1`, `<5`, `<=5`, `==3`, `!=0`.
///
/// The operand must start with a digit (after an optional sign) for the
/// body to be claimed at all.
#[derive(Debug, Default)]
pub struct ComparePlugin;

impl ConstraintPlugin for ComparePlugin {
    fn name(&self) -> &str {
        "compare"
    }

    // Claims only an operator followed by something numeric-looking, so
    // literal values such as `<none>` stay enum members.
    fn can_parse(&self, body: &str) -> bool {
        Op::split(body).is_some_and(|(_, operand)| {
            let operand = operand.trim_start();
            let digits = operand.strip_prefix(['-', '+']).unwrap_or(operand);
            digits.starts_with(|c: char| c.is_ascii_digit())
        })
    }

    fn parse(&self, _param: &str, body: &str) -> Result<Validator, String> {
        let (op, operand) = Op::split(body).ok_or_else(|| format!("unknown operator in `{body}`"))?;
        let rhs: i64 = operand
            .trim()
            .parse()
            .map_err(|_| format!("malformed numeric operand `{}`", operand.trim()))?;
        Ok(Arc::new(move |v: &str| {
            v.parse::<i64>().is_ok_and(|lhs| op.eval(lhs, rhs))
        }))
    }
}
