use std::sync::Arc;

use paramwall_core::grammar::parse_int_range;
use paramwall_core::plugin::ConstraintPlugin;
use paramwall_core::rule::Validator;

/// Inclusive signed integer range: `min-max` or `min..max`.
#[derive(Debug, Default)]
pub struct RangePlugin;

impl ConstraintPlugin for RangePlugin {
    fn name(&self) -> &str {
        "range"
    }

    fn can_parse(&self, body: &str) -> bool {
        parse_int_range(body).is_some()
    }

    fn parse(&self, _param: &str, body: &str) -> Result<Validator, String> {
        let (min, max) = parse_int_range(body).ok_or_else(|| format!("malformed range `{body}`"))?;
        if min > max {
            return Err(format!("range min {min} is greater than max {max}"));
        }
        Ok(Arc::new(move |v: &str| {
            v.parse::<i64>().is_ok_and(|n| (min..=max).contains(&n))
        }))
    }
}
