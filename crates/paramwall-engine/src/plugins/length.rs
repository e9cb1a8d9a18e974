use std::sync::Arc;

use paramwall_core::grammar::parse_int_range;
use paramwall_core::plugin::ConstraintPlugin;
use paramwall_core::rule::Validator;

const PREFIX: &str = "len:";

/// Value length in bytes: `len:N` (exact), `len:N-M` or `len:N..M`.
#[derive(Debug, Default)]
pub struct LengthPlugin;

impl ConstraintPlugin for LengthPlugin {
    fn name(&self) -> &str {
        "length"
    }

    fn can_parse(&self, body: &str) -> bool {
        body.starts_with(PREFIX)
    }

    fn parse(&self, _param: &str, body: &str) -> Result<Validator, String> {
        let bounds = body.strip_prefix(PREFIX).unwrap_or(body).trim();
        let (min, max) = match bounds.parse::<i64>() {
            Ok(n) => (n, n),
            Err(_) => parse_int_range(bounds).ok_or_else(|| format!("malformed length `{bounds}`"))?,
        };
        if min < 0 || max < min {
            return Err(format!("invalid length bounds {min}..{max}"));
        }
        let (min, max) = (min as usize, max as usize);
        Ok(Arc::new(move |v: &str| (min..=max).contains(&v.len())))
    }
}
