//! `gt` and `lt`.

use crate::error::MatcherError;
use crate::registry::{MatchContext, Matcher};
use crate::value::plain;
use serde_json::Value;
use std::cmp::Ordering;

/// Which side of the bound the haystack value must fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Greater,
    Less,
}

impl Direction {
    fn expected(&self) -> Ordering {
        match self {
            Direction::Greater => Ordering::Greater,
            Direction::Less => Ordering::Less,
        }
    }

    fn phrase(&self) -> &'static str {
        match self {
            Direction::Greater => "greater than",
            Direction::Less => "less than",
        }
    }
}

/// A number taken from a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Int(i128),
    Float(f64),
}

impl Operand {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<i128>() {
            return Some(Operand::Int(n));
        }
        // Rust accepts "inf" and "NaN"; those are not numbers for our purposes
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Operand::Float)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Operand::Int(i128::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Some(Operand::Int(i128::from(u)))
                } else {
                    n.as_f64().map(Operand::Float)
                }
            }
            Value::String(s) => Operand::parse(s),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Operand::Int(i) => i as f64,
            Operand::Float(f) => f,
        }
    }

    fn compare(self, other: Operand) -> Option<Ordering> {
        match (self, other) {
            (Operand::Int(a), Operand::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

/// Strict numeric comparison against a bound given as the directive argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericBound {
    direction: Direction,
}

impl NumericBound {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    /// `gt(bound)`
    pub fn greater_than() -> Self {
        Self::new(Direction::Greater)
    }

    /// `lt(bound)`
    pub fn less_than() -> Self {
        Self::new(Direction::Less)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Matcher for NumericBound {
    fn evaluate(
        &self,
        ctx: &MatchContext<'_>,
        actual: &Value,
        args: &[String],
    ) -> Result<(), MatcherError> {
        ctx.expect_arity(args, 1)?;
        let raw_bound = args[0].trim();
        let bound = Operand::parse(raw_bound).ok_or_else(|| {
            MatcherError::argument(format!(
                "@{} expects a numeric bound, got \"{raw_bound}\".",
                ctx.name()
            ))
        })?;

        let rendered = plain(actual);
        let value = Operand::from_value(actual)
            .ok_or_else(|| MatcherError::mismatch(format!("\"{rendered}\" is not numeric.")))?;

        if value.compare(bound) != Some(self.direction.expected()) {
            return Err(MatcherError::mismatch(format!(
                "\"{rendered}\" is not {} \"{raw_bound}\".",
                self.direction.phrase()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::matcher::testing::evaluate;
    use serde_json::json;

    #[test]
    fn test_greater_than() {
        let gt = NumericBound::greater_than();
        assert!(evaluate(&gt, "@gt(5)", &json!(6)).is_ok());
        assert!(evaluate(&gt, "@gt(5)", &json!(5.5)).is_ok());
        assert!(evaluate(&gt, "@gt(-1.5)", &json!(-1)).is_ok());

        let err = evaluate(&gt, "@gt(5)", &json!(5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mismatch);
        assert_eq!(err.message(), "\"5\" is not greater than \"5\".");
    }

    #[test]
    fn test_less_than() {
        let lt = NumericBound::less_than();
        assert!(evaluate(&lt, "@lt(10)", &json!(9)).is_ok());
        assert!(evaluate(&lt, "@lt(0.5)", &json!(0.25)).is_ok());

        let err = evaluate(&lt, "@lt(10)", &json!(10.0)).unwrap_err();
        assert_eq!(err.message(), "\"10.0\" is not less than \"10\".");
    }

    #[test]
    fn test_numeric_strings_are_operands() {
        let gt = NumericBound::greater_than();
        assert!(evaluate(&gt, "@gt(5)", &json!("7")).is_ok());
        assert!(evaluate(&gt, "@gt(5)", &json!("5.01")).is_ok());
        assert!(evaluate(&gt, "@gt(\" 5 \")", &json!(6)).is_ok());
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let gt = NumericBound::greater_than();
        let bound = format!("@gt({})", u64::MAX - 1);
        assert!(evaluate(&gt, &bound, &json!(u64::MAX)).is_ok());
        let bound = format!("@gt({})", i64::MAX);
        assert!(evaluate(&gt, &bound, &json!(i64::MAX)).is_err());
    }

    #[test]
    fn test_non_numeric_haystack_is_a_mismatch() {
        let gt = NumericBound::greater_than();
        let err = evaluate(&gt, "@gt(5)", &json!("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mismatch);
        assert_eq!(err.message(), "\"x\" is not numeric.");

        for value in [json!(true), json!(null), json!([1]), json!("inf")] {
            let err = evaluate(&gt, "@gt(5)", &value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Mismatch, "{value}");
        }
    }

    #[test]
    fn test_non_numeric_bound_is_an_argument_error() {
        let lt = NumericBound::less_than();
        let err = evaluate(&lt, "@lt(ten)", &json!(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert_eq!(err.message(), "@lt expects a numeric bound, got \"ten\".");

        let err = evaluate(&lt, "@lt(1, 2)", &json!(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
    }
}
