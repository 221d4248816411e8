//! List length matchers.

use crate::error::MatcherError;
use crate::registry::{MatchContext, Matcher};
use crate::value::type_name;
use serde_json::Value;

/// Which comparison a length matcher applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBound {
    Exact,
    AtLeast,
    AtMost,
}

impl LengthBound {
    fn holds(&self, actual: usize, expected: usize) -> bool {
        match self {
            LengthBound::Exact => actual == expected,
            LengthBound::AtLeast => actual >= expected,
            LengthBound::AtMost => actual <= expected,
        }
    }

    fn phrase(&self) -> &'static str {
        match self {
            LengthBound::Exact => "exactly",
            LengthBound::AtLeast => "more than or equal to",
            LengthBound::AtMost => "less than or equal to",
        }
    }
}

/// Checks the number of entries in a haystack list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayLength {
    bound: LengthBound,
}

impl ArrayLength {
    pub fn new(bound: LengthBound) -> Self {
        Self { bound }
    }

    /// `arrayLength(N)`
    pub fn exact() -> Self {
        Self::new(LengthBound::Exact)
    }

    /// `arrayMinLength(N)`
    pub fn min() -> Self {
        Self::new(LengthBound::AtLeast)
    }

    /// `arrayMaxLength(N)`
    pub fn max() -> Self {
        Self::new(LengthBound::AtMost)
    }

    pub fn bound(&self) -> LengthBound {
        self.bound
    }
}

impl Matcher for ArrayLength {
    fn evaluate(
        &self,
        ctx: &MatchContext<'_>,
        actual: &Value,
        args: &[String],
    ) -> Result<(), MatcherError> {
        ctx.expect_arity(args, 1)?;
        let raw = args[0].as_str();
        let expected: usize = raw.parse().map_err(|_| {
            MatcherError::argument(format!(
                "@{} expects a non-negative integer length, got \"{raw}\".",
                ctx.name()
            ))
        })?;

        let Value::Array(items) = actual else {
            return Err(MatcherError::mismatch(format!(
                "Only numerically indexed arrays are supported, got \"{}\".",
                type_name(actual)
            )));
        };

        if !self.bound.holds(items.len(), expected) {
            return Err(MatcherError::mismatch(format!(
                "Expected array to have {} {expected} entries, actual length: {}.",
                self.bound.phrase(),
                items.len()
            )));
        }
        Ok(())
    }
}
