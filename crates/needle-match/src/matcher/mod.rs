//! Built-in matcher functions.
//!
//! # Module Structure
//!
//! - `length` - `arrayLength`, `arrayMinLength`, `arrayMaxLength`
//! - `numeric` - `gt`, `lt`
//! - `regexp` - `regExp` with delimited (`/pattern/flags`) or raw patterns
//! - `variable_type` - `variableType`
//! - `jwt` - `jwt`, matching signed tokens against registered payloads

mod jwt;
mod length;
mod numeric;
mod regexp;
mod variable_type;

use crate::registry::MatcherRegistry;
use std::sync::Arc;

pub use jwt::{parse_algorithm, JwtMatcher, RegisteredToken, HMAC_ALGORITHMS};
pub use length::{ArrayLength, LengthBound};
pub use numeric::{Direction, NumericBound};
pub use regexp::RegExp;
pub use variable_type::VariableType;

/// Names the built-in functions are registered under.
pub const DEFAULT_FUNCTIONS: [&str; 8] = [
    "arrayLength",
    "arrayMinLength",
    "arrayMaxLength",
    "variableType",
    "regExp",
    "gt",
    "lt",
    "jwt",
];

/// Register every built-in matcher. `jwt` is shared so tokens can be added later.
pub fn register_defaults(registry: &mut MatcherRegistry, jwt: Arc<JwtMatcher>) {
    registry
        .register("arrayLength", ArrayLength::exact())
        .register("arrayMinLength", ArrayLength::min())
        .register("arrayMaxLength", ArrayLength::max())
        .register("variableType", VariableType)
        .register("regExp", RegExp::new())
        .register("gt", NumericBound::greater_than())
        .register("lt", NumericBound::less_than())
        .register_shared("jwt", jwt);
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::directive::Directive;
    use crate::error::{ComparisonFailure, MatcherError};
    use crate::path::KeyPath;
    use crate::registry::{MatchContext, Matcher, SubsetCompare};
    use serde_json::Value;

    /// Comparator stand-in that answers every comparison the same way.
    pub(crate) struct FixedComparator(pub Result<(), ComparisonFailure>);

    impl SubsetCompare for FixedComparator {
        fn compare(&self, _needle: &Value, _haystack: &Value) -> Result<(), ComparisonFailure> {
            self.0.clone()
        }
    }

    /// Evaluate `matcher` with the arguments of the directive `source`.
    pub(crate) fn evaluate_with(
        comparator: &dyn SubsetCompare,
        matcher: &dyn Matcher,
        source: &str,
        actual: &Value,
    ) -> Result<(), MatcherError> {
        let directive = Directive::parse(source)
            .expect("valid directive")
            .expect("directive-shaped");
        let path = KeyPath::root();
        let ctx = MatchContext::new(comparator, &directive, &path);
        matcher.evaluate(&ctx, actual, &directive.args)
    }

    pub(crate) fn evaluate(
        matcher: &dyn Matcher,
        source: &str,
        actual: &Value,
    ) -> Result<(), MatcherError> {
        evaluate_with(&FixedComparator(Ok(())), matcher, source, actual)
    }
}
