//! Subset matching of JSON documents with embedded matcher directives.
//!
//! A *needle* describes what a *haystack* must contain. Objects match when every
//! needle key is present in the haystack with a matching value, arrays match
//! position by position, and string leaves of the form `@name(args)` delegate the
//! check to a registered matcher function.
//!
//! ```
//! use needle_match::Comparator;
//! use serde_json::json;
//!
//! let comparator = Comparator::default();
//! let needle = json!({
//!     "user": {"name": "Ada", "age": "@gt(18)"},
//!     "roles": "@arrayMinLength(1)"
//! });
//! let haystack = json!({
//!     "user": {"id": 7, "name": "Ada", "age": 36},
//!     "roles": ["admin"]
//! });
//! assert!(comparator.compare(&needle, &haystack).is_ok());
//! ```

// ===== Matching core =====
pub mod comparator;
pub mod directive;
pub mod matcher;
pub mod registry;

// ===== Supporting types =====
pub mod config;
pub mod error;
pub mod path;
pub mod value;

mod report;

pub use comparator::Comparator;
pub use config::{ComparatorConfig, TokenConfig};
pub use directive::Directive;
pub use error::{ComparisonFailure, DirectiveSyntaxError, ErrorKind, MatcherError};
pub use matcher::JwtMatcher;
pub use path::KeyPath;
pub use registry::{MatchContext, Matcher, MatcherRegistry, SubsetCompare};

/// Compare with a default comparator.
pub fn compare(
    needle: &serde_json::Value,
    haystack: &serde_json::Value,
) -> Result<(), ComparisonFailure> {
    Comparator::default().compare(needle, haystack)
}
