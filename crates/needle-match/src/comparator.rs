//! Recursive subset comparison of a needle against a haystack.
//!
//! The walk is driven by the shape of the needle:
//!
//! - Scalar needle: the haystack must hold an equal value of the same type
//!   (`1` and `1.0` are equal).
//! - Directive string: the named matcher is resolved and evaluated against the
//!   haystack value at the same position.
//! - Object needle: every needle key must exist in the haystack object and match
//!   recursively; extra haystack keys are ignored. Keys may use `key[N]` to address
//!   one element of a haystack list, or `key[]` to address the whole list.
//! - Array needle: the haystack must be an array of the same length and elements
//!   are matched position by position. Put a length directive in place of the
//!   array (or use `key[]`) to check lists without spelling out every element.
//!
//! The first failure aborts the walk.

use crate::directive::Directive;
use crate::error::{ComparisonFailure, ErrorKind, MatcherError};
use crate::matcher::{register_defaults, JwtMatcher};
use crate::path::{parse_key, KeyPath, KeySelector};
use crate::registry::{MatchContext, Matcher, MatcherRegistry, SubsetCompare};
use crate::value::{describe, scalars_equal, type_name};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Subset comparator owning a matcher registry.
#[derive(Debug)]
pub struct Comparator {
    registry: MatcherRegistry,
    jwt: Arc<JwtMatcher>,
}

impl Comparator {
    /// A comparator with no matcher functions registered.
    pub fn new() -> Self {
        Self {
            registry: MatcherRegistry::new(),
            jwt: Arc::new(JwtMatcher::new()),
        }
    }

    /// A comparator with every built-in matcher registered.
    pub fn with_default_matchers() -> Self {
        let mut comparator = Self::new();
        register_defaults(&mut comparator.registry, Arc::clone(&comparator.jwt));
        comparator
    }

    /// Register a matcher function, replacing any existing one with that name.
    pub fn add_function<M>(&mut self, name: impl Into<String>, matcher: M) -> &mut Self
    where
        M: Matcher + 'static,
    {
        self.registry.register(name, matcher);
        self
    }

    /// Unregister a matcher function. Returns whether it was registered.
    pub fn remove_function(&mut self, name: &str) -> bool {
        self.registry.remove(name).is_some()
    }

    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    /// The JWT matcher behind `@jwt`, for registering tokens through a shared handle.
    pub fn jwt(&self) -> &Arc<JwtMatcher> {
        &self.jwt
    }

    /// Register a token for `@jwt(name)`, accepting HS256, HS384 and HS512.
    ///
    /// Tokens always land in this comparator's JWT table. On a comparator built
    /// with [`Comparator::new`], or after `jwt` was removed, no directive can
    /// reach them until the matcher is registered again.
    pub fn add_token(
        &self,
        name: impl Into<String>,
        payload: Map<String, Value>,
        secret: impl Into<String>,
    ) -> &Self {
        let name = name.into();
        self.note_unreachable_token(&name);
        self.jwt.add_token(name, payload, secret);
        self
    }

    pub fn add_token_with_algorithms(
        &self,
        name: impl Into<String>,
        payload: Map<String, Value>,
        secret: impl Into<String>,
        algorithms: &[&str],
    ) -> Result<&Self, MatcherError> {
        let name = name.into();
        self.note_unreachable_token(&name);
        self.jwt
            .add_token_with_algorithms(name, payload, secret, algorithms)?;
        Ok(self)
    }

    fn note_unreachable_token(&self, name: &str) {
        if !self.registry.contains("jwt") {
            debug!(token = %name, "jwt function is not registered, token is unreachable");
        }
    }

    /// Check that `haystack` satisfies `needle`.
    ///
    /// On failure the returned [`ComparisonFailure`] carries both complete
    /// documents and the path of the first node that did not match.
    pub fn compare(&self, needle: &Value, haystack: &Value) -> Result<(), ComparisonFailure> {
        self.node(needle, haystack, &KeyPath::root())
            .map_err(|failure| {
                debug!(
                    path = %failure.path,
                    kind = failure.kind.label(),
                    "comparison failed"
                );
                failure.with_context(needle, haystack)
            })
    }

    /// Decode both documents and compare them.
    pub fn compare_json(&self, needle: &str, haystack: &str) -> Result<(), ComparisonFailure> {
        let needle = decode_side("Needle", needle)?;
        let haystack = decode_side("Haystack", haystack)?;
        self.compare(&needle, &haystack)
    }

    fn node(
        &self,
        needle: &Value,
        haystack: &Value,
        path: &KeyPath,
    ) -> Result<(), ComparisonFailure> {
        trace!(path = %path, needle = type_name(needle), "visiting node");
        match needle {
            Value::String(text) => match Directive::parse(text) {
                Ok(Some(directive)) => self.apply(&directive, haystack, path),
                Ok(None) => self.scalar(needle, haystack, path),
                Err(e) => Err(ComparisonFailure::new(
                    ErrorKind::Syntax,
                    e.to_string(),
                    path.to_string(),
                )),
            },
            Value::Object(members) => {
                let Value::Object(actual) = haystack else {
                    return Err(type_mismatch("an object", haystack, path));
                };
                for (key, expected) in members {
                    self.member(key, expected, actual, path)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                let Value::Array(actual) = haystack else {
                    return Err(type_mismatch("an array", haystack, path));
                };
                if items.len() != actual.len() {
                    return Err(mismatch(
                        format!(
                            "Array length mismatch at {path}: expected {} entries, got {}.",
                            items.len(),
                            actual.len()
                        ),
                        path,
                    ));
                }
                for (index, (expected, value)) in items.iter().zip(actual).enumerate() {
                    self.node(expected, value, &path.index(index))?;
                }
                Ok(())
            }
            _ => self.scalar(needle, haystack, path),
        }
    }

    fn scalar(
        &self,
        needle: &Value,
        haystack: &Value,
        path: &KeyPath,
    ) -> Result<(), ComparisonFailure> {
        if scalars_equal(needle, haystack) {
            return Ok(());
        }
        Err(mismatch(
            format!(
                "Value mismatch at {path}: expected {}, got {}.",
                describe(needle),
                describe(haystack)
            ),
            path,
        ))
    }

    /// Match one needle member against the haystack object.
    ///
    /// A missing literal key is a mismatch unless the key is index-shaped:
    /// `items[0]` or `items[]` then falls back to addressing the `items` list, so
    /// `{"items[0]": 1}` matches `{"items": [1]}` without an `items[0]` key.
    fn member(
        &self,
        key: &str,
        expected: &Value,
        actual: &Map<String, Value>,
        path: &KeyPath,
    ) -> Result<(), ComparisonFailure> {
        // A literal key in the haystack takes priority over index syntax
        if let Some(value) = actual.get(key) {
            return self.node(expected, value, &path.key(key));
        }

        match parse_key(key) {
            KeySelector::Plain(key) => Err(missing_key(key, path)),
            KeySelector::WholeList(base) => {
                let list = list_at(actual, base, path)?;
                self.node(expected, list, &path.key(base))
            }
            KeySelector::Index(base, index) => {
                let Value::Array(items) = list_at(actual, base, path)? else {
                    return Err(not_a_list(base, path));
                };
                let list_path = path.key(base);
                let item = items.get(index).ok_or_else(|| {
                    mismatch(
                        format!(
                            "The index {index} does not exist in the haystack list at {list_path}."
                        ),
                        &list_path,
                    )
                })?;
                self.node(expected, item, &list_path.index(index))
            }
        }
    }

    fn apply(
        &self,
        directive: &Directive,
        haystack: &Value,
        path: &KeyPath,
    ) -> Result<(), ComparisonFailure> {
        debug!(directive = %directive, path = %path, "evaluating directive");
        let matcher = self.registry.resolve(&directive.name).map_err(|e| {
            ComparisonFailure::new(e.kind(), format!("{e} (at {path})"), path.to_string())
        })?;

        let ctx = MatchContext::new(self, directive, path);
        matcher
            .evaluate(&ctx, haystack, &directive.args)
            .map_err(|e| {
                ComparisonFailure::new(
                    e.kind(),
                    format!("{directive} failed at {path}: {e}"),
                    path.to_string(),
                )
            })
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::with_default_matchers()
    }
}

/// Nested comparisons requested by matchers. No document context is attached,
/// the outer comparison adds its own.
impl SubsetCompare for Comparator {
    fn compare(&self, needle: &Value, haystack: &Value) -> Result<(), ComparisonFailure> {
        self.node(needle, haystack, &KeyPath::root())
    }
}

fn decode_side(side: &str, json: &str) -> Result<Value, ComparisonFailure> {
    serde_json::from_str(json).map_err(|e| {
        ComparisonFailure::new(
            ErrorKind::Argument,
            format!("{side} is not valid JSON: {e}"),
            KeyPath::root().to_string(),
        )
    })
}

fn mismatch(message: String, path: &KeyPath) -> ComparisonFailure {
    ComparisonFailure::new(ErrorKind::Mismatch, message, path.to_string())
}

fn type_mismatch(expected: &str, haystack: &Value, path: &KeyPath) -> ComparisonFailure {
    mismatch(
        format!(
            "Type mismatch at {path}: expected {expected}, got \"{}\".",
            type_name(haystack)
        ),
        path,
    )
}

fn missing_key(key: &str, path: &KeyPath) -> ComparisonFailure {
    mismatch(
        format!("Haystack object at {path} is missing the \"{key}\" key."),
        path,
    )
}

fn not_a_list(base: &str, path: &KeyPath) -> ComparisonFailure {
    mismatch(
        format!("Element at key \"{base}\" in the haystack object at {path} is not a list."),
        &path.key(base),
    )
}

/// The list stored under `base`, for `key[]` and `key[N]` lookups.
fn list_at<'a>(
    actual: &'a Map<String, Value>,
    base: &str,
    path: &KeyPath,
) -> Result<&'a Value, ComparisonFailure> {
    match actual.get(base) {
        None => Err(missing_key(base, path)),
        Some(list @ Value::Array(_)) => Ok(list),
        Some(_) => Err(not_a_list(base, path)),
    }
}
