//! Matcher trait and the name-to-matcher registry.
//!
//! Matchers receive a [`MatchContext`] on every call. The context carries the
//! comparator that is currently walking the document, so a matcher that needs to
//! recurse (the JWT matcher subset-matches decoded claims) gets that capability
//! injected instead of holding a reference back to its owner.

use crate::directive::Directive;
use crate::error::{ComparisonFailure, MatcherError};
use crate::path::KeyPath;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Capability to subset-match a needle against a haystack.
pub trait SubsetCompare {
    fn compare(&self, needle: &Value, haystack: &Value) -> Result<(), ComparisonFailure>;
}

/// Per-invocation state handed to a matcher.
pub struct MatchContext<'a> {
    comparator: &'a dyn SubsetCompare,
    directive: &'a Directive,
    path: &'a KeyPath,
}

impl<'a> MatchContext<'a> {
    pub fn new(
        comparator: &'a dyn SubsetCompare,
        directive: &'a Directive,
        path: &'a KeyPath,
    ) -> Self {
        Self {
            comparator,
            directive,
            path,
        }
    }

    /// The directive being evaluated.
    pub fn directive(&self) -> &Directive {
        self.directive
    }

    /// Name the matcher was invoked under.
    pub fn name(&self) -> &str {
        &self.directive.name
    }

    /// Location of the haystack value being matched.
    pub fn path(&self) -> &KeyPath {
        self.path
    }

    /// Subset-match with the comparator that invoked this matcher.
    pub fn compare(&self, needle: &Value, haystack: &Value) -> Result<(), ComparisonFailure> {
        self.comparator.compare(needle, haystack)
    }

    /// Fail with an `Argument` error unless exactly `expected` arguments were given.
    pub fn expect_arity(&self, args: &[String], expected: usize) -> Result<(), MatcherError> {
        if args.len() != expected {
            return Err(MatcherError::argument(format!(
                "@{} expects {expected} argument{}, got {}.",
                self.name(),
                if expected == 1 { "" } else { "s" },
                args.len()
            )));
        }
        Ok(())
    }
}

/// A named assertion that can be invoked from a directive.
///
/// `actual` is the haystack value at the directive's position and `args` are the
/// raw directive arguments. Implementations validate and coerce their own
/// arguments and never panic on bad input.
pub trait Matcher: Send + Sync {
    fn evaluate(
        &self,
        ctx: &MatchContext<'_>,
        actual: &Value,
        args: &[String],
    ) -> Result<(), MatcherError>;
}

impl<F> Matcher for F
where
    F: Fn(&Value, &[String]) -> Result<(), MatcherError> + Send + Sync,
{
    fn evaluate(
        &self,
        _ctx: &MatchContext<'_>,
        actual: &Value,
        args: &[String],
    ) -> Result<(), MatcherError> {
        self(actual, args)
    }
}

/// Mapping from directive name to matcher.
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    functions: HashMap<String, Arc<dyn Matcher>>,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `matcher` under `name`, replacing any previous registration.
    pub fn register<M>(&mut self, name: impl Into<String>, matcher: M) -> &mut Self
    where
        M: Matcher + 'static,
    {
        self.register_shared(name, Arc::new(matcher))
    }

    /// Install an already shared matcher (used when the caller keeps a handle).
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        matcher: Arc<dyn Matcher>,
    ) -> &mut Self {
        let name = name.into();
        if self.functions.insert(name.clone(), matcher).is_some() {
            debug!(function = %name, "replaced registered matcher function");
        }
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Matcher>> {
        self.functions.remove(name)
    }

    /// Look up a matcher by directive name.
    pub fn resolve(&self, name: &str) -> Result<&dyn Matcher, MatcherError> {
        self.functions
            .get(name)
            .map(|matcher| matcher.as_ref())
            .ok_or_else(|| {
                MatcherError::argument(format!(
                    "Unknown directive \"@{name}\": no function named \"{name}\" is registered."
                ))
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
