//! Error types for directive parsing, matcher evaluation and comparisons.
//!
//! Every failure path in the crate resolves to one of three kinds:
//! - `Syntax` - a directive token is malformed
//! - `Argument` - a directive was invoked with unusable arguments, or names an
//!   unknown function or token
//! - `Mismatch` - the haystack does not satisfy the needle

use serde::Serialize;
use serde_json::Value;

/// Classification of a failed comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed directive token.
    Syntax,
    /// Wrong arity, non-coercible argument, unknown directive or token name.
    Argument,
    /// The haystack does not satisfy the needle.
    Mismatch,
}

impl ErrorKind {
    /// Get the label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Argument => "argument",
            ErrorKind::Mismatch => "mismatch",
        }
    }
}

/// A string looked like a directive (`@name(`) but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid directive \"{input}\": {reason} at offset {offset} (near \"{offending}\").")]
pub struct DirectiveSyntaxError {
    /// The complete string that failed to parse
    pub input: String,
    /// The substring where parsing gave up
    pub offending: String,
    /// Byte offset of `offending` within `input`
    pub offset: usize,
    /// What went wrong
    pub reason: String,
}

impl DirectiveSyntaxError {
    const MAX_OFFENDING_CHARS: usize = 24;

    pub(crate) fn new(input: &str, offset: usize, reason: impl Into<String>) -> Self {
        let offending: String = input
            .get(offset..)
            .unwrap_or_default()
            .chars()
            .take(Self::MAX_OFFENDING_CHARS)
            .collect();

        Self {
            input: input.to_string(),
            offending,
            offset,
            reason: reason.into(),
        }
    }
}

/// Failure reported by a matcher function.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// The directive arguments (or the registered state they refer to) are unusable.
    #[error("{0}")]
    Argument(String),
    /// The haystack value does not satisfy the matcher.
    #[error("{0}")]
    Mismatch(String),
}

impl MatcherError {
    pub fn argument(message: impl Into<String>) -> Self {
        MatcherError::Argument(message.into())
    }

    pub fn mismatch(message: impl Into<String>) -> Self {
        MatcherError::Mismatch(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MatcherError::Argument(_) => ErrorKind::Argument,
            MatcherError::Mismatch(_) => ErrorKind::Mismatch,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            MatcherError::Argument(message) | MatcherError::Mismatch(message) => message,
        }
    }
}

/// The first failure found while comparing a needle against a haystack.
///
/// `needle` and `haystack` hold the complete documents handed to
/// [`Comparator::compare`](crate::Comparator::compare), not only the failing
/// fragment, so the report can be diffed side by side. The `Display` output and
/// [`ComparisonFailure::diff`] live in the `report` module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonFailure {
    pub kind: ErrorKind,
    pub message: String,
    /// JSONPath-style location of the failing node (e.g. `$.users[1].name`)
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needle: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub haystack: Option<Value>,
}

impl ComparisonFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: path.into(),
            needle: None,
            haystack: None,
        }
    }

    /// Attach the documents the comparison was started with.
    pub fn with_context(mut self, needle: &Value, haystack: &Value) -> Self {
        self.needle = Some(needle.clone());
        self.haystack = Some(haystack.clone());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_mismatch(&self) -> bool {
        self.kind == ErrorKind::Mismatch
    }
}

impl std::error::Error for ComparisonFailure {}
