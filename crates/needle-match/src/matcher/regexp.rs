//! `regExp`: regular expression matching on scalar haystack values.
//!
//! The pattern argument is either delimited, `/body/flags`, or a raw pattern in
//! `regex` syntax. Supported flags:
//!
//! | Flag | Effect |
//! |------|--------|
//! | `i`  | case-insensitive |
//! | `m`  | `^`/`$` match at line boundaries |
//! | `s`  | `.` matches `\n` |
//! | `x`  | ignore whitespace and `#` comments in the pattern |
//! | `U`  | swap greedy and lazy quantifiers |
//! | `u`  | accepted; patterns are always Unicode-aware |
//!
//! A tail after the last `/` containing anything but these letters makes the
//! whole argument a raw pattern.
//!
//! Matching is unanchored: the pattern has to match somewhere in the subject.

use crate::error::MatcherError;
use crate::registry::{MatchContext, Matcher};
use crate::value::type_name;
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Regular expression matcher with a cache of compiled patterns.
#[derive(Debug, Default)]
pub struct RegExp {
    cache: RwLock<HashMap<String, Arc<Regex>>>,
}

impl RegExp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct patterns compiled so far.
    pub fn cached_patterns(&self) -> usize {
        self.cache.read().len()
    }

    fn compile(&self, raw: &str) -> Result<Arc<Regex>, MatcherError> {
        if let Some(regex) = self.cache.read().get(raw) {
            return Ok(Arc::clone(regex));
        }

        let regex = Arc::new(build_regex(raw)?);
        trace!(pattern = %raw, "compiled regular expression");
        self.cache
            .write()
            .entry(raw.to_string())
            .or_insert_with(|| Arc::clone(&regex));
        Ok(regex)
    }
}

const SUPPORTED_FLAGS: &str = "imsxUu";

/// Split `/body/flags` into its parts. A tail after the last `/` that is not
/// made of supported flags means the whole argument is a raw pattern, so
/// `/api/users` matches the path literally.
fn split_delimited(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let flags = &rest[close + 1..];
    flags
        .chars()
        .all(|c| SUPPORTED_FLAGS.contains(c))
        .then(|| (&rest[..close], flags))
}

fn build_regex(raw: &str) -> Result<Regex, MatcherError> {
    let (body, flags) = split_delimited(raw).unwrap_or((raw, ""));
    let mut builder = RegexBuilder::new(body);

    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'U' => builder.swap_greed(true),
            // only `u` is left after split_delimited
            _ => builder.unicode(true),
        };
    }

    builder.build().map_err(|e| {
        MatcherError::argument(format!("Invalid regular expression \"{raw}\": {e}"))
    })
}

impl Matcher for RegExp {
    fn evaluate(
        &self,
        ctx: &MatchContext<'_>,
        actual: &Value,
        args: &[String],
    ) -> Result<(), MatcherError> {
        ctx.expect_arity(args, 1)?;
        let pattern = args[0].as_str();
        let regex = self.compile(pattern)?;

        let subject = match actual {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(MatcherError::mismatch(format!(
                    "Regular expression matching can only be applied to strings, integers or doubles, got \"{}\".",
                    type_name(other)
                )))
            }
        };

        if !regex.is_match(&subject) {
            return Err(MatcherError::mismatch(format!(
                "Subject \"{subject}\" did not match pattern \"{pattern}\"."
            )));
        }
        Ok(())
    }
}
