//! Human-readable rendering of a [`ComparisonFailure`].

use crate::error::ComparisonFailure;
use serde_json::Value;
use similar::TextDiff;
use std::fmt;

const BANNER_WIDTH: usize = 80;

fn banner(title: &str) -> String {
    let head = format!("= {title} ");
    let fill = BANNER_WIDTH.saturating_sub(head.chars().count());
    format!("{head}{}", "=".repeat(fill))
}

fn pretty(value: &Value) -> Result<String, fmt::Error> {
    serde_json::to_string_pretty(value).map_err(|_| fmt::Error)
}

impl ComparisonFailure {
    /// Unified line diff of the pretty-printed needle and haystack.
    ///
    /// Returns `None` when the failure carries no document context.
    pub fn diff(&self) -> Option<String> {
        let (needle, haystack) = (self.needle.as_ref()?, self.haystack.as_ref()?);
        let needle = serde_json::to_string_pretty(needle).ok()?;
        let haystack = serde_json::to_string_pretty(haystack).ok()?;

        let diff = TextDiff::from_lines(&needle, &haystack)
            .unified_diff()
            .context_radius(3)
            .header("needle", "haystack")
            .to_string();
        Some(diff)
    }
}

impl fmt::Display for ComparisonFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(needle) = &self.needle {
            write!(f, "\n\n{}\n{}", banner("Needle"), pretty(needle)?)?;
        }
        if let Some(haystack) = &self.haystack {
            write!(f, "\n\n{}\n{}", banner("Haystack"), pretty(haystack)?)?;
        }
        Ok(())
    }
}
