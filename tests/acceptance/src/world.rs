//! Test world containing shared state for cucumber tests

use cucumber::gherkin::Step;
use cucumber::World;
use needle_match::{Comparator, ComparisonFailure};
use serde_json::Value;

/// One comparator per scenario, so registered tokens never leak between them.
#[derive(Debug, Default, World)]
pub struct NeedleWorld {
    /// Comparator with the default matcher functions
    pub comparator: Comparator,

    /// Raw response body under test
    pub body: Option<String>,

    /// Outcome of the last explicit comparison
    pub outcome: Option<Result<(), ComparisonFailure>>,
}

impl NeedleWorld {
    /// Decoded response body. Panics when none was set or it is not JSON.
    pub fn body_json(&self) -> Value {
        let body = self.body.as_deref().expect("No response body set");
        serde_json::from_str(body).expect("Response body is not valid JSON")
    }

    /// Compare the response body against a needle document.
    pub fn compare_body(&self, needle: &str) -> Result<(), ComparisonFailure> {
        let needle: Value = serde_json::from_str(needle).expect("Needle is not valid JSON");
        self.comparator.compare(&needle, &self.body_json())
    }

    pub fn last_failure(&self) -> &ComparisonFailure {
        match self.outcome.as_ref().expect("No comparison was run") {
            Ok(()) => panic!("Expected the comparison to fail, but it succeeded"),
            Err(failure) => failure,
        }
    }
}

/// Doc string attached to a step.
pub fn docstring(step: &Step) -> &str {
    step.docstring
        .as_deref()
        .expect("Step requires a doc string")
}
