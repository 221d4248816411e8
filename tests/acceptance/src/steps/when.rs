//! When step definitions

use crate::world::{docstring, NeedleWorld};
use cucumber::gherkin::Step;
use cucumber::when;

#[when("I compare the response body against:")]
fn compare_body(world: &mut NeedleWorld, step: &Step) {
    let outcome = world.compare_body(docstring(step));
    if let Err(failure) = &outcome {
        tracing::debug!("comparison failed: {}", failure.message());
    }
    world.outcome = Some(outcome);
}
