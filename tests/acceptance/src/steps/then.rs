//! Then step definitions

use crate::world::{docstring, NeedleWorld};
use cucumber::gherkin::Step;
use cucumber::then;
use serde_json::Value;

fn assert_body_matches(world: &NeedleWorld, needle: Value) {
    if let Err(failure) = world.comparator.compare(&needle, &world.body_json()) {
        panic!("{failure}");
    }
}

#[then("the response body contains JSON:")]
fn body_contains_json(world: &mut NeedleWorld, step: &Step) {
    if let Err(failure) = world.compare_body(docstring(step)) {
        panic!("{failure}");
    }
}

#[then("the response body does not contain JSON:")]
fn body_does_not_contain_json(world: &mut NeedleWorld, step: &Step) {
    assert!(
        world.compare_body(docstring(step)).is_err(),
        "Expected the response body not to contain the given JSON"
    );
}

#[then("the response body is an empty JSON object")]
fn body_is_empty_object(world: &mut NeedleWorld) {
    assert_eq!(world.body_json(), Value::Object(Default::default()));
}

#[then("the response body is an empty JSON array")]
fn body_is_empty_array(world: &mut NeedleWorld) {
    assert_body_matches(world, Value::from("@arrayLength(0)"));
}

#[then(expr = "the response body is a JSON array of length {int}")]
fn body_array_length(world: &mut NeedleWorld, length: usize) {
    assert_body_matches(world, Value::from(format!("@arrayLength({length})")));
}

#[then(expr = "the response body is a JSON array with a length of at least {int}")]
fn body_array_min_length(world: &mut NeedleWorld, length: usize) {
    assert_body_matches(world, Value::from(format!("@arrayMinLength({length})")));
}

#[then(expr = "the response body is a JSON array with a length of at most {int}")]
fn body_array_max_length(world: &mut NeedleWorld, length: usize) {
    assert_body_matches(world, Value::from(format!("@arrayMaxLength({length})")));
}

#[then("the comparison succeeds")]
fn comparison_succeeds(world: &mut NeedleWorld) {
    if let Some(Err(failure)) = &world.outcome {
        panic!("{failure}");
    }
    assert!(world.outcome.is_some(), "No comparison was run");
}

#[then(expr = "the comparison fails with a(n) {word} error")]
fn comparison_fails_with(world: &mut NeedleWorld, kind: String) {
    let failure = world.last_failure();
    assert_eq!(failure.kind().label(), kind, "{failure}");
}

#[then(expr = "the failure message contains {string}")]
fn failure_message_contains(world: &mut NeedleWorld, expected: String) {
    let failure = world.last_failure();
    assert!(
        failure.message().contains(&expected),
        "Expected message to contain {expected:?}, got {:?}",
        failure.message()
    );
}

#[then(expr = "the failure path is {string}")]
fn failure_path_is(world: &mut NeedleWorld, expected: String) {
    assert_eq!(world.last_failure().path(), expected);
}
