//! Given step definitions

use crate::world::{docstring, NeedleWorld};
use cucumber::gherkin::Step;
use cucumber::given;
use needle_match::ComparatorConfig;
use serde_json::Value;

#[given("the response body is:")]
fn set_body(world: &mut NeedleWorld, step: &Step) {
    world.body = Some(docstring(step).to_string());
}

#[given(expr = "the response body contains a JWT identified by {string}, signed with {string}:")]
fn add_jwt(world: &mut NeedleWorld, name: String, secret: String, step: &Step) {
    let payload: Value =
        serde_json::from_str(docstring(step)).expect("JWT payload is not valid JSON");
    let payload = match payload {
        Value::Object(map) => map,
        other => panic!("JWT payload must be a JSON object, got {other}"),
    };
    world.comparator.add_token(name, payload, secret);
}

#[given("the comparator is configured with:")]
fn configure(world: &mut NeedleWorld, step: &Step) {
    let config = ComparatorConfig::from_yaml(docstring(step)).expect("Invalid comparator config");
    world.comparator = config.build().expect("Failed to build comparator");
}
