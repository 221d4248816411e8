//! Cucumber acceptance suite for the needle comparator
//!
//! Feature files under `features/` describe response bodies and the JSON they
//! must contain, the way an API test context would phrase them.

pub mod steps;
pub mod world;
