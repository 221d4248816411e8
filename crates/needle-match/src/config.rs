//! File-based comparator configuration.
//!
//! ```yaml
//! tokens:
//!   - name: session
//!     secret: supersecret
//!     algorithms: [HS256]
//!     payload:
//!       sub: "1234567890"
//!       admin: true
//! disabled_functions:
//!   - regExp
//! ```
//!
//! JSON documents are accepted as well since they are valid YAML.

use crate::comparator::Comparator;
use crate::matcher::{parse_algorithm, DEFAULT_FUNCTIONS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// A token made available to `@jwt(name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    pub name: String,
    pub secret: String,
    /// Expected claims; must be an object
    pub payload: Value,
    /// Allowed signing algorithms; all HMAC algorithms when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparatorConfig {
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
    /// Built-in functions to leave unregistered
    #[serde(default)]
    pub disabled_functions: Vec<String>,
}

impl ComparatorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
        let config: ComparatorConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut seen = HashSet::new();
        for token in &self.tokens {
            if token.name.trim().is_empty() {
                anyhow::bail!("Token names must not be empty");
            }
            if !seen.insert(token.name.as_str()) {
                anyhow::bail!("Duplicate token name: '{}'", token.name);
            }
            if !token.payload.is_object() {
                anyhow::bail!(
                    "Payload of token '{}' must be an object, got {}",
                    token.name,
                    crate::value::type_name(&token.payload)
                );
            }
            if let Some(algorithms) = &token.algorithms {
                if algorithms.is_empty() {
                    anyhow::bail!("Token '{}' must allow at least one algorithm", token.name);
                }
                for algorithm in algorithms {
                    parse_algorithm(algorithm)
                        .map_err(|e| anyhow::anyhow!("Token '{}': {e}", token.name))?;
                }
            }
        }

        for name in &self.disabled_functions {
            if !DEFAULT_FUNCTIONS.contains(&name.as_str()) {
                anyhow::bail!(
                    "Unknown function in disabled_functions: '{name}'. Known functions: {}",
                    DEFAULT_FUNCTIONS.join(", ")
                );
            }
        }
        Ok(())
    }

    /// Build a default comparator adjusted by this configuration.
    pub fn build(&self) -> Result<Comparator, anyhow::Error> {
        self.validate()?;
        let mut comparator = Comparator::with_default_matchers();

        for name in &self.disabled_functions {
            comparator.remove_function(name);
            debug!(function = %name, "disabled matcher function");
        }

        for token in &self.tokens {
            let Value::Object(payload) = &token.payload else {
                anyhow::bail!("Payload of token '{}' must be an object", token.name);
            };
            match &token.algorithms {
                Some(algorithms) => {
                    let algorithms: Vec<&str> = algorithms.iter().map(String::as_str).collect();
                    comparator
                        .add_token_with_algorithms(
                            token.name.clone(),
                            payload.clone(),
                            token.secret.clone(),
                            &algorithms,
                        )
                        .map_err(|e| anyhow::anyhow!("Token '{}': {e}", token.name))?;
                }
                None => {
                    comparator.add_token(token.name.clone(), payload.clone(), token.secret.clone());
                }
            }
        }

        Ok(comparator)
    }
}
