//! `jwt`: match a signed token in the haystack against a registered payload.
//!
//! Tokens are registered by name together with the expected claims and the HMAC
//! secret. When `@jwt(name)` is evaluated the haystack string is decoded and
//! verified, then its claims are subset-matched against the registered payload
//! using the comparator that invoked the matcher, so registered payloads may
//! themselves contain directives.

use crate::error::{ErrorKind, MatcherError};
use crate::registry::{MatchContext, Matcher};
use crate::value::type_name;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Signing algorithms a token may be registered with.
pub const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Parse an algorithm name, accepting only the HMAC family.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, MatcherError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(MatcherError::argument(format!(
            "Unsupported JWT algorithm \"{name}\", expected one of HS256, HS384, HS512."
        ))),
    }
}

/// Expected payload and verification settings for one named token.
#[derive(Clone)]
pub struct RegisteredToken {
    pub payload: Map<String, Value>,
    secret: String,
    pub algorithms: Vec<Algorithm>,
}

impl RegisteredToken {
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = self.algorithms.clone();
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation
    }
}

impl fmt::Debug for RegisteredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredToken")
            .field("payload", &self.payload)
            .field("secret", &"<redacted>")
            .field("algorithms", &self.algorithms)
            .finish()
    }
}

/// The `jwt` matcher and its table of registered tokens.
#[derive(Default)]
pub struct JwtMatcher {
    tokens: RwLock<HashMap<String, RegisteredToken>>,
}

impl JwtMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token accepting any HMAC algorithm.
    pub fn add_token(
        &self,
        name: impl Into<String>,
        payload: Map<String, Value>,
        secret: impl Into<String>,
    ) -> &Self {
        self.insert(name.into(), payload, secret.into(), HMAC_ALGORITHMS.to_vec());
        self
    }

    /// Register a token restricted to the named algorithms.
    pub fn add_token_with_algorithms(
        &self,
        name: impl Into<String>,
        payload: Map<String, Value>,
        secret: impl Into<String>,
        algorithms: &[&str],
    ) -> Result<&Self, MatcherError> {
        let name = name.into();
        if algorithms.is_empty() {
            return Err(MatcherError::argument(format!(
                "JWT \"{name}\" must allow at least one algorithm."
            )));
        }
        let mut parsed = Vec::with_capacity(algorithms.len());
        for algorithm in algorithms {
            let algorithm = parse_algorithm(algorithm)?;
            if !parsed.contains(&algorithm) {
                parsed.push(algorithm);
            }
        }
        self.insert(name, payload, secret.into(), parsed);
        Ok(self)
    }

    fn insert(
        &self,
        name: String,
        payload: Map<String, Value>,
        secret: String,
        algorithms: Vec<Algorithm>,
    ) {
        debug!(token = %name, ?algorithms, "registered JWT");
        self.tokens.write().insert(
            name,
            RegisteredToken {
                payload,
                secret,
                algorithms,
            },
        );
    }

    pub fn contains_token(&self, name: &str) -> bool {
        self.tokens.read().contains_key(name)
    }

    /// Registered token names in sorted order.
    pub fn token_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tokens.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn remove_token(&self, name: &str) -> Option<RegisteredToken> {
        self.tokens.write().remove(name)
    }

    fn lookup(&self, name: &str) -> Result<RegisteredToken, MatcherError> {
        self.tokens
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| MatcherError::argument(format!("No JWT registered for \"{name}\".")))
    }
}

impl fmt::Debug for JwtMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtMatcher")
            .field("tokens", &self.token_names())
            .finish()
    }
}

impl Matcher for JwtMatcher {
    fn evaluate(
        &self,
        ctx: &MatchContext<'_>,
        actual: &Value,
        args: &[String],
    ) -> Result<(), MatcherError> {
        ctx.expect_arity(args, 1)?;
        // Cloned out so the table lock is not held across the nested comparison
        let token = self.lookup(&args[0])?;

        let Value::String(encoded) = actual else {
            return Err(MatcherError::mismatch(format!(
                "JWT matching can only be applied to strings, got \"{}\".",
                type_name(actual)
            )));
        };

        let key = DecodingKey::from_secret(token.secret.as_bytes());
        let claims = decode::<Map<String, Value>>(encoded, &key, &token.validation())
            .map_err(|e| MatcherError::mismatch(format!("Invalid JWT: {e}")))?
            .claims;

        let expected = Value::Object(token.payload);
        ctx.compare(&expected, &Value::Object(claims))
            .map_err(|failure| {
                let message = format!("JWT mismatch: {}", failure.message());
                match failure.kind() {
                    ErrorKind::Mismatch => MatcherError::mismatch(message),
                    ErrorKind::Syntax | ErrorKind::Argument => MatcherError::argument(message),
                }
            })
    }
}
