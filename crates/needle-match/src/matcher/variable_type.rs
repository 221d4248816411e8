//! `variableType`: assert the JSON type of a haystack value.

use crate::error::MatcherError;
use crate::registry::{MatchContext, Matcher};
use crate::value::{is_scalar, type_name};
use serde_json::Value;

/// Type names accepted as the `variableType` argument.
pub const VALID_TYPES: [&str; 8] = [
    "integer", "boolean", "double", "string", "array", "object", "null", "scalar",
];

/// Resolve aliases (`bool`, `int`, `float`) and casing to a canonical type name.
fn normalize(raw: &str) -> Option<&'static str> {
    let lowered = raw.trim().to_ascii_lowercase();
    let canonical = match lowered.as_str() {
        "bool" => "boolean",
        "int" => "integer",
        "float" => "double",
        other => other,
    };
    VALID_TYPES.iter().copied().find(|t| *t == canonical)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableType;

impl Matcher for VariableType {
    fn evaluate(
        &self,
        ctx: &MatchContext<'_>,
        actual: &Value,
        args: &[String],
    ) -> Result<(), MatcherError> {
        ctx.expect_arity(args, 1)?;
        let expected = normalize(&args[0]).ok_or_else(|| {
            MatcherError::argument(format!("Unsupported variable type: \"{}\".", args[0]))
        })?;

        let actual_type = type_name(actual);
        let holds = match expected {
            "scalar" => is_scalar(actual),
            other => other == actual_type,
        };

        if !holds {
            return Err(MatcherError::mismatch(format!(
                "Expected variable type \"{expected}\", got \"{actual_type}\"."
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::matcher::testing::evaluate;
    use serde_json::json;

    #[test]
    fn test_each_type() {
        let cases = [
            ("integer", json!(1)),
            ("boolean", json!(false)),
            ("double", json!(1.5)),
            ("string", json!("s")),
            ("array", json!([])),
            ("object", json!({})),
            ("null", json!(null)),
        ];
        for (name, value) in cases {
            let source = format!("@variableType({name})");
            assert!(evaluate(&VariableType, &source, &value).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_aliases_and_case() {
        assert!(evaluate(&VariableType, "@variableType(int)", &json!(3)).is_ok());
        assert!(evaluate(&VariableType, "@variableType(bool)", &json!(true)).is_ok());
        assert!(evaluate(&VariableType, "@variableType(float)", &json!(0.5)).is_ok());
        assert!(evaluate(&VariableType, "@variableType(String)", &json!("x")).is_ok());
    }

    #[test]
    fn test_integer_is_not_double() {
        let err = evaluate(&VariableType, "@variableType(double)", &json!(3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mismatch);
        assert_eq!(err.message(), "Expected variable type \"double\", got \"integer\".");
    }

    #[test]
    fn test_scalar_excludes_null_and_containers() {
        for value in [json!(1), json!(2.5), json!("s"), json!(true)] {
            assert!(evaluate(&VariableType, "@variableType(scalar)", &value).is_ok());
        }
        for value in [json!(null), json!([]), json!({"a": 1})] {
            let err = evaluate(&VariableType, "@variableType(scalar)", &value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Mismatch, "{value}");
        }
    }

    #[test]
    fn test_unsupported_type_is_an_argument_error() {
        let err = evaluate(&VariableType, "@variableType(number)", &json!(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert_eq!(err.message(), "Unsupported variable type: \"number\".");
    }
}
