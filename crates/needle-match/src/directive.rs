//! Directive tokens embedded in needle strings.
//!
//! A directive delegates the comparison of one haystack value to a named matcher
//! function:
//!
//! ```text
//! @arrayLength(3)
//! @regExp(/^[a-z]+$/i)
//! @jwt("my token")
//! ```
//!
//! The grammar is `@` + identifier + `(` + comma separated arguments + `)`, with the
//! closing parenthesis as the last character of the string.
//!
//! - Strings that do not start with `@identifier(` are ordinary values.
//! - Arguments are trimmed. A quoted argument (`"..."` or `'...'`) keeps commas and
//!   parentheses literally; inside quotes `\"`, `\'` and `\\` are escapes and any
//!   other backslash is kept as-is, so regular expressions survive quoting.
//! - Bare arguments may contain balanced `()`, `[]` and `{}` groups; commas inside
//!   a group do not split the argument.
//! - Arguments are returned as raw strings. Matchers coerce them.

use crate::error::DirectiveSyntaxError;
use std::fmt;

/// Character that opens a directive token.
pub const MARKER: char = '@';

/// A parsed directive: the matcher name and its raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub args: Vec<String>,
}

impl Directive {
    /// Parse a needle string.
    ///
    /// Returns `Ok(None)` for strings that are not directive-shaped, and an error
    /// for strings that start like a directive but are malformed.
    pub fn parse(input: &str) -> Result<Option<Self>, DirectiveSyntaxError> {
        let Some(name_len) = directive_name_len(input) else {
            return Ok(None);
        };

        let name = &input[MARKER.len_utf8()..MARKER.len_utf8() + name_len];
        // Byte offset of the opening parenthesis
        let open = MARKER.len_utf8() + name_len;
        let args = scan_arguments(input, open)?;

        Ok(Some(Directive {
            name: name.to_string(),
            args,
        }))
    }

    /// Whether `input` starts like a directive (`@identifier(`).
    pub fn is_directive_shaped(input: &str) -> bool {
        directive_name_len(input).is_some()
    }
}

/// Length of the identifier after the marker, if the string is directive-shaped.
fn directive_name_len(input: &str) -> Option<usize> {
    let rest = input.strip_prefix(MARKER)?;
    let bytes = rest.as_bytes();

    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();

    (bytes.get(len) == Some(&b'(')).then_some(len)
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Split the argument list starting at the opening parenthesis at byte `open`.
fn scan_arguments(input: &str, open: usize) -> Result<Vec<String>, DirectiveSyntaxError> {
    let mut args: Vec<String> = Vec::new();
    let mut current = String::new();
    // Expected closing character and offset of each open group in a bare argument
    let mut groups: Vec<(char, usize)> = Vec::new();
    // Set once a quoted argument has been closed; only a separator may follow
    let mut after_quote = false;
    let mut saw_separator = false;

    let mut chars = input[open + 1..]
        .char_indices()
        .map(|(i, c)| (i + open + 1, c));

    while let Some((offset, c)) = chars.next() {
        if after_quote {
            match c {
                ',' => {
                    args.push(std::mem::take(&mut current));
                    after_quote = false;
                    saw_separator = true;
                }
                ')' => {
                    ensure_no_trailing(input, offset)?;
                    args.push(current);
                    return Ok(args);
                }
                ws if ws.is_whitespace() => {}
                _ => {
                    return Err(DirectiveSyntaxError::new(
                        input,
                        offset,
                        "unexpected character after quoted argument",
                    ))
                }
            }
            continue;
        }

        match c {
            '"' | '\'' if groups.is_empty() && current.trim().is_empty() => {
                current.clear();
                let quote = c;
                loop {
                    match chars.next() {
                        None => {
                            return Err(DirectiveSyntaxError::new(
                                input,
                                offset,
                                "unterminated quoted argument",
                            ))
                        }
                        Some((_, ch)) if ch == quote => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped)) if escaped == quote || escaped == '\\' => {
                                current.push(escaped)
                            }
                            Some((_, other)) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => {
                                return Err(DirectiveSyntaxError::new(
                                    input,
                                    offset,
                                    "unterminated quoted argument",
                                ))
                            }
                        },
                        Some((_, ch)) => current.push(ch),
                    }
                }
                after_quote = true;
            }
            '(' | '[' | '{' => {
                groups.push((closer_for(c), offset));
                current.push(c);
            }
            ')' if groups.is_empty() => {
                ensure_no_trailing(input, offset)?;
                let last = current.trim();
                if !(args.is_empty() && last.is_empty() && !saw_separator) {
                    args.push(last.to_string());
                }
                return Ok(args);
            }
            ')' | ']' | '}' => match groups.pop() {
                Some((expected, _)) if expected == c => current.push(c),
                Some((expected, _)) => {
                    return Err(DirectiveSyntaxError::new(
                        input,
                        offset,
                        format!("mismatched '{c}', expected '{expected}'"),
                    ))
                }
                None => {
                    return Err(DirectiveSyntaxError::new(
                        input,
                        offset,
                        format!("unbalanced '{c}'"),
                    ))
                }
            },
            ',' if groups.is_empty() => {
                args.push(current.trim().to_string());
                current.clear();
                saw_separator = true;
            }
            _ => current.push(c),
        }
    }

    match groups.last() {
        Some((expected, group_offset)) => Err(DirectiveSyntaxError::new(
            input,
            *group_offset,
            format!("unclosed group, expected '{expected}'"),
        )),
        None => Err(DirectiveSyntaxError::new(
            input,
            open,
            "missing closing parenthesis",
        )),
    }
}

fn ensure_no_trailing(input: &str, close: usize) -> Result<(), DirectiveSyntaxError> {
    let after = close + 1;
    if after < input.len() {
        return Err(DirectiveSyntaxError::new(
            input,
            after,
            "unexpected characters after closing parenthesis",
        ));
    }
    Ok(())
}

fn needs_quoting(arg: &str) -> bool {
    arg.is_empty()
        || arg.trim() != arg
        || arg.starts_with('\'')
        || arg.contains('"')
        || arg.contains([',', '(', ')', '[', ']', '{', '}'])
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MARKER}{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if needs_quoting(arg) {
                let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{escaped}\"")?;
            } else {
                f.write_str(arg)?;
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> Directive {
        Directive::parse(input)
            .expect("should parse")
            .expect("should be a directive")
    }

    fn args(input: &str) -> Vec<String> {
        parse_ok(input).args
    }

    #[test]
    fn test_plain_strings_are_not_directives() {
        for input in ["", "hello", "@", "@user", "@9abc(1)", "me@host(1)", "@ f(1)", "@-x(1)"] {
            assert_eq!(Directive::parse(input).unwrap(), None, "{input}");
            assert!(!Directive::is_directive_shaped(input));
        }
    }

    #[test]
    fn test_simple_directive() {
        let directive = parse_ok("@arrayLength(3)");
        assert_eq!(directive.name, "arrayLength");
        assert_eq!(directive.args, vec!["3"]);
        assert!(Directive::is_directive_shaped("@arrayLength(3)"));
    }

    #[test]
    fn test_zero_and_empty_arguments() {
        assert!(args("@f()").is_empty());
        assert!(args("@f(  )").is_empty());
        assert_eq!(args("@f(a,)"), vec!["a", ""]);
        assert_eq!(args("@f(,)"), vec!["", ""]);
        assert_eq!(args("@f(\"\")"), vec![""]);
    }

    #[test]
    fn test_arguments_are_trimmed() {
        assert_eq!(args("@f( a , b ,c )"), vec!["a", "b", "c"]);
        assert_eq!(args("@_under_score9(x)"), vec!["x"]);
    }

    #[test]
    fn test_quoted_arguments_keep_separators() {
        assert_eq!(args(r#"@f("a, b", 'c)d')"#), vec!["a, b", "c)d"]);
        assert_eq!(args(r#"@f(  " padded "  )"#), vec![" padded "]);
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(args(r#"@f("say \"hi\"")"#), vec![r#"say "hi""#]);
        assert_eq!(args(r#"@f('it\'s')"#), vec!["it's"]);
        assert_eq!(args(r#"@f("a\\b")"#), vec![r"a\b"]);
        assert_eq!(args(r#"@f("^\d{1,3}$")"#), vec![r"^\d{1,3}$"]);
    }

    #[test]
    fn test_quotes_inside_bare_argument_are_literal() {
        assert_eq!(args("@f(it's)"), vec!["it's"]);
    }

    #[test]
    fn test_bare_groups_do_not_split() {
        assert_eq!(args("@regExp(/^(a|b){1,3}$/)"), vec!["/^(a|b){1,3}$/"]);
        assert_eq!(args("@f([1,2], {a,b}, (c))"), vec!["[1,2]", "{a,b}", "(c)"]);
    }

    #[test]
    fn test_missing_closing_parenthesis() {
        let err = Directive::parse("@gt(5").unwrap_err();
        assert!(err.reason.contains("missing closing parenthesis"));
        assert_eq!(err.offending, "(5");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = Directive::parse(r#"@f("abc)"#).unwrap_err();
        assert!(err.reason.contains("unterminated"));
        assert_eq!(err.offending, "\"abc)");
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn test_unbalanced_groups() {
        let err = Directive::parse("@f(a))").unwrap_err();
        assert!(err.reason.contains("after closing parenthesis"));

        let err = Directive::parse("@f(a])").unwrap_err();
        assert!(err.reason.contains("unbalanced ']'"));

        let err = Directive::parse("@f((a])").unwrap_err();
        assert!(err.reason.contains("mismatched"));

        let err = Directive::parse("@f((a").unwrap_err();
        assert!(err.reason.contains("unclosed group"));
    }

    #[test]
    fn test_trailing_characters() {
        let err = Directive::parse("@gt(5) and more").unwrap_err();
        assert_eq!(err.offending, " and more");
    }

    #[test]
    fn test_garbage_after_quoted_argument() {
        let err = Directive::parse(r#"@f("a"b)"#).unwrap_err();
        assert!(err.reason.contains("after quoted argument"));
        assert_eq!(err.offending, "b)");
    }

    #[test]
    fn test_display_is_reparseable() {
        let directive = Directive {
            name: "f".to_string(),
            args: vec!["plain".into(), "a, b".into(), r#"q"uote\"#.into(), "".into()],
        };
        let rendered = directive.to_string();
        assert_eq!(rendered, r#"@f(plain, "a, b", "q\"uote\\", "")"#);
        assert_eq!(parse_ok(&rendered), directive);
    }
}
