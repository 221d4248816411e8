//! Key paths and the `key[N]` / `key[]` needle key syntax.

use std::fmt;

/// One step in a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a node inside a document, rendered JSONPath-style.
///
/// `$` is the root, object keys render as `.key` (or `["odd key"]` when the key is
/// not a plain identifier) and list positions as `[N]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of an object member below this one.
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.to_string()));
        Self { segments }
    }

    /// Path of a list element below this one.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) if is_plain_key(key) => write!(f, ".{key}")?,
                Segment::Key(key) => {
                    let quoted = serde_json::to_string(key).map_err(|_| fmt::Error)?;
                    write!(f, "[{quoted}]")?
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// How a needle object key addresses the haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySelector<'a> {
    /// Ordinary member lookup
    Plain(&'a str),
    /// `key[N]`: element `N` of the list stored at `key`
    Index(&'a str, usize),
    /// `key[]`: the whole list stored at `key`
    WholeList(&'a str),
}

/// Interpret a needle object key.
///
/// Keys that do not end in a well-formed `[N]` or `[]` suffix, or that have
/// nothing before the bracket, are plain keys.
pub fn parse_key(key: &str) -> KeySelector<'_> {
    let Some(inner_and_base) = key.strip_suffix(']') else {
        return KeySelector::Plain(key);
    };
    let Some(open) = inner_and_base.rfind('[') else {
        return KeySelector::Plain(key);
    };

    let base = &inner_and_base[..open];
    let inner = &inner_and_base[open + 1..];
    if base.is_empty() {
        return KeySelector::Plain(key);
    }
    if inner.is_empty() {
        return KeySelector::WholeList(base);
    }
    if !inner.bytes().all(|b| b.is_ascii_digit()) {
        return KeySelector::Plain(key);
    }
    match inner.parse::<usize>() {
        Ok(index) => KeySelector::Index(base, index),
        Err(_) => KeySelector::Plain(key),
    }
}
