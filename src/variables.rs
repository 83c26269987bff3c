//! `@name` variable substitution
//!
//! Variables are referenced as `@name` where the name is the longest run of
//! ASCII alphanumerics and underscores following the `@`. A doubled `@@` is an
//! escaped literal `@`, so `@@name` renders as `@name` and is never looked up.
//! A lone `@` that is not followed by a name is kept as-is.

use std::collections::BTreeMap;

use crate::error::{RegError, Result};

/// Flat mapping of variable name to value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable, returning the previous value if the name was taken
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Expand every `@name` reference in `source`
    pub fn resolve(&self, source: &str) -> Result<String> {
        resolve_variables(source, self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut variables = Variables::new();
        for (name, value) in iter {
            variables.insert(name, value);
        }
        variables
    }
}

/// A piece of scanned source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// `@@`, emitted as a single `@`
    EscapedAt,
    /// `@name`, holds the name without the `@`
    VariableRef(&'a str),
    Literal(&'a str),
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn scan(source: &str) -> Vec<Segment<'_>> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'@' {
            i += 1;
            continue;
        }

        if literal_start < i {
            segments.push(Segment::Literal(&source[literal_start..i]));
        }

        if bytes.get(i + 1) == Some(&b'@') {
            segments.push(Segment::EscapedAt);
            i += 2;
            literal_start = i;
            continue;
        }

        let name_len = bytes[i + 1..].iter().take_while(|b| is_name_byte(**b)).count();
        if name_len == 0 {
            // Lone '@': stays part of the next literal run
            literal_start = i;
            i += 1;
            continue;
        }

        segments.push(Segment::VariableRef(&source[i + 1..i + 1 + name_len]));
        i += 1 + name_len;
        literal_start = i;
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Literal(&source[literal_start..]));
    }

    segments
}

fn first_reference(value: &str) -> Option<&str> {
    if !value.contains('@') {
        return None;
    }
    scan(value).into_iter().find_map(|segment| match segment {
        Segment::VariableRef(name) => Some(name),
        _ => None,
    })
}

/// Replace every `@name` in `source` with its value from `variables`.
///
/// Values are inserted verbatim and never expanded themselves. Any reference
/// left without a matching variable fails the whole resolution, including a
/// `@name` carried inside a substituted value. An escaped `@@` inside a value
/// is kept as written.
pub fn resolve_variables(source: &str, variables: &Variables) -> Result<String> {
    if !source.contains('@') {
        return Ok(source.to_string());
    }

    let mut resolved = String::with_capacity(source.len());
    for segment in scan(source) {
        match segment {
            Segment::Literal(text) => resolved.push_str(text),
            Segment::EscapedAt => resolved.push('@'),
            Segment::VariableRef(name) => match variables.get(name) {
                Some(value) => {
                    // A reference surviving in the value would reach the output as-is
                    if let Some(leftover) = first_reference(value) {
                        return Err(RegError::UnresolvedVariable {
                            fragment: format!("@{}", leftover),
                            input: source.to_string(),
                        });
                    }
                    resolved.push_str(value);
                }
                None => {
                    return Err(RegError::UnresolvedVariable {
                        fragment: format!("@{}", name),
                        input: source.to_string(),
                    })
                }
            },
        }
    }

    Ok(resolved)
}
