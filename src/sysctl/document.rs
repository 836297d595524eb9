//! Line-oriented `key = value` sysctl file with `#` comment headers.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: expected `key = value`, got '{text}'")]
pub struct ParseError {
    pub line: usize,
    pub text: String,
}

/// One line of a sysctl file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Comment(String),
    Blank,
    Entry { key: String, value: String },
}

/// Ordered sysctl document. Keys are unique: setting an existing key replaces
/// its value where it stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SysctlDocument {
    lines: Vec<Line>,
}

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z0-9_.\-/*]+)\s*=\s*(.*?)\s*$").expect("static regex")
    })
}

impl SysctlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Comment(text.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(Line::Blank);
        self
    }

    /// Set `key` to `value`. An existing entry is updated in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        for line in self.lines.iter_mut() {
            if let Line::Entry { key: k, value: v } = line {
                if *k == key {
                    *v = value;
                    return self;
                }
            }
        }
        self.lines.push(Line::Entry { key, value });
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|l| match l {
            Line::Entry { key, value } => Some((key.as_str(), value.as_str())),
            _ => None,
        })
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append every line of `other`, merging entries through [`set`](Self::set).
    pub fn extend(&mut self, other: &SysctlDocument) -> &mut Self {
        for line in &other.lines {
            match line {
                Line::Comment(c) => {
                    self.comment(c.clone());
                }
                Line::Blank => {
                    self.blank();
                }
                Line::Entry { key, value } => {
                    self.set(key.clone(), value.clone());
                }
            }
        }
        self
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut doc = SysctlDocument::new();
        for (idx, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                doc.blank();
            } else if let Some(rest) = trimmed.strip_prefix('#').or_else(|| trimmed.strip_prefix(';')) {
                doc.comment(rest.trim_start());
            } else if let Some(caps) = entry_re().captures(trimmed) {
                doc.set(&caps[1], &caps[2]);
            } else {
                return Err(ParseError { line: idx + 1, text: raw.to_string() });
            }
        }
        Ok(doc)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SysctlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                Line::Comment(c) if c.is_empty() => writeln!(f, "#")?,
                Line::Comment(c) => writeln!(f, "# {c}")?,
                Line::Blank => writeln!(f)?,
                Line::Entry { key, value } => writeln!(f, "{key} = {value}")?,
            }
        }
        Ok(())
    }
}
