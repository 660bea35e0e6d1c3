//! Note tag extraction.
//!
//! Designers annotate static data with free-text notes containing bracketed
//! directives:
//!
//! ```text
//! <adaptive>                 presence flag
//! <piercing:0.4>             literal value
//! <sealtag:fire,ice>         literal value read as a list
//! <piercingeval>             code body (every line up to the closing marker)
//! (a.agi - b.agi) * 0.01
//! </piercingeval>
//! ```
//!
//! [`extract_tags`] turns a note into a [`TagSet`] once, at load time. Every
//! query afterwards reads the structured set instead of re-scanning text.

mod extract;

pub use extract::{FORMULA_TAGS, extract_tags, is_formula_tag};

use std::collections::BTreeMap;

/// A single parsed tag value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagValue {
    /// `<name>` with no payload.
    Flag,
    /// `<name:value>`; the value is kept verbatim.
    Literal(String),
    /// `<name>` ... `</name>`; lines between the markers, each followed by `\n`.
    Code(String),
}

impl TagValue {
    /// Truthiness of the tag when used as a boolean gate.
    ///
    /// Flags and code bodies are present and therefore truthy. Literals are
    /// truthy unless empty, `false`, or `0`.
    pub fn is_truthy(&self) -> bool {
        match self {
            TagValue::Flag | TagValue::Code(_) => true,
            TagValue::Literal(value) => {
                let value = value.trim();
                !(value.is_empty() || value.eq_ignore_ascii_case("false") || value == "0")
            }
        }
    }
}

/// Parsed tags of one note, keyed by lowercase tag name.
///
/// Absent tags have no entry; there is never an entry holding "nothing".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagSet {
    tags: BTreeMap<String, TagValue>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a raw note. Equivalent to [`extract_tags`].
    pub fn from_note(note: &str) -> Self {
        extract_tags(note)
    }

    pub(crate) fn insert(&mut self, name: String, value: TagValue) {
        self.tags.insert(name, value);
    }

    pub(crate) fn append_code(&mut self, name: &str, body: &str) {
        match self.tags.get_mut(name) {
            Some(TagValue::Code(existing)) => existing.push_str(body),
            _ => {
                self.tags
                    .insert(name.to_string(), TagValue::Code(body.to_string()));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// True when the tag is present and truthy.
    pub fn flag(&self, name: &str) -> bool {
        self.tags.get(name).is_some_and(TagValue::is_truthy)
    }

    /// Verbatim literal payload of `<name:value>`.
    pub fn literal(&self, name: &str) -> Option<&str> {
        match self.tags.get(name)? {
            TagValue::Literal(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Code body of a `<name>` ... `</name>` block.
    pub fn code(&self, name: &str) -> Option<&str> {
        match self.tags.get(name)? {
            TagValue::Code(body) => Some(body.as_str()),
            _ => None,
        }
    }

    /// Literal payload parsed as a number.
    ///
    /// `Ok(None)` when the tag is absent or carries no literal; `Err` holds the
    /// offending text when the literal is not numeric.
    pub fn number(&self, name: &str) -> Result<Option<f64>, String> {
        match self.literal(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| raw.to_string()),
        }
    }

    /// Literal payload split on commas, each entry trimmed; empty entries dropped.
    pub fn list(&self, name: &str) -> Vec<&str> {
        self.literal(name)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
