//! Two-level category labels.

use std::fmt;

use serde::{Deserialize, Serialize};

const SEPARATOR: char = ':';

/// Category label split into a top-level group and an optional subgroup.
///
/// Stored data encodes categories as `"Group:Subgroup"` strings. The split
/// happens at the first colon and keeps both halves verbatim, so converting
/// back to a string reproduces the original text exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category {
    group: String,
    sub: Option<String>,
}

impl Category {
    pub fn new(group: impl Into<String>, sub: Option<String>) -> Self {
        Self {
            group: group.into(),
            sub,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.split_once(SEPARATOR) {
            Some((group, sub)) => Self::new(group, Some(sub.to_string())),
            None => Self::new(raw, None),
        }
    }

    /// Label used for aggregation grouping.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Subgroup label with surrounding whitespace removed.
    pub fn sub_label(&self) -> Option<&str> {
        self.sub.as_deref().map(str::trim)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse(&value)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::parse(value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "{}{}{}", self.group, SEPARATOR, sub),
            None => f.write_str(&self.group),
        }
    }
}
