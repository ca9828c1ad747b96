//! Coded diagnostic identifiers such as `E201`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Family of a diagnostic code, shown as its leading letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Category {
    /// `E`: the run fails.
    Error,
    /// `W`: recoverable anomaly.
    Warning,
    /// `R`: router progress and summaries.
    Route,
}

impl Category {
    /// The leading letter of codes in this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Route => 'R',
        }
    }

    fn from_prefix(c: char) -> Option<Self> {
        match c {
            'E' => Some(Category::Error),
            'W' => Some(Category::Warning),
            'R' => Some(Category::Route),
            _ => None,
        }
    }
}

/// A category letter plus a three-digit number, e.g. `R301`.
///
/// Serialized as its display string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DiagnosticCode {
    /// Code family.
    pub category: Category,
    /// Number within the family.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

impl FromStr for DiagnosticCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let category = chars
            .next()
            .and_then(Category::from_prefix)
            .ok_or_else(|| format!("unknown diagnostic category in '{s}'"))?;
        let number = chars
            .as_str()
            .parse()
            .map_err(|_| format!("bad diagnostic number in '{s}'"))?;
        Ok(Self::new(category, number))
    }
}

impl From<DiagnosticCode> for String {
    fn from(code: DiagnosticCode) -> Self {
        code.to_string()
    }
}

impl TryFrom<String> for DiagnosticCode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
