use serde::{Deserialize, Serialize};
use std::fmt;

/// An airport, keyed by its short code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub abbrev: String,
    pub name: String,
}

impl Airport {
    pub fn new(abbrev: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            abbrev: abbrev.into(),
            name: name.into(),
        }
    }

    /// Parses the `"CDG / Paris Charles de Gaulle"` label used by the game
    ///
    /// Returns None when the label has no `/` separator or an empty code.
    pub fn from_label(label: &str) -> Option<Self> {
        let (abbrev, name) = label.split_once('/')?;
        let abbrev = abbrev.trim();
        if abbrev.is_empty() {
            return None;
        }
        Some(Self::new(abbrev, name.trim()))
    }
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.abbrev, self.name)
    }
}
