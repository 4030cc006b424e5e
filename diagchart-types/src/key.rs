//! Grouping keys and x-axis ticks.

use std::fmt;

/// Label used when a record lacks the field it is grouped by.
pub const UNKNOWN_KEY: &str = "(unknown)";

/// The dimension a chart breaks data down by.
///
/// A key is a tuple of one or more parts (namespace, host, IP, or a compound
/// such as `("10.0.0.1", "created")`). It displays as its parts joined by a
/// single space, which is the dataset label shown in charts.
///
/// Equality, hashing and grouping use the parts, never the display string, so
/// `compound(["10.0.0.1", "created"])` and `new("10.0.0.1 created")` stay
/// separate groups even though their labels read the same. Use
/// [`GroupKey::parts`] when a key has to round-trip through text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupKey {
    parts: Vec<String>,
}

impl GroupKey {
    /// Create a single-part key.
    pub fn new(part: impl Into<String>) -> Self {
        Self {
            parts: vec![part.into()],
        }
    }

    /// Create a compound key from several parts.
    pub fn compound<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// The sentinel key for records missing their grouping field.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_KEY)
    }

    pub fn is_unknown(&self) -> bool {
        self.parts.len() == 1 && self.parts[0] == UNKNOWN_KEY
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// First part of the key (the primary dimension).
    pub fn primary(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or(UNKNOWN_KEY)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join(" "))
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GroupKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A position on the x axis.
///
/// Timestamps are normalised to epoch milliseconds; anything that is not a
/// timestamp (host names, namespaces, unparseable times) stays a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Tick {
    Millis(i64),
    Label(String),
}

impl Tick {
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            Tick::Millis(ms) => Some(*ms),
            Tick::Label(_) => None,
        }
    }

    pub fn label(s: impl Into<String>) -> Self {
        Tick::Label(s.into())
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tick::Millis(ms) => write!(f, "{}", ms),
            Tick::Label(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Tick {
    fn from(ms: i64) -> Self {
        Tick::Millis(ms)
    }
}

impl From<&str> for Tick {
    fn from(s: &str) -> Self {
        Tick::Label(s.to_string())
    }
}
