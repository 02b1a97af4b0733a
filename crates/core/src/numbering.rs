use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A dotted-decimal heading number such as `4.1.6`.
///
/// Always holds at least one component. The level of a heading is the
/// number of components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Numbering(Vec<u32>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed heading number '{0}' (expected dot-separated non-negative integers)")]
pub struct MalformedNumbering(pub String);

impl Numbering {
    /// Parse a dot-separated numbering string.
    ///
    /// Every component must be a plain run of ASCII digits: no sign, no
    /// surrounding whitespace, no empty components (`"1..2"`, `"1."`).
    pub fn parse(s: &str) -> Result<Self, MalformedNumbering> {
        if s.is_empty() {
            return Err(MalformedNumbering(s.to_string()));
        }

        let components = s
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(MalformedNumbering(s.to_string()));
                }
                part.parse::<u32>()
                    .map_err(|_| MalformedNumbering(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Numbering(components))
    }

    pub fn level(&self) -> usize {
        self.0.len()
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// Last component (the sibling index within the parent).
    pub fn last(&self) -> u32 {
        // Non-empty by construction.
        self.0[self.0.len() - 1]
    }

    /// Everything but the last component.
    pub fn parent(&self) -> &[u32] {
        &self.0[..self.0.len() - 1]
    }
}

impl TryFrom<Vec<u32>> for Numbering {
    type Error = MalformedNumbering;

    fn try_from(value: Vec<u32>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(MalformedNumbering(String::new()))
        } else {
            Ok(Numbering(value))
        }
    }
}

impl FromStr for Numbering {
    type Err = MalformedNumbering;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Numbering::parse(s)
    }
}

impl fmt::Display for Numbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for Numbering {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Numbering {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Numbering::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Split `"1.2.3"` into `[1, 2, 3]`.
pub fn parse_numbering(s: &str) -> Result<Vec<u32>, MalformedNumbering> {
    Numbering::parse(s).map(|n| n.0)
}

/// Nesting depth of a numbering string.
pub fn numbering_level(s: &str) -> Result<usize, MalformedNumbering> {
    Numbering::parse(s).map(|n| n.level())
}
