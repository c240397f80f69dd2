//! Release cycle identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A tracked release cycle: a `MAJOR.MINOR` version line such as `6.2`.
///
/// Cycles order numerically (`10.1` after `6.3`), which keeps maps and
/// reports deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseCycle {
    major: u32,
    minor: u32,
}

impl ReleaseCycle {
    /// Create a new release cycle from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Cycle`] if the string is not `MAJOR.MINOR`
    /// with decimal components.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ParseError> {
        let s = s.as_ref();
        let parsed = s.split_once('.').and_then(|(major, minor)| {
            Some(Self {
                major: parse_component(major)?,
                minor: parse_component(minor)?,
            })
        });

        parsed.ok_or_else(|| ParseError::Cycle {
            value: s.to_string(),
        })
    }

    /// Create a release cycle from its numeric components.
    pub fn from_parts(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns the major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for ReleaseCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ReleaseCycle {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ReleaseCycle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ReleaseCycle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ReleaseCycle::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_cycle() {
        let cycle = ReleaseCycle::new("6.2").unwrap();
        assert_eq!(cycle.major(), 6);
        assert_eq!(cycle.minor(), 2);
        assert_eq!(cycle.to_string(), "6.2");
    }

    #[test]
    fn orders_numerically() {
        let old = ReleaseCycle::new("6.3").unwrap();
        let new = ReleaseCycle::new("10.1").unwrap();
        assert!(new > old);
    }

    #[test]
    fn rejects_invalid() {
        for bad in ["6", "6.2.8", "6.x", "", ".2", "6."] {
            assert!(ReleaseCycle::new(bad).is_err(), "should reject {bad:?}");
        }
    }
}
