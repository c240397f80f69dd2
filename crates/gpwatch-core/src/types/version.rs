//! GlobalProtect version type.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::ReleaseCycle;
use crate::error::ParseError;

/// A validated GlobalProtect version string.
///
/// Format: `MAJOR.MINOR.PATCH` with an optional `-cBUILD` suffix.
/// Ordering is numeric per component, never lexical: `6.2.8-c317` sorts
/// after `6.2.8-c263`, and a missing suffix is build 0, so `6.1.5` and
/// `6.1.5-c0` compare equal while keeping their original spelling.
///
/// # Example
///
/// ```
/// use gpwatch_core::GpVersion;
///
/// let a = GpVersion::new("6.2.8-c317").unwrap();
/// let b = GpVersion::new("6.2.8-c263").unwrap();
/// assert!(a > b);
/// assert_eq!(a.cycle().to_string(), "6.2");
/// ```
#[derive(Clone, Debug)]
pub struct GpVersion {
    raw: String,
    major: u32,
    minor: u32,
    patch: u32,
    build: u32,
}

impl GpVersion {
    /// Create a new version from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Version`] if the string does not match
    /// `MAJOR.MINOR.PATCH[-cBUILD]`.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ParseError> {
        let s = s.as_ref();
        Self::parse(s).ok_or_else(|| ParseError::Version {
            value: s.to_string(),
        })
    }

    fn parse(s: &str) -> Option<Self> {
        let (body, build) = match s.split_once('-') {
            Some((body, suffix)) => {
                let digits = suffix.strip_prefix('c')?;
                (body, parse_component(digits)?)
            }
            None => (s, 0),
        };

        let mut parts = body.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            raw: s.to_string(),
            major,
            minor,
            patch,
            build,
        })
    }

    /// Returns the original version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Returns the patch component.
    pub fn patch(&self) -> u32 {
        self.patch
    }

    /// Returns the build component (0 when no `-c` suffix is present).
    pub fn build(&self) -> u32 {
        self.build
    }

    /// Returns the release cycle this version belongs to.
    pub fn cycle(&self) -> ReleaseCycle {
        ReleaseCycle::from_parts(self.major, self.minor)
    }

    fn key(&self) -> (u32, u32, u32, u32) {
        (self.major, self.minor, self.patch, self.build)
    }
}

/// Parse one numeric version component. Rejects empty strings and any
/// non-ASCII-digit character, unlike a bare `str::parse`.
fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl PartialEq for GpVersion {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for GpVersion {}

impl PartialOrd for GpVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GpVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for GpVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for GpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for GpVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for GpVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for GpVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        GpVersion::new(&s).map_err(serde::de::Error::custom)
    }
}
