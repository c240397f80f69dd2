//! Snapshot record types.
//!
//! The snapshot file is a JSON array of [`VersionRecord`] objects produced
//! by an external feed. All scalar fields arrive as strings (the feed
//! serializes numbers and booleans that way); parsing into typed values
//! happens on demand so one bad record never poisons the whole array.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::GpVersion;

/// Timestamp format used by the feed's `released-on` field.
const RELEASED_ON_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// One released build, as recorded in the snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VersionRecord {
    /// Artifact tag (client per OS, gateway firmware). Absent in the
    /// single-component schema variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Version string, e.g. `6.2.8-c317`.
    pub version: String,

    /// Download size in kilobytes, as a numeric string. Informational only.
    pub size_kb: String,

    /// Release timestamp in `YYYY/MM/DD HH:mm:ss` format.
    pub released_on: String,

    /// `"yes"` when the feed marks this build as the newest for its
    /// component. The reconciler derives newest-per-cycle itself rather
    /// than trusting this flag.
    pub latest: String,

    /// Optional package checksum. The feed emits `null` when unknown.
    #[serde(default)]
    pub sha256: Option<String>,

    /// Release classification, present only in the newer schema variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<ReleaseType>,
}

impl VersionRecord {
    /// Parse the version string into a comparable [`GpVersion`].
    pub fn parsed_version(&self) -> Result<GpVersion, ParseError> {
        GpVersion::new(&self.version)
    }

    /// Parse the release timestamp and project it to a date.
    pub fn released_date(&self) -> Result<NaiveDate, ParseError> {
        NaiveDateTime::parse_from_str(&self.released_on, RELEASED_ON_FORMAT)
            .map(|dt| dt.date())
            .map_err(|e| ParseError::Timestamp {
                value: self.released_on.clone(),
                reason: e.to_string(),
            })
    }

    /// Returns true if the feed marks this record as latest.
    pub fn is_latest(&self) -> bool {
        self.latest.eq_ignore_ascii_case("yes")
    }
}

/// Release classification tag from the newer schema variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseType {
    /// Empty tag; the feed has not classified the build.
    #[serde(rename = "")]
    Unspecified,
    /// Base release.
    Base,
    /// Preferred release.
    Preferred,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RECORD: &str = r#"{
        "component": "GlobalProtect Mac",
        "version": "6.2.8-c317",
        "size-kb": "91228",
        "released-on": "2025/04/03 15:22:41",
        "latest": "yes",
        "sha256": "0f51846e16bf9b90e1e06b560e2f4bd513a42f5f9b4c67468965f523e4ce60b5",
        "release-type": "Preferred"
    }"#;

    const MINIMAL_RECORD: &str = r#"{
        "version": "5.2.13-c418",
        "size-kb": "64512",
        "released-on": "2023/11/21 08:01:00",
        "latest": "no",
        "sha256": null
    }"#;

    #[test]
    fn deserializes_full_schema_variant() {
        let record: VersionRecord = serde_json::from_str(FULL_RECORD).unwrap();
        assert_eq!(record.component.as_deref(), Some("GlobalProtect Mac"));
        assert_eq!(record.release_type, Some(ReleaseType::Preferred));
        assert!(record.is_latest());
    }

    #[test]
    fn deserializes_minimal_schema_variant() {
        let record: VersionRecord = serde_json::from_str(MINIMAL_RECORD).unwrap();
        assert!(record.component.is_none());
        assert!(record.sha256.is_none());
        assert!(record.release_type.is_none());
        assert!(!record.is_latest());
    }

    #[test]
    fn parses_version_and_date() {
        let record: VersionRecord = serde_json::from_str(FULL_RECORD).unwrap();
        let version = record.parsed_version().unwrap();
        assert_eq!(version.build(), 317);

        let date = record.released_date().unwrap();
        assert_eq!(date.to_string(), "2025-04-03");
    }

    #[test]
    fn bad_version_is_a_parse_error() {
        let mut record: VersionRecord = serde_json::from_str(MINIMAL_RECORD).unwrap();
        record.version = "abc".to_string();
        assert!(matches!(
            record.parsed_version(),
            Err(ParseError::Version { .. })
        ));
    }

    #[test]
    fn bad_timestamp_is_a_parse_error() {
        let mut record: VersionRecord = serde_json::from_str(MINIMAL_RECORD).unwrap();
        record.released_on = "2023-11-21".to_string();
        assert!(matches!(
            record.released_date(),
            Err(ParseError::Timestamp { .. })
        ));
    }

    #[test]
    fn empty_release_type_maps_to_unspecified() {
        let json = r#"{
            "version": "6.0.0",
            "size-kb": "1",
            "released-on": "2023/01/01 00:00:00",
            "latest": "no",
            "sha256": null,
            "release-type": ""
        }"#;
        let record: VersionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.release_type, Some(ReleaseType::Unspecified));
    }
}
