//! Typed registry events.
//!
//! Only the trusted registry reports what kind of event a notification is;
//! the other registries only ever send pushes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of event a trusted-registry notification describes.
///
/// The wire code (`TAG_PUSH`, ...) is also what lands in the
/// `DOCKER_TRIGGER_EVENT` build variable, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "TAG_PUSH")]
    TagPushed,
    #[serde(rename = "TAG_DELETE")]
    TagDeleted,
    #[serde(rename = "MANIFEST_PUSH")]
    ManifestPushed,
    #[serde(rename = "MANIFEST_DELETE")]
    ManifestDeleted,
    #[serde(rename = "SCAN_COMPLETED")]
    SecurityScanCompleted,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::TagPushed,
        EventType::TagDeleted,
        EventType::ManifestPushed,
        EventType::ManifestDeleted,
        EventType::SecurityScanCompleted,
    ];

    /// Event types a trigger accepts when none are configured.
    pub const DEFAULT_ACCEPTED: [EventType; 1] = [EventType::TagPushed];

    pub fn code(self) -> &'static str {
        match self {
            EventType::TagPushed => "TAG_PUSH",
            EventType::TagDeleted => "TAG_DELETE",
            EventType::ManifestPushed => "MANIFEST_PUSH",
            EventType::ManifestDeleted => "MANIFEST_DELETE",
            EventType::SecurityScanCompleted => "SCAN_COMPLETED",
        }
    }

    pub fn from_code(code: &str) -> Option<EventType> {
        EventType::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Path (within the payload `contents` object) of the event's timestamp.
    pub fn timestamp_path(self) -> &'static [&'static str] {
        match self {
            EventType::TagPushed | EventType::ManifestPushed => &["pushedAt"],
            EventType::TagDeleted | EventType::ManifestDeleted => &["deletedAt"],
            EventType::SecurityScanCompleted => &["scanSummary", "check_completed_at"],
        }
    }

    /// Scan results are not tied to a single manifest and carry no digest.
    pub fn has_digest(self) -> bool {
        !matches!(self, EventType::SecurityScanCompleted)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EventType::TagPushed => "Tag pushed",
            EventType::TagDeleted => "Tag deleted",
            EventType::ManifestPushed => "Manifest pushed",
            EventType::ManifestDeleted => "Manifest deleted",
            EventType::SecurityScanCompleted => "Security scan completed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
