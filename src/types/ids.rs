//! Newtype wrappers for domain identifiers.
//!
//! These keep fingerprints, job names and build ids from being mixed up with
//! each other or with arbitrary strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable hash identifying one inbound push notification.
///
/// Used as the correlation key between a notification and every build it
/// spawned. Always lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn new(s: impl Into<String>) -> Self {
        Fingerprint(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the fingerprint is non-empty lowercase hex.
    ///
    /// Fingerprints arrive from URLs and are used to build file paths, so
    /// anything else is rejected before touching the filesystem.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    /// Returns a short (12-character) version for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Fingerprint(s.to_string())
    }
}

/// Full name of a job, e.g. `folder/build-a`.
///
/// Jobs are referenced by name rather than by handle: a job may be renamed or
/// deleted after its build was recorded, and lookups must then soft-fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(pub String);

impl JobName {
    pub fn new(s: impl Into<String>) -> Self {
        JobName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        JobName(s.to_string())
    }
}

/// Identifier of a build within its job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub String);

impl BuildId {
    pub fn new(s: impl Into<String>) -> Self {
        BuildId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BuildId {
    fn from(s: &str) -> Self {
        BuildId(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod fingerprint {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hex_is_well_formed(s in "[0-9a-f]{1,64}") {
                prop_assert!(Fingerprint::new(&s).is_well_formed());
            }

            #[test]
            fn serde_is_transparent(s in "[0-9a-f]{64}") {
                let fp = Fingerprint::new(&s);
                let json = serde_json::to_string(&fp).unwrap();
                prop_assert_eq!(json, format!("\"{}\"", s));
            }
        }

        #[test]
        fn rejects_path_like_values() {
            assert!(!Fingerprint::new("").is_well_formed());
            assert!(!Fingerprint::new("../etc").is_well_formed());
            assert!(!Fingerprint::new("ABCDEF").is_well_formed());
            assert!(!Fingerprint::new("ab/cd").is_well_formed());
        }

        #[test]
        fn short_handles_short_input() {
            assert_eq!(Fingerprint::new("abc").short(), "abc");
            assert_eq!(Fingerprint::new("0123456789abcdef").short(), "0123456789ab");
        }
    }

    #[test]
    fn job_name_display() {
        assert_eq!(JobName::new("folder/build-a").to_string(), "folder/build-a");
    }

    #[test]
    fn build_id_display() {
        assert_eq!(BuildId::from("42").to_string(), "42");
    }
}
