//! Build outcomes as reported by the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final result of a finished build.
///
/// Variants are declared from best to worst; `Ord` follows that order so
/// the worst of several results is simply the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl BuildResult {
    /// Returns true if `self` is strictly worse than `other`.
    pub fn is_worse_than(self, other: BuildResult) -> bool {
        self > other
    }

    /// Returns the worst result in the iterator, or `None` if it is empty.
    pub fn worst(results: impl IntoIterator<Item = BuildResult>) -> Option<BuildResult> {
        results.into_iter().max()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Failure => "FAILURE",
            BuildResult::NotBuilt => "NOT_BUILT",
            BuildResult::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
