//! Boundary to the build host.
//!
//! The host owns jobs, their builds and the build queue. This crate only
//! talks to it through the traits below, always by job name: a job may be
//! renamed or deleted after a build was recorded, so every lookup is allowed
//! to come back empty.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::notification::WebHookCause;
use crate::trigger::TriggerConfig;
use crate::types::{BuildId, BuildResult, JobName};

pub mod memory;

pub use memory::{InMemoryHost, QueuedBuild};

/// A job as configured on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredJob {
    pub name: JobName,

    /// Disabled jobs stay configured but are never scheduled.
    #[serde(default = "default_buildable")]
    pub buildable: bool,

    /// Images the job's build definition pulls or builds from.
    #[serde(default)]
    pub images_used: BTreeSet<String>,

    /// Absent when the job has no registry trigger.
    #[serde(default)]
    pub trigger: Option<TriggerConfig>,
}

fn default_buildable() -> bool {
    true
}

impl ConfiguredJob {
    pub fn new(name: impl Into<String>) -> Self {
        ConfiguredJob {
            name: JobName::new(name),
            buildable: true,
            images_used: BTreeSet::new(),
            trigger: None,
        }
    }

    pub fn with_images_used<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images_used = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerConfig) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.buildable = false;
        self
    }
}

/// Snapshot of one build as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub job: JobName,
    pub id: BuildId,
    pub building: bool,
    /// `None` while the build runs.
    pub result: Option<BuildResult>,
}

impl BuildInfo {
    pub fn running(job: impl Into<String>, id: impl Into<String>) -> Self {
        BuildInfo {
            job: JobName::new(job),
            id: BuildId::new(id),
            building: true,
            result: None,
        }
    }

    pub fn finished(job: impl Into<String>, id: impl Into<String>, result: BuildResult) -> Self {
        BuildInfo {
            job: JobName::new(job),
            id: BuildId::new(id),
            building: false,
            result: Some(result),
        }
    }
}

/// Lists the jobs that may carry a registry trigger.
pub trait JobCatalog: Send + Sync {
    fn jobs(&self) -> Vec<ConfiguredJob>;
}

/// Enqueues builds.
pub trait JobScheduler: Send + Sync {
    /// Returns true if a build was enqueued.
    fn schedule(
        &self,
        job: &JobName,
        cause: &WebHookCause,
        parameters: &BTreeMap<String, String>,
    ) -> bool;
}

/// Name-based lookup of builds.
pub trait BuildRegistry: Send + Sync {
    /// Returns `None` if the job or the build no longer exists.
    fn build(&self, job: &JobName, id: &BuildId) -> Option<BuildInfo>;
}
