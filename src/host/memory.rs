//! In-process host used by the service binary and by tests.
//!
//! Jobs come from the job configuration file. Scheduled builds sit in a queue
//! until an external executor drains it, and build state is whatever the
//! executor last reported through the lifecycle endpoints.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{BuildInfo, BuildRegistry, ConfiguredJob, JobCatalog, JobScheduler};
use crate::notification::WebHookCause;
use crate::types::{BuildId, Fingerprint, JobName};

/// A build waiting to be picked up by an executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedBuild {
    pub job: JobName,
    pub fingerprint: Fingerprint,
    pub cause: String,
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct HostState {
    jobs: Vec<ConfiguredJob>,
    queue: Vec<QueuedBuild>,
    builds: HashMap<(JobName, BuildId), BuildInfo>,
}

#[derive(Debug, Default)]
pub struct InMemoryHost {
    state: Mutex<HostState>,
}

impl InMemoryHost {
    pub fn new(jobs: Vec<ConfiguredJob>) -> Self {
        InMemoryHost {
            state: Mutex::new(HostState {
                jobs,
                ..HostState::default()
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the latest known state of a build.
    pub fn record_build(&self, build: BuildInfo) {
        let key = (build.job.clone(), build.id.clone());
        self.state().builds.insert(key, build);
    }

    /// Forgets a build, as when it is deleted from the job's history.
    pub fn forget_build(&self, job: &JobName, id: &BuildId) -> Option<BuildInfo> {
        self.state().builds.remove(&(job.clone(), id.clone()))
    }

    /// Removes a job and all of its builds.
    pub fn delete_job(&self, job: &JobName) {
        let mut state = self.state();
        state.jobs.retain(|j| &j.name != job);
        state.builds.retain(|(name, _), _| name != job);
    }

    /// Returns the queued builds and empties the queue.
    pub fn drain_queue(&self) -> Vec<QueuedBuild> {
        let drained = std::mem::take(&mut self.state().queue);
        debug!(count = drained.len(), "Drained build queue");
        drained
    }

    pub fn queue_len(&self) -> usize {
        self.state().queue.len()
    }
}

impl JobCatalog for InMemoryHost {
    fn jobs(&self) -> Vec<ConfiguredJob> {
        self.state().jobs.clone()
    }
}

impl JobScheduler for InMemoryHost {
    fn schedule(
        &self,
        job: &JobName,
        cause: &WebHookCause,
        parameters: &BTreeMap<String, String>,
    ) -> bool {
        let mut state = self.state();
        let buildable = state
            .jobs
            .iter()
            .any(|j| &j.name == job && j.buildable);
        if !buildable {
            debug!(job = %job, "Job is not buildable");
            return false;
        }
        info!(job = %job, cause = %cause.short_description(), "Scheduling build");
        state.queue.push(QueuedBuild {
            job: job.clone(),
            fingerprint: cause.notification().fingerprint().clone(),
            cause: cause.short_description(),
            parameters: parameters.clone(),
        });
        true
    }
}

impl BuildRegistry for InMemoryHost {
    fn build(&self, job: &JobName, id: &BuildId) -> Option<BuildInfo> {
        self.state().builds.get(&(job.clone(), id.clone())).cloned()
    }
}
