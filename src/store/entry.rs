//! The record tying one notification to every build it triggered.

use serde::{Deserialize, Serialize};

use crate::callback::CallbackResult;
use crate::host::BuildInfo;
use crate::notification::PushNotification;
use crate::types::{BuildId, BuildResult, Fingerprint, JobName};

/// Tracking slot for one job within a [`CorrelationEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub job: JobName,
    /// Set once the build has started.
    pub build_id: Option<BuildId>,
    /// True once the build is no longer running, whatever its result.
    pub done: bool,
    /// Result reported when the build finished.
    ///
    /// Kept here so aggregation does not depend on the host still knowing
    /// the build, e.g. after a restart.
    #[serde(default)]
    pub result: Option<BuildResult>,
}

impl RunRecord {
    pub fn pending(job: JobName) -> Self {
        RunRecord {
            job,
            build_id: None,
            done: false,
            result: None,
        }
    }
}

/// Everything known about the builds triggered by one notification.
///
/// Invariants:
/// - a job appears at most once in `runs`, which keeps insertion order
/// - `callback` is set at most once and never cleared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    notification: PushNotification,
    runs: Vec<RunRecord>,
    callback: Option<CallbackResult>,
}

impl CorrelationEntry {
    pub fn new(notification: PushNotification) -> Self {
        CorrelationEntry {
            notification,
            runs: Vec::new(),
            callback: None,
        }
    }

    pub fn notification(&self) -> &PushNotification {
        &self.notification
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        self.notification.fingerprint()
    }

    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub fn run(&self, job: &JobName) -> Option<&RunRecord> {
        self.runs.iter().find(|r| &r.job == job)
    }

    pub fn callback(&self) -> Option<&CallbackResult> {
        self.callback.as_ref()
    }

    /// Adds a pending record for `job` unless one exists.
    ///
    /// Returns true if a record was added.
    pub fn ensure_run(&mut self, job: &JobName) -> bool {
        if self.run(job).is_some() {
            return false;
        }
        self.runs.push(RunRecord::pending(job.clone()));
        true
    }

    /// Attaches `build` to the record for its job, creating the record if needed.
    pub fn update_run(&mut self, build: &BuildInfo) {
        let record = match self.runs.iter().position(|r| r.job == build.job) {
            Some(idx) => &mut self.runs[idx],
            None => {
                self.runs.push(RunRecord::pending(build.job.clone()));
                let last = self.runs.len() - 1;
                &mut self.runs[last]
            }
        };
        record.build_id = Some(build.id.clone());
        record.done = !build.building;
        record.result = build.result;
    }

    /// The build id of every started run, with the job it belongs to.
    pub fn builds(&self) -> impl Iterator<Item = (&JobName, &BuildId)> {
        self.runs
            .iter()
            .filter_map(|r| Some((&r.job, r.build_id.as_ref()?)))
    }

    /// Drops the record for `job`. Returns true if one was present.
    pub fn remove_run(&mut self, job: &JobName) -> bool {
        let before = self.runs.len();
        self.runs.retain(|r| &r.job != job);
        self.runs.len() != before
    }

    /// True when every tracked run is done. Vacuously true with no runs.
    pub fn are_all_done(&self) -> bool {
        self.runs.iter().all(|r| r.done)
    }

    /// Records the callback result unless one is already set.
    ///
    /// Returns true if this call set it.
    pub fn set_callback(&mut self, result: CallbackResult) -> bool {
        if self.callback.is_some() {
            return false;
        }
        self.callback = Some(result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CallbackState;
    use crate::notification::Registry;
    use crate::test_utils::{fixed_time, sample_callback};

    fn done(job: &str, id: &str) -> BuildInfo {
        BuildInfo::finished(job, id, BuildResult::Success)
    }

    fn entry() -> CorrelationEntry {
        CorrelationEntry::new(PushNotification::new(Registry::DockerHub, "acme/app", fixed_time()))
    }

    #[test]
    fn ensure_run_is_idempotent() {
        let mut e = entry();
        let job = JobName::from("build-a");
        assert!(e.ensure_run(&job));
        assert!(!e.ensure_run(&job));
        assert_eq!(e.runs().len(), 1);
    }

    #[test]
    fn update_replaces_build_id_and_creates_missing_record() {
        let mut e = entry();
        let a = JobName::from("build-a");
        e.ensure_run(&a);
        e.update_run(&BuildInfo::running("build-a", "1"));
        e.update_run(&BuildInfo::finished("build-a", "2", BuildResult::Unstable));
        assert_eq!(e.runs().len(), 1);
        let record = e.run(&a).unwrap();
        assert_eq!(record.build_id, Some(BuildId::from("2")));
        assert!(record.done);
        assert_eq!(record.result, Some(BuildResult::Unstable));

        e.update_run(&BuildInfo::running("build-b", "7"));
        assert_eq!(e.runs().len(), 2);
        assert_eq!(e.runs()[1].job, JobName::from("build-b"));
        assert_eq!(e.runs()[1].result, None);
    }

    #[test]
    fn all_done_requires_every_run() {
        let mut e = entry();
        let a = JobName::from("build-a");
        let b = JobName::from("build-b");
        e.ensure_run(&a);
        e.ensure_run(&b);
        e.update_run(&done("build-a", "1"));
        assert!(!e.are_all_done());
        e.update_run(&done("build-b", "1"));
        assert!(e.are_all_done());
    }

    #[test]
    fn removing_the_last_pending_run_completes_the_entry() {
        let mut e = entry();
        let a = JobName::from("build-a");
        let b = JobName::from("build-b");
        e.ensure_run(&a);
        e.ensure_run(&b);
        e.update_run(&done("build-a", "1"));
        assert!(e.remove_run(&b));
        assert!(!e.remove_run(&b));
        assert!(e.are_all_done());
    }

    #[test]
    fn callback_is_set_once() {
        let mut e = entry();
        assert!(e.set_callback(sample_callback(CallbackState::Success)));
        assert!(!e.set_callback(sample_callback(CallbackState::Error)));
        assert_eq!(e.callback().unwrap().state, CallbackState::Success);
    }
}
