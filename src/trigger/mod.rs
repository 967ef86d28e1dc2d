//! Trigger configuration and job matching.
//!
//! A job opts in to registry triggers with a [`TriggerConfig`]. When a
//! notification arrives, [`match_jobs`] picks the jobs whose configured image
//! names include the notification's repository and whose event filter
//! accepts its event type. [`fan_out`] then schedules each match and records
//! the successful ones for completion tracking.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::callback::CallbackDispatcher;
use crate::coordinator::Coordinator;
use crate::host::{ConfiguredJob, JobCatalog, JobScheduler};
use crate::notification::{EventType, PushNotification, WebHookCause};
use crate::types::JobName;

/// Where a trigger gets the repository names it reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerOption {
    /// Every image the job is known to use.
    AllImagesUsedInJob,
    /// An explicit list of repository names.
    SpecifiedImages { repo_names: BTreeSet<String> },
}

impl TriggerOption {
    pub fn specified<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TriggerOption::SpecifiedImages {
            repo_names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Repository names this option yields for `job`.
    pub fn repo_names<'a>(&'a self, job: &'a ConfiguredJob) -> &'a BTreeSet<String> {
        match self {
            TriggerOption::AllImagesUsedInJob => &job.images_used,
            TriggerOption::SpecifiedImages { repo_names } => repo_names,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default)]
    pub options: Vec<TriggerOption>,

    /// Empty means [`EventType::DEFAULT_ACCEPTED`].
    #[serde(default)]
    pub event_types: Vec<EventType>,
}

impl TriggerConfig {
    pub fn new(options: Vec<TriggerOption>) -> Self {
        TriggerConfig {
            options,
            event_types: Vec::new(),
        }
    }

    pub fn with_event_types(mut self, event_types: Vec<EventType>) -> Self {
        self.event_types = event_types;
        self
    }

    /// Notifications without an event type are always accepted.
    pub fn accepts_event(&self, event_type: Option<EventType>) -> bool {
        let Some(event_type) = event_type else {
            return true;
        };
        if self.event_types.is_empty() {
            EventType::DEFAULT_ACCEPTED.contains(&event_type)
        } else {
            self.event_types.contains(&event_type)
        }
    }

    pub fn matches_repo(&self, job: &ConfiguredJob, repo_name: &str) -> bool {
        self.options
            .iter()
            .any(|option| option.repo_names(job).contains(repo_name))
    }
}

/// Returns every job whose trigger matches `notification`, in catalog order.
pub fn match_jobs<'a>(
    notification: &PushNotification,
    jobs: &'a [ConfiguredJob],
) -> Vec<&'a ConfiguredJob> {
    jobs.iter()
        .filter(|job| {
            let Some(trigger) = &job.trigger else {
                return false;
            };
            if !trigger.accepts_event(notification.event_type()) {
                trace!(
                    job = %job.name,
                    event = ?notification.event_type(),
                    "Event type not accepted"
                );
                return false;
            }
            trigger.matches_repo(job, notification.repo_name())
        })
        .collect()
}

/// Schedules every job matching `notification` and starts tracking the ones
/// the scheduler accepted.
///
/// The notification's entry is created before the first job is scheduled. If
/// no job ends up scheduled the entry stays empty.
///
/// Returns the names of the jobs that were scheduled.
pub fn fan_out<D: CallbackDispatcher>(
    notification: &PushNotification,
    catalog: &dyn JobCatalog,
    scheduler: &dyn JobScheduler,
    coordinator: &Coordinator<D>,
) -> Vec<JobName> {
    let jobs = catalog.jobs();
    let matched = match_jobs(notification, &jobs);
    if matched.is_empty() {
        debug!(notification = %notification, "No jobs matched");
        return Vec::new();
    }

    // Builds may report back as soon as they are queued.
    coordinator.on_received(notification);

    let parameters = notification.run_parameters();
    let cause = WebHookCause::new(notification.clone());
    let mut scheduled = Vec::new();
    for job in matched {
        info!(job = %job.name, "{}", notification.cause_message());
        if !scheduler.schedule(&job.name, &cause, &parameters) {
            info!(job = %job.name, "Job could not be scheduled");
            continue;
        }
        coordinator.on_triggered(notification, &job.name);
        scheduled.push(job.name.clone());
    }
    scheduled
}
