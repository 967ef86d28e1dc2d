//! Build lifecycle → correlation store → callback.
//!
//! The host reports each build's start, completion and deletion. The
//! coordinator records them against the notification that caused the build
//! and, once every tracked build is done, fires the callback.
//!
//! # Per-entry states
//!
//! ```text
//! OPEN ──(all runs done)──> ALL_DONE ──(callback claimed)──> CALLBACK_SENT
//! ```
//!
//! The completion check looks only at current record state, so events may
//! arrive in any order. The callback result is claimed in the store, and
//! thereby persisted, before any network call; whoever claims it dispatches,
//! everyone else sees `AlreadySent`. A failed dispatch is logged and never
//! retried.
//!
//! None of the entry points return errors: a bad entry must not disturb the
//! processing of unrelated builds.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::callback::{CallbackDispatcher, CallbackResult, CallbackSettings};
use crate::host::{BuildInfo, BuildRegistry};
use crate::notification::PushNotification;
use crate::store::{CorrelationEntry, CorrelationStore};
use crate::types::JobName;

/// Outcome of a lifecycle event that may complete an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Completion {
    /// No entry exists for the notification.
    NotTracked,
    /// Some tracked builds are still running.
    Pending,
    /// The store could not be updated; completion was not evaluated.
    EvaluationFailed,
    /// Everything is done but no build result could be resolved.
    NoResult,
    /// A callback was recorded by an earlier event.
    AlreadySent,
    /// This event recorded the callback and dispatched it.
    ///
    /// `status` is `None` when the notification has no callback URL.
    CallbackSent { status: Option<u16> },
    /// This event recorded the callback but delivery failed.
    CallbackFailed,
}

impl Completion {
    /// True once the entry's callback is recorded and nothing further will
    /// be sent for it.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Completion::AlreadySent | Completion::CallbackSent { .. } | Completion::CallbackFailed
        )
    }
}

pub struct Coordinator<D> {
    store: Arc<CorrelationStore>,
    builds: Arc<dyn BuildRegistry>,
    dispatcher: D,
    settings: CallbackSettings,
}

impl<D: CallbackDispatcher> Coordinator<D> {
    pub fn new(
        store: Arc<CorrelationStore>,
        builds: Arc<dyn BuildRegistry>,
        dispatcher: D,
        settings: CallbackSettings,
    ) -> Self {
        Coordinator {
            store,
            builds,
            dispatcher,
            settings,
        }
    }

    pub fn store(&self) -> &CorrelationStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Creates the entry for `notification` ahead of scheduling, so build
    /// events for it can be correlated as soon as a build exists.
    ///
    /// Returns false if the entry could not be recorded.
    pub fn on_received(&self, notification: &PushNotification) -> bool {
        match self.store.get_or_create(notification) {
            Ok(_) => true,
            Err(e) => {
                error!(fingerprint = %notification.fingerprint(), error = %e,
                    "Failed to record notification");
                false
            }
        }
    }

    /// Starts tracking `job` for `notification`. Returns false if it could not be recorded.
    pub fn on_triggered(&self, notification: &PushNotification, job: &JobName) -> bool {
        trace!(job = %job, notification = %notification, "Job triggered");
        match self.store.triggered(notification, job) {
            Ok(_) => true,
            Err(e) => {
                error!(job = %job, fingerprint = %notification.fingerprint(), error = %e,
                    "Failed to record triggered job");
                false
            }
        }
    }

    /// Records that a build started. Returns false if it could not be recorded.
    pub fn on_started(&self, notification: &PushNotification, build: &BuildInfo) -> bool {
        trace!(job = %build.job, build = %build.id, "Build started");
        match self.store.started(notification, build) {
            Ok(_) => true,
            Err(e) => {
                error!(job = %build.job, build = %build.id, error = %e,
                    "Failed to record build start");
                false
            }
        }
    }

    /// Records that a build finished and fires the callback if it was the last one.
    pub async fn on_finalized(&self, notification: &PushNotification, build: &BuildInfo) -> Completion {
        trace!(job = %build.job, build = %build.id, "Build done");
        match self.store.finalized(notification, build) {
            Ok(entry) => self.complete(entry).await,
            Err(e) => {
                error!(job = %build.job, build = %build.id, fingerprint = %notification.fingerprint(),
                    error = %e, "Failed to do final evaluation of builds");
                Completion::EvaluationFailed
            }
        }
    }

    /// Stops tracking `job`; a removal can complete the entry like a finish does.
    pub async fn on_deleted(&self, notification: &PushNotification, job: &JobName) -> Completion {
        trace!(job = %job, "Build deleted");
        match self.store.removed(notification, job) {
            Ok(Some(entry)) => self.complete(entry).await,
            Ok(None) => Completion::NotTracked,
            Err(e) => {
                error!(job = %job, fingerprint = %notification.fingerprint(), error = %e,
                    "Failed to remove build record");
                Completion::EvaluationFailed
            }
        }
    }

    async fn complete(&self, entry: CorrelationEntry) -> Completion {
        if !entry.are_all_done() {
            return Completion::Pending;
        }
        if entry.callback().is_some() {
            return Completion::AlreadySent;
        }

        let fingerprint = entry.fingerprint();
        debug!(fingerprint = %fingerprint, "All builds are done, preparing callback");
        let Some(result) = CallbackResult::aggregate(&entry, self.builds.as_ref(), &self.settings)
        else {
            debug!(fingerprint = %fingerprint, "No build results to report");
            return Completion::NoResult;
        };

        match self.store.claim_callback(fingerprint, result.clone()) {
            Ok(true) => {}
            Ok(false) => return Completion::AlreadySent,
            Err(e) => {
                error!(fingerprint = %fingerprint, error = %e, "Failed to record callback result");
                return Completion::EvaluationFailed;
            }
        }

        let url = entry.notification().callback_url();
        match self.dispatcher.dispatch(url, &result).await {
            Ok(status) => {
                info!(fingerprint = %fingerprint, state = %result.state, status = ?status,
                    "Callback sent");
                Completion::CallbackSent { status }
            }
            Err(e) => {
                error!(fingerprint = %fingerprint, url = ?url, error = %e,
                    "Failed to send callback");
                Completion::CallbackFailed
            }
        }
    }
}
