//! Build lifecycle endpoints.
//!
//! Builds run outside this service. The executor that runs them drains the
//! build queue and reports each build's progress here, naming the
//! fingerprint it was scheduled for; the notification itself is recovered
//! from the stored entry.
//!
//! - `POST /api/v1/queue/drain` - Takes every queued build
//! - `POST /api/v1/builds/started` - A build began running
//! - `POST /api/v1/builds/finalized` - A build finished
//! - `POST /api/v1/builds/deleted` - A build was removed from history
//!
//! These endpoints can fire callbacks and drop queued builds, so they take
//! the same API tokens as the notify endpoints, passed as
//! `Authorization: Bearer <token>`.
//!
//! Once an entry's callback is recorded its builds are dropped from the
//! host; the results live on in the entry.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::coordinator::Completion;
use crate::host::{BuildInfo, QueuedBuild};
use crate::notification::PushNotification;
use crate::store::StoreError;
use crate::types::{BuildId, BuildResult, Fingerprint, JobName};

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Missing or invalid bearer token.
    #[error("missing or invalid API token")]
    Forbidden,

    /// No entry exists for the event's fingerprint.
    #[error("no notification tracked for fingerprint {0}")]
    NotTracked(Fingerprint),

    /// The entry could not be read.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for LifecycleError {
    fn into_response(self) -> Response {
        let status = match &self {
            LifecycleError::Forbidden => StatusCode::FORBIDDEN,
            LifecycleError::NotTracked(_) => StatusCode::NOT_FOUND,
            LifecycleError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// A build progress report from the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildEvent {
    pub job: JobName,
    pub build_id: BuildId,
    pub fingerprint: Fingerprint,
    #[serde(default)]
    pub building: bool,
    #[serde(default)]
    pub result: Option<BuildResult>,
}

impl BuildEvent {
    fn build_info(&self) -> BuildInfo {
        BuildInfo {
            job: self.job.clone(),
            id: self.build_id.clone(),
            building: self.building,
            result: self.result,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartedResponse {
    pub recorded: bool,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn authorize(app_state: &AppState, headers: &HeaderMap) -> Result<(), LifecycleError> {
    if app_state.tokens().permits(bearer_token(headers)) {
        Ok(())
    } else {
        warn!("Rejected build event with missing or invalid API token");
        Err(LifecycleError::Forbidden)
    }
}

/// Drops the host's copies of an entry's builds once its callback is recorded.
fn release_builds(app_state: &AppState, fingerprint: &Fingerprint, completion: &Completion) {
    if !completion.is_closed() {
        return;
    }
    match app_state.coordinator().store().get(fingerprint) {
        Ok(Some(entry)) => {
            for (job, id) in entry.builds() {
                app_state.host().forget_build(job, id);
            }
        }
        Ok(None) => {}
        Err(e) => warn!(fingerprint = %fingerprint, error = %e, "Could not release builds"),
    }
}

fn tracked_notification(
    app_state: &AppState,
    fingerprint: &Fingerprint,
) -> Result<PushNotification, LifecycleError> {
    match app_state.coordinator().store().get(fingerprint)? {
        Some(entry) => Ok(entry.notification().clone()),
        None => {
            warn!(fingerprint = %fingerprint, "Build event for untracked fingerprint");
            Err(LifecycleError::NotTracked(fingerprint.clone()))
        }
    }
}

pub async fn drain_queue_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<QueuedBuild>>, LifecycleError> {
    authorize(&app_state, &headers)?;
    Ok(Json(app_state.host().drain_queue()))
}

pub async fn started_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<BuildEvent>,
) -> Result<Json<StartedResponse>, LifecycleError> {
    authorize(&app_state, &headers)?;
    let notification = tracked_notification(&app_state, &event.fingerprint)?;
    let build = BuildInfo {
        building: true,
        ..event.build_info()
    };
    app_state.host().record_build(build.clone());
    let recorded = app_state.coordinator().on_started(&notification, &build);
    Ok(Json(StartedResponse { recorded }))
}

pub async fn finalized_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<BuildEvent>,
) -> Result<Json<Completion>, LifecycleError> {
    authorize(&app_state, &headers)?;
    let notification = tracked_notification(&app_state, &event.fingerprint)?;
    let build = BuildInfo {
        building: false,
        ..event.build_info()
    };
    app_state.host().record_build(build.clone());
    let completion = app_state.coordinator().on_finalized(&notification, &build).await;
    debug!(job = %build.job, build = %build.id, completion = ?completion, "Build finalized");
    release_builds(&app_state, &event.fingerprint, &completion);
    Ok(Json(completion))
}

pub async fn deleted_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<BuildEvent>,
) -> Result<Json<Completion>, LifecycleError> {
    authorize(&app_state, &headers)?;
    let notification = tracked_notification(&app_state, &event.fingerprint)?;
    app_state.host().forget_build(&event.job, &event.build_id);
    let completion = app_state.coordinator().on_deleted(&notification, &event.job).await;
    release_builds(&app_state, &event.fingerprint, &completion);
    Ok(Json(completion))
}
