//! Registry webhook endpoints.
//!
//! Every registry gets the same pair of routes under its webhook path:
//! `notify`, which parses the payload and triggers matching jobs, and
//! `debug`, which fakes a notification for an image name when debug mode
//! is on.
//!
//! The payload is taken from, in order: the `payload` query parameter, the
//! `payload` field of a form-encoded body, or the raw body.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::AppState;
use crate::notification::{
    ParseError, ParseOptions, Registry, WebHookPayload, parse_payload,
};
use crate::trigger::fan_out;
use crate::types::{Fingerprint, JobName};

#[derive(Debug, Error)]
pub enum WebhookError {
    /// The path names no supported registry.
    #[error("unknown webhook path: {0}")]
    UnknownRegistry(String),

    /// API tokens are required and none matched.
    #[error("missing or invalid API token")]
    Forbidden,

    /// Neither the query, a form field, nor the body carried a payload.
    #[error("empty payload")]
    EmptyPayload,

    /// The payload is not JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The payload is JSON but not in the registry's shape.
    #[error("unparseable payload: {0}")]
    Parse(#[from] ParseError),

    /// The debug endpoint was called outside debug mode.
    #[error("debug endpoints are disabled")]
    DebugDisabled,

    /// A required query parameter is absent or blank.
    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::UnknownRegistry(_) => StatusCode::NOT_FOUND,
            WebhookError::Forbidden | WebhookError::DebugDisabled => StatusCode::FORBIDDEN,
            WebhookError::EmptyPayload
            | WebhookError::InvalidJson(_)
            | WebhookError::Parse(_)
            | WebhookError::MissingParameter(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotifyQuery {
    token: Option<String>,
    /// Payload passed in the query string instead of the body.
    payload: Option<String>,
    /// Registry host, needed by Nexus.
    host: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DebugQuery {
    image: Option<String>,
}

/// What a payload triggered, per notification.
#[derive(Debug, Serialize, Deserialize)]
pub struct Triggered {
    pub fingerprint: Fingerprint,
    pub repo_name: String,
    pub jobs: Vec<JobName>,
}

fn registry_for(path: &str) -> Result<Registry, WebhookError> {
    Registry::from_webhook_path(path).ok_or_else(|| WebhookError::UnknownRegistry(path.to_string()))
}

/// `POST /{path}/notify`
pub async fn notify_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<NotifyQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    notify(&app_state, &path, None, query, &headers, body)
}

/// `POST /{path}/{token}/notify`
pub async fn notify_with_token_handler(
    State(app_state): State<AppState>,
    Path((path, token)): Path<(String, String)>,
    Query(query): Query<NotifyQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    notify(&app_state, &path, Some(token), query, &headers, body)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// The `payload` field of a form-encoded body.
fn form_payload(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
}

fn notify(
    app_state: &AppState,
    path: &str,
    path_token: Option<String>,
    query: NotifyQuery,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let registry = registry_for(path)?;

    let token = path_token.or(query.token);
    if !app_state.tokens().permits(token.as_deref()) {
        warn!(registry = %registry, "Rejected notification with missing or invalid API token");
        return Err(WebhookError::Forbidden);
    }

    let from_form = || is_form(headers).then(|| form_payload(&body)).flatten();
    let raw = match query.payload.or_else(from_form) {
        Some(payload) => Bytes::from(payload),
        None => body.clone(),
    };
    if raw.is_empty() {
        return Err(WebhookError::EmptyPayload);
    }

    let json: serde_json::Value = serde_json::from_slice(&raw).inspect_err(|e| {
        error!(registry = %registry, error = %e, "Could not parse the web hook payload");
    })?;
    let options = ParseOptions { host: query.host };
    let payload = parse_payload(registry, &json, Utc::now(), &options).inspect_err(|e| {
        error!(registry = %registry, error = %e, "Could not parse the web hook payload");
    })?;

    let triggered = trigger(app_state, payload);
    debug!(registry = %registry, notifications = triggered.len(), "Notification handled");

    if registry.redirects_after_notify() {
        Ok((StatusCode::FOUND, [(header::LOCATION, "../")]).into_response())
    } else {
        Ok((StatusCode::OK, "OK").into_response())
    }
}

/// Triggers each notification independently.
fn trigger(app_state: &AppState, payload: WebHookPayload) -> Vec<Triggered> {
    payload
        .notifications
        .into_iter()
        .map(|notification| {
            info!(notification = %notification, "Received notification");
            let host = app_state.host();
            let jobs = fan_out(&notification, host, host, app_state.coordinator());
            Triggered {
                fingerprint: notification.fingerprint().clone(),
                repo_name: notification.repo_name().to_string(),
                jobs,
            }
        })
        .collect()
}

/// `GET /{path}/debug?image=<repo>`
///
/// Triggers jobs as if `image` had just been pushed. Only available in debug mode.
pub async fn debug_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<DebugQuery>,
) -> Result<Json<Vec<Triggered>>, WebhookError> {
    let registry = registry_for(&path)?;
    if !app_state.debug_enabled() {
        warn!(registry = %registry, "Debug endpoint called outside debug mode");
        return Err(WebhookError::DebugDisabled);
    }
    let image = query
        .image
        .filter(|i| !i.trim().is_empty())
        .ok_or(WebhookError::MissingParameter("image"))?;

    let payload = WebHookPayload::synthetic(registry, &image, Utc::now());
    Ok(Json(trigger(&app_state, payload)))
}
