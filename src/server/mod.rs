//! HTTP server.
//!
//! # Endpoints
//!
//! - `POST /{path}/notify` - Registry webhook; `{path}` selects the registry
//!   (`dockerhub-webhook`, `registry-webhook`, ...)
//! - `POST /{path}/{token}/notify` - Same, with the API token in the path
//! - `GET /{path}/debug?image=<repo>` - Fake a push (debug mode only)
//! - `GET /{path}/details/{fingerprint}` - Detail view of one notification
//! - `POST /api/v1/queue/drain` and `POST /api/v1/builds/{started,finalized,deleted}` -
//!   Build executor bridge
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use axum::http::StatusCode;

use crate::callback::HttpCallbackDispatcher;
use crate::coordinator::Coordinator;
use crate::host::InMemoryHost;
use crate::token::ApiTokens;

pub mod details;
pub mod lifecycle;
pub mod webhook;

pub use details::{ResultPage, details_handler};
pub use lifecycle::{deleted_handler, drain_queue_handler, finalized_handler, started_handler};
pub use webhook::{debug_handler, notify_handler, notify_with_token_handler};

/// Shared application state, handed to every handler through `State`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    host: Arc<InMemoryHost>,
    coordinator: Arc<Coordinator<HttpCallbackDispatcher>>,
    tokens: ApiTokens,
    /// Enables `GET /{path}/debug`.
    debug: bool,
}

impl AppState {
    pub fn new(
        host: Arc<InMemoryHost>,
        coordinator: Arc<Coordinator<HttpCallbackDispatcher>>,
        tokens: ApiTokens,
        debug: bool,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                host,
                coordinator,
                tokens,
                debug,
            }),
        }
    }

    pub fn host(&self) -> &InMemoryHost {
        &self.inner.host
    }

    pub fn coordinator(&self) -> &Coordinator<HttpCallbackDispatcher> {
        &self.inner.coordinator
    }

    pub fn tokens(&self) -> &ApiTokens {
        &self.inner.tokens
    }

    pub fn debug_enabled(&self) -> bool {
        self.inner.debug
    }
}

/// Liveness check.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/queue/drain", post(drain_queue_handler))
        .route("/api/v1/builds/started", post(started_handler))
        .route("/api/v1/builds/finalized", post(finalized_handler))
        .route("/api/v1/builds/deleted", post(deleted_handler))
        .route("/{path}/notify", post(notify_handler))
        .route("/{path}/{token}/notify", post(notify_with_token_handler))
        .route("/{path}/debug", get(debug_handler))
        .route("/{path}/details/{fingerprint}", get(details_handler))
        .with_state(app_state)
}
