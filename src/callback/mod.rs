//! Outbound status callbacks.
//!
//! Once every build for a notification is done, the registry that sent it
//! can be told the aggregated outcome. The payload shape is fixed:
//!
//! ```json
//! { "state": "success", "description": "Build result SUCCESS",
//!   "context": "Jenkins", "target_url": "https://ci/dockerhub-webhook/details/<fp>" }
//! ```

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::host::BuildRegistry;
use crate::notification::Registry;
use crate::store::CorrelationEntry;
use crate::types::{BuildResult, Fingerprint};

pub mod http;

pub use http::HttpCallbackDispatcher;

/// Default value of the callback `context` field.
pub const DEFAULT_CONTEXT: &str = "Jenkins";

/// Callback state understood by registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackState {
    Success,
    Failure,
    Error,
}

impl CallbackState {
    /// UNSTABLE is reported as `failure`; FAILURE and anything else as `error`.
    pub fn from_result(result: BuildResult) -> Self {
        match result {
            BuildResult::Success => CallbackState::Success,
            BuildResult::Unstable => CallbackState::Failure,
            BuildResult::Failure | BuildResult::NotBuilt | BuildResult::Aborted => {
                CallbackState::Error
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallbackState::Success => "success",
            CallbackState::Failure => "failure",
            CallbackState::Error => "error",
        }
    }
}

impl fmt::Display for CallbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated outcome of every build triggered by one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackResult {
    pub state: CallbackState,
    pub description: String,
    pub context: String,
    pub target_url: String,
}

/// Settings that shape every callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackSettings {
    /// Public base URL of this service, used to build `target_url`.
    pub root_url: Option<String>,
    pub context: String,
}

impl Default for CallbackSettings {
    fn default() -> Self {
        CallbackSettings {
            root_url: None,
            context: DEFAULT_CONTEXT.to_string(),
        }
    }
}

impl CallbackSettings {
    /// Detail view URL for a fingerprint.
    ///
    /// Relative when no root URL is configured.
    pub fn target_url(&self, registry: Registry, fingerprint: &Fingerprint) -> String {
        let mut url = String::new();
        match self.root_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(root) => {
                url.push_str(root);
                if !root.ends_with('/') {
                    url.push('/');
                }
            }
            None => warn!("Root URL is not configured, callback target URL will be relative"),
        }
        url.push_str(registry.webhook_path());
        url.push_str("/details/");
        url.push_str(fingerprint.as_str());
        url
    }
}

impl CallbackResult {
    /// Aggregates the results of the entry's builds.
    ///
    /// A run contributes the result recorded when it finished; runs finished
    /// without one fall back to the host's view of the build, and are skipped
    /// if the host no longer knows it. The worst result wins. Returns `None`
    /// if no run has a result.
    pub fn aggregate(
        entry: &CorrelationEntry,
        builds: &dyn BuildRegistry,
        settings: &CallbackSettings,
    ) -> Option<CallbackResult> {
        let results = entry.runs().iter().filter_map(|run| {
            run.result.or_else(|| {
                let id = run.build_id.as_ref()?;
                builds.build(&run.job, id)?.result
            })
        });
        let worst = BuildResult::worst(results)?;
        Some(CallbackResult {
            state: CallbackState::from_result(worst),
            description: format!("Build result {worst}"),
            context: settings.context.clone(),
            target_url: settings.target_url(entry.notification().registry(), entry.fingerprint()),
        })
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request could not be sent or the response not read.
    #[error("callback request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The receiver answered with a non-2xx status.
    #[error("callback receiver answered {status}")]
    Status { status: u16 },
}

/// Delivers a callback.
pub trait CallbackDispatcher: Send + Sync {
    /// Posts `result` to `url` once.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(status))` - Delivered and the receiver answered 2xx
    /// * `Ok(None)` - No URL; nothing was sent
    /// * `Err(e)` - Transport failure or non-2xx answer
    fn dispatch(
        &self,
        url: Option<&str>,
        result: &CallbackResult,
    ) -> impl Future<Output = Result<Option<u16>, DispatchError>> + Send;
}
