//! Detail view of one notification and the builds it triggered.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::AppState;
use crate::host::{BuildInfo, BuildRegistry};
use crate::notification::Registry;
use crate::persistence::EntryFileError;
use crate::store::{CorrelationEntry, StoreError};
use crate::types::Fingerprint;

#[derive(Debug, Error)]
pub enum DetailsError {
    /// The path names no supported registry.
    #[error("unknown webhook path: {0}")]
    UnknownRegistry(String),

    /// The entry exists but could not be read.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for DetailsError {
    fn into_response(self) -> Response {
        let status = match &self {
            DetailsError::UnknownRegistry(_) => StatusCode::NOT_FOUND,
            DetailsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultPage {
    pub display_name: String,
    pub entry: Option<CorrelationEntry>,
    /// Every started build of the entry: the host's current view where it
    /// still has one, otherwise what the entry recorded.
    #[serde(default)]
    pub builds: Vec<BuildInfo>,
}

impl ResultPage {
    pub fn new(entry: Option<CorrelationEntry>, builds: &dyn BuildRegistry) -> Self {
        let display_name = format!(
            "Results for {}",
            entry
                .as_ref()
                .map(|e| e.notification().repo_name())
                .unwrap_or("<unknown>")
        );
        let builds = entry
            .iter()
            .flat_map(|e| e.runs())
            .filter_map(|run| {
                let id = run.build_id.as_ref()?;
                builds.build(&run.job, id).or_else(|| {
                    Some(BuildInfo {
                        job: run.job.clone(),
                        id: id.clone(),
                        building: !run.done,
                        result: run.result,
                    })
                })
            })
            .collect();
        ResultPage {
            display_name,
            entry,
            builds,
        }
    }
}

/// `GET /{path}/details/{fingerprint}`
///
/// Unknown fingerprints, including ones that cannot name an entry at all,
/// get a placeholder page rather than an error.
pub async fn details_handler(
    State(app_state): State<AppState>,
    Path((path, fingerprint)): Path<(String, String)>,
) -> Result<Json<ResultPage>, DetailsError> {
    if Registry::from_webhook_path(&path).is_none() {
        return Err(DetailsError::UnknownRegistry(path));
    }
    let entry = match app_state.coordinator().store().get(&Fingerprint::new(fingerprint)) {
        Ok(entry) => entry,
        Err(StoreError::File(EntryFileError::MalformedFingerprint(fp))) => {
            debug!(fingerprint = %fp, "Details requested for malformed fingerprint");
            None
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Json(ResultPage::new(entry, app_state.host())))
}
