//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::callback::{CallbackSettings, DEFAULT_CONTEXT};
use crate::host::ConfiguredJob;
use crate::token::ApiTokens;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The job file could not be read.
    #[error("failed to read job configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job file is not a valid job list.
    #[error("invalid job configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two jobs share a name.
    #[error("duplicate job name in configuration: {0}")]
    DuplicateJob(String),

    /// Tokens are required but none were given.
    #[error("API tokens are required but none are configured")]
    NoTokens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "registry-trigger",
    about = "Triggers builds from container registry webhooks"
)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "REGISTRY_TRIGGER_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Directory holding correlation entries
    #[arg(long, env = "REGISTRY_TRIGGER_STATE_DIR", default_value = "state")]
    pub state_dir: PathBuf,

    /// Public base URL of this service, used in callback target URLs
    #[arg(long, env = "REGISTRY_TRIGGER_ROOT_URL")]
    pub root_url: Option<String>,

    /// Value of the callback `context` field
    #[arg(long, env = "REGISTRY_TRIGGER_CALLBACK_CONTEXT", default_value = DEFAULT_CONTEXT)]
    pub callback_context: String,

    /// JSON file listing the configured jobs
    #[arg(long, env = "REGISTRY_TRIGGER_JOBS")]
    pub jobs: Option<PathBuf>,

    /// API tokens accepted by the notify endpoints (comma separated)
    #[arg(long = "api-token", env = "REGISTRY_TRIGGER_API_TOKENS", value_delimiter = ',')]
    pub api_tokens: Vec<String>,

    /// Accept notifications without an API token
    #[arg(long, env = "DO_NOT_REQUIRE_API_TOKEN")]
    pub no_require_api_token: bool,

    /// Enable the debug endpoints
    #[arg(long, env = "REGISTRY_TRIGGER_DEBUG")]
    pub debug: bool,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn callback_settings(&self) -> CallbackSettings {
        CallbackSettings {
            root_url: self.root_url.clone(),
            context: self.callback_context.clone(),
        }
    }

    pub fn api_tokens(&self) -> Result<ApiTokens, ConfigError> {
        let required = !self.no_require_api_token;
        let tokens = ApiTokens::new(&self.api_tokens, required);
        if required && self.api_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::NoTokens);
        }
        Ok(tokens)
    }
}

/// Loads the job configuration file.
pub fn load_jobs(path: &Path) -> Result<Vec<ConfiguredJob>, ConfigError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let jobs: Vec<ConfiguredJob> =
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = std::collections::BTreeSet::new();
    for job in &jobs {
        if !seen.insert(&job.name) {
            return Err(ConfigError::DuplicateJob(job.name.to_string()));
        }
    }
    Ok(jobs)
}
