//! Normalized representation of inbound registry events.
//!
//! Every registry adapter produces a [`WebHookPayload`]: the time the payload
//! was received plus one or more [`PushNotification`]s. A notification is the
//! unit of correlation; its [`Fingerprint`] ties it to every build it starts.
//!
//! Registry-specific details (tag, pusher, digest) are carried in a side map
//! rather than in per-registry types, so the rest of the pipeline only ever
//! sees one notification shape.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::Fingerprint;

pub mod event_type;
pub mod parser;

pub use event_type::EventType;
pub use parser::{ParseError, ParseOptions, parse_payload};

/// Prefix shared by every build variable derived from a notification.
pub const ENV_PREFIX: &str = "DOCKER_TRIGGER_";

/// Build variable names. These are read by job configurations and must not change.
pub mod env {
    pub const REPO_NAME: &str = "DOCKER_TRIGGER_REPO_NAME";
    pub const DOCKER_HUB_HOST: &str = "DOCKER_TRIGGER_DOCKER_HUB_HOST";
    pub const DOCKER_REGISTRY_HOST: &str = "DOCKER_TRIGGER_DOCKER_REGISTRY_HOST";
    pub const TAG: &str = "DOCKER_TRIGGER_TAG";
    pub const PUSHER: &str = "DOCKER_TRIGGER_PUSHER";
    pub const DOCKER_IMAGE_TAG: &str = "DOCKER_TRIGGER_DOCKER_IMAGE_TAG";
    pub const DOCKER_IMAGE_DIGEST: &str = "DOCKER_TRIGGER_DOCKER_IMAGE_DIGEST";
    pub const EVENT: &str = "DOCKER_TRIGGER_EVENT";
}

/// Keys of the registry-specific side map.
pub mod extra {
    pub const TAG: &str = "tag";
    pub const PUSHER: &str = "pusher";
    pub const DIGEST: &str = "digest";
}

/// The registry flavour a notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Registry {
    DockerHub,
    DockerRegistry,
    TrustedRegistry,
    Acr,
    Nexus,
}

impl Registry {
    pub const ALL: [Registry; 5] = [
        Registry::DockerHub,
        Registry::DockerRegistry,
        Registry::TrustedRegistry,
        Registry::Acr,
        Registry::Nexus,
    ];

    /// URL segment the registry's webhook endpoints are mounted under.
    pub fn webhook_path(self) -> &'static str {
        match self {
            Registry::DockerHub => "dockerhub-webhook",
            Registry::DockerRegistry => "registry-webhook",
            Registry::TrustedRegistry => "dockertrustedregistry-webhook",
            Registry::Acr => "acr-webhook",
            Registry::Nexus => "nexusregistry-webhook",
        }
    }

    pub fn from_webhook_path(path: &str) -> Option<Registry> {
        Registry::ALL.into_iter().find(|r| r.webhook_path() == path)
    }

    /// Namespace tag mixed into the fingerprint.
    pub fn fingerprint_namespace(self) -> &'static str {
        match self {
            Registry::DockerHub => "dockerHubNotification",
            Registry::Acr => "acrNotification",
            Registry::DockerRegistry | Registry::TrustedRegistry | Registry::Nexus => {
                "dockerRegistryNotification"
            }
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Registry::DockerHub => "DockerHub",
            Registry::DockerRegistry => "DockerRegistry",
            Registry::TrustedRegistry => "DTR",
            Registry::Acr => "ACR",
            Registry::Nexus => "Nexus DockerRegistry",
        }
    }

    /// Build variable the registry host is exported under.
    pub fn host_variable(self) -> &'static str {
        match self {
            Registry::DockerHub => env::DOCKER_HUB_HOST,
            _ => env::DOCKER_REGISTRY_HOST,
        }
    }

    /// Whether a successful notify is answered with a redirect instead of 200.
    pub fn redirects_after_notify(self) -> bool {
        matches!(self, Registry::DockerHub)
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Computes the fingerprint of a notification.
///
/// Two notifications for the same repository received at the same
/// millisecond share a fingerprint; any other difference in receipt time
/// yields a different one.
pub fn compute_fingerprint(
    registry: Registry,
    repo_name: &str,
    received_at: DateTime<Utc>,
) -> Fingerprint {
    let material = format!(
        "{}:{}{:b}",
        registry.fingerprint_namespace(),
        repo_name,
        received_at.timestamp_millis()
    );
    Fingerprint(hex::encode(Sha256::digest(material.as_bytes())))
}

/// One logical push notification.
///
/// Immutable once built; the `with_*` methods consume and return `self` so
/// adapters can assemble one without exposing setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    registry: Registry,
    repo_name: String,
    received_at: DateTime<Utc>,
    pushed_at: Option<DateTime<Utc>>,
    registry_host: Option<String>,
    event_type: Option<EventType>,
    callback_url: Option<String>,
    #[serde(default)]
    extra: BTreeMap<String, String>,
    fingerprint: Fingerprint,
}

impl PushNotification {
    pub fn new(registry: Registry, repo_name: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        let repo_name = repo_name.into();
        let fingerprint = compute_fingerprint(registry, &repo_name, received_at);
        PushNotification {
            registry,
            repo_name,
            received_at,
            pushed_at: None,
            registry_host: None,
            event_type: None,
            callback_url: None,
            extra: BTreeMap::new(),
            fingerprint,
        }
    }

    pub fn with_pushed_at(mut self, pushed_at: DateTime<Utc>) -> Self {
        self.pushed_at = Some(pushed_at);
        self
    }

    pub fn with_registry_host(mut self, host: impl Into<String>) -> Self {
        self.registry_host = non_blank(host.into());
        self
    }

    pub fn with_event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = non_blank(url.into());
        self
    }

    /// Adds a registry-specific field. Blank values are dropped.
    pub fn with_extra(mut self, key: &str, value: impl Into<String>) -> Self {
        if let Some(value) = non_blank(value.into()) {
            self.extra.insert(key.to_string(), value);
        }
        self
    }

    pub fn registry(&self) -> Registry {
        self.registry
    }

    /// Repository name, e.g. `acme/app`.
    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn pushed_at(&self) -> Option<DateTime<Utc>> {
        self.pushed_at
    }

    pub fn registry_host(&self) -> Option<&str> {
        self.registry_host.as_deref()
    }

    pub fn event_type(&self) -> Option<EventType> {
        self.event_type
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    fn host_for_display(&self) -> &str {
        self.registry_host.as_deref().unwrap_or("null")
    }

    /// Message logged when a job is scheduled for this notification.
    pub fn cause_message(&self) -> String {
        match self.event_type {
            Some(event) => format!(
                "WebHook {} notification for {} has been received from {} {}",
                event,
                self.repo_name,
                self.registry,
                self.host_for_display()
            ),
            None => format!(
                "Docker image {} has been rebuilt by {}@{}",
                self.repo_name,
                self.registry,
                self.host_for_display()
            ),
        }
    }

    pub fn short_description(&self) -> String {
        match self.event_type {
            Some(event) => format!(
                "WebHook {} notification for {} to {} {}",
                event,
                self.repo_name,
                self.registry,
                self.host_for_display()
            ),
            None => format!(
                "push of {} to {}@{}",
                self.repo_name,
                self.registry,
                self.host_for_display()
            ),
        }
    }

    /// Build variables derived from this notification.
    pub fn run_parameters(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert(env::REPO_NAME.to_string(), self.repo_name.clone());
        if let Some(host) = &self.registry_host {
            params.insert(self.registry.host_variable().to_string(), host.clone());
        }

        let mut put = |key: &str, value: Option<&str>| {
            if let Some(value) = value {
                params.insert(key.to_string(), value.to_string());
            }
        };
        match self.registry {
            Registry::DockerHub => {
                put(env::TAG, self.extra(extra::TAG));
                put(env::PUSHER, self.extra(extra::PUSHER));
            }
            Registry::Acr | Registry::DockerRegistry => {
                put(env::TAG, self.extra(extra::TAG));
            }
            Registry::TrustedRegistry => {
                put(env::DOCKER_IMAGE_TAG, self.extra(extra::TAG));
                put(env::DOCKER_IMAGE_DIGEST, self.extra(extra::DIGEST));
                put(env::EVENT, self.event_type.map(EventType::code));
            }
            Registry::Nexus => {}
        }
        params
    }
}

impl fmt::Display for PushNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.short_description(), self.fingerprint.short())
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// A parsed inbound payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WebHookPayload {
    pub registry: Registry,
    pub received_at: DateTime<Utc>,
    pub notifications: Vec<PushNotification>,
}

impl WebHookPayload {
    /// Minimal payload for a single image, with no registry data attached.
    pub fn synthetic(registry: Registry, repo_name: &str, received_at: DateTime<Utc>) -> Self {
        WebHookPayload {
            registry,
            received_at,
            notifications: vec![PushNotification::new(registry, repo_name, received_at)],
        }
    }
}

/// Why a build was scheduled. Attached to every build the trigger pipeline queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebHookCause {
    notification: PushNotification,
}

impl WebHookCause {
    pub fn new(notification: PushNotification) -> Self {
        WebHookCause { notification }
    }

    pub fn notification(&self) -> &PushNotification {
        &self.notification
    }

    pub fn short_description(&self) -> String {
        format!("Triggered by {}", self.notification.short_description())
    }
}
