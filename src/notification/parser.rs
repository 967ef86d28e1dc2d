//! Registry payload parsers.
//!
//! Each supported registry sends its own JSON shape. These functions turn a
//! raw payload into a [`WebHookPayload`] holding zero or more normalized
//! [`PushNotification`]s.
//!
//! # Parsing Strategy
//!
//! 1. The registry is known from the endpoint the payload arrived on
//! 2. The payload is deserialized into a minimal raw structure
//! 3. Events the registry reports but we don't act on (pulls, layer
//!    uploads, unknown actions) are skipped, not errors
//! 4. Missing required fields return `Err` and abort the whole payload

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::{EventType, PushNotification, Registry, WebHookPayload, extra};

/// Error type for payload parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Field has an unusable value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Request-level inputs some registries need besides the body.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Registry host, passed as `?host=` by Nexus since its payload lacks one.
    pub host: Option<String>,
}

/// Parses a payload received from `registry`.
///
/// # Returns
///
/// * `Ok(payload)` - Parsed; `payload.notifications` may be empty if nothing
///   in it is actionable
/// * `Err(e)` - Malformed payload
pub fn parse_payload(
    registry: Registry,
    body: &Value,
    received_at: DateTime<Utc>,
    options: &ParseOptions,
) -> Result<WebHookPayload, ParseError> {
    let notifications = match registry {
        Registry::DockerHub => parse_docker_hub(body, received_at)?,
        Registry::DockerRegistry => parse_docker_registry(body, received_at)?,
        Registry::TrustedRegistry => parse_trusted_registry(body, received_at)?,
        Registry::Acr => parse_acr(body, received_at)?,
        Registry::Nexus => parse_nexus(body, received_at, options.host.as_deref())?,
    };
    Ok(WebHookPayload {
        registry,
        received_at,
        notifications,
    })
}

/// Parses an ISO-8601 timestamp, tolerating offsets without a colon (`+0000`).
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Returns `value` if it is present and not blank.
///
/// Every notification needs a repository name, so the fields it is built
/// from go through here.
fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ParseError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        other => Err(ParseError::InvalidField {
            field,
            value: other.unwrap_or("missing").to_string(),
        }),
    }
}

fn with_optional_pushed_at(n: PushNotification, timestamp: Option<&str>) -> PushNotification {
    match timestamp.and_then(parse_timestamp) {
        Some(at) => n.with_pushed_at(at),
        None => {
            debug!(repo = %n.repo_name(), timestamp = ?timestamp, "No usable push timestamp");
            n
        }
    }
}

// ============================================================================
// Docker Hub
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawHubPayload {
    callback_url: Option<String>,
    push_data: Option<RawHubPushData>,
    repository: RawHubRepository,
}

#[derive(Debug, Deserialize)]
struct RawHubPushData {
    pushed_at: Option<i64>,
    pusher: Option<String>,
    tag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHubRepository {
    repo_name: String,
}

fn parse_docker_hub(
    body: &Value,
    received_at: DateTime<Utc>,
) -> Result<Vec<PushNotification>, ParseError> {
    let raw = RawHubPayload::deserialize(body)?;
    let repo_name = required("repository.repo_name", Some(raw.repository.repo_name.as_str()))?;
    let mut n = PushNotification::new(Registry::DockerHub, repo_name, received_at);

    if let Some(callback_url) = raw.callback_url {
        match url::Url::parse(&callback_url) {
            Ok(url) => {
                if let Some(host) = url.host_str() {
                    n = n.with_registry_host(host);
                }
            }
            Err(e) => warn!(callback_url = %callback_url, error = %e, "DockerHub is sending malformed data"),
        }
        n = n.with_callback_url(callback_url);
    }

    if let Some(push_data) = raw.push_data {
        if let Some(at) = push_data
            .pushed_at
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            n = n.with_pushed_at(at);
        }
        if let Some(tag) = push_data.tag {
            n = n.with_extra(extra::TAG, tag);
        }
        if let Some(pusher) = push_data.pusher {
            n = n.with_extra(extra::PUSHER, pusher);
        }
    }

    Ok(vec![n])
}

// ============================================================================
// Docker Registry v2
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRegistryPayload {
    events: Vec<RawRegistryEvent>,
}

#[derive(Debug, Deserialize)]
struct RawRegistryEvent {
    action: Option<String>,
    timestamp: Option<String>,
    target: Option<RawRegistryTarget>,
    request: Option<RawRegistryRequest>,
}

#[derive(Debug, Deserialize)]
struct RawRegistryTarget {
    url: Option<String>,
    repository: Option<String>,
    tag: Option<String>,
    digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRegistryRequest {
    host: Option<String>,
}

fn parse_docker_registry(
    body: &Value,
    received_at: DateTime<Utc>,
) -> Result<Vec<PushNotification>, ParseError> {
    let raw = RawRegistryPayload::deserialize(body)?;
    let mut notifications = Vec::new();

    for event in raw.events {
        if event.action.as_deref() != Some("push") {
            trace!(action = ?event.action, "Skipping registry event");
            continue;
        }
        let target = event.target.ok_or(ParseError::InvalidField {
            field: "events[].target",
            value: "missing".to_string(),
        })?;
        let url = required("events[].target.url", target.url.as_deref())?;
        // "http://host:port/v2/..." splits into ["http:", "", "host:port", ...]
        let authority = required("events[].target.url", url.split('/').nth(2))?;
        let repository = required("events[].target.repository", target.repository.as_deref())?;
        let repo_name = format!("{authority}/{repository}");

        let mut n = PushNotification::new(Registry::DockerRegistry, repo_name, received_at);
        n = with_optional_pushed_at(n, event.timestamp.as_deref());
        if let Some(host) = event.request.and_then(|r| r.host) {
            n = n.with_registry_host(host);
        }
        if let Some(tag) = target.tag {
            n = n.with_extra(extra::TAG, tag);
        }
        if let Some(digest) = target.digest {
            n = n.with_extra(extra::DIGEST, digest);
        }
        notifications.push(n);
    }

    Ok(notifications)
}

// ============================================================================
// Docker Trusted Registry
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawTrustedPayload {
    #[serde(rename = "type")]
    event_type: String,
    contents: Value,
    location: Option<String>,
}

/// Splits `host/ns/repo:tag` into (`host/ns/repo`, `host`).
///
/// A `:` that is followed by a `/` belongs to a host port, not a tag.
fn split_image_name(image_name: &str) -> (&str, &str) {
    let repo = match image_name.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => repo,
        _ => image_name,
    };
    let host = image_name.split('/').next().unwrap_or(image_name);
    (repo, host)
}

fn lookup_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
}

fn parse_trusted_registry(
    body: &Value,
    received_at: DateTime<Utc>,
) -> Result<Vec<PushNotification>, ParseError> {
    let raw = RawTrustedPayload::deserialize(body)?;
    let Some(event_type) = EventType::from_code(&raw.event_type) else {
        trace!(
            event_type = %raw.event_type,
            location = ?raw.location,
            "Skipping unsupported trusted registry notification"
        );
        return Ok(Vec::new());
    };

    let contents = &raw.contents;
    let image_name = required("contents.imageName", lookup_str(contents, &["imageName"]))?;
    let (repo_name, host) = split_image_name(image_name);
    let repo_name = required("contents.imageName", Some(repo_name))?;

    let mut n = PushNotification::new(Registry::TrustedRegistry, repo_name, received_at)
        .with_registry_host(host)
        .with_event_type(event_type);
    n = with_optional_pushed_at(n, lookup_str(contents, event_type.timestamp_path()));
    if let Some(tag) = lookup_str(contents, &["tag"]) {
        n = n.with_extra(extra::TAG, tag);
    }
    if event_type.has_digest() {
        if let Some(digest) = lookup_str(contents, &["digest"]) {
            n = n.with_extra(extra::DIGEST, digest);
        }
    }

    Ok(vec![n])
}

// ============================================================================
// Azure Container Registry
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawAcrPayload {
    action: Option<String>,
    timestamp: Option<String>,
    target: Option<RawAcrTarget>,
    request: Option<RawAcrRequest>,
}

#[derive(Debug, Deserialize)]
struct RawAcrTarget {
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAcrRequest {
    host: String,
}

fn parse_acr(body: &Value, received_at: DateTime<Utc>) -> Result<Vec<PushNotification>, ParseError> {
    let raw = RawAcrPayload::deserialize(body)?;
    if raw.action.as_deref() != Some("push") {
        trace!(action = ?raw.action, "Unsupported ACR event received");
        return Ok(Vec::new());
    }
    let target = raw.target.ok_or(ParseError::InvalidField {
        field: "target",
        value: "missing".to_string(),
    })?;
    let request = raw.request.ok_or(ParseError::InvalidField {
        field: "request",
        value: "missing".to_string(),
    })?;

    let host = required("request.host", Some(request.host.as_str()))?;
    let repository = required("target.repository", Some(target.repository.as_str()))?;
    let repo_name = format!("{host}/{repository}");
    debug!(repo = %repo_name, "Creating ACR push notification");

    let mut n = PushNotification::new(Registry::Acr, repo_name, received_at)
        .with_registry_host(host);
    n = with_optional_pushed_at(n, raw.timestamp.as_deref());
    if let Some(tag) = target.tag {
        n = n.with_extra(extra::TAG, tag);
    }
    if let Some(digest) = target.digest {
        n = n.with_extra(extra::DIGEST, digest);
    }
    Ok(vec![n])
}

// ============================================================================
// Nexus
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawNexusPayload {
    action: String,
    timestamp: Option<String>,
    asset: Option<RawNexusAsset>,
}

#[derive(Debug, Deserialize)]
struct RawNexusAsset {
    format: String,
    name: String,
}

fn parse_nexus(
    body: &Value,
    received_at: DateTime<Utc>,
    host: Option<&str>,
) -> Result<Vec<PushNotification>, ParseError> {
    let Some(host) = host.filter(|h| !h.trim().is_empty()) else {
        warn!(
            "Dropping nexus docker notify as host param is missing, \
             please add ?host=<yourdockerregistryhost> to the webhook config"
        );
        return Ok(Vec::new());
    };

    let raw = RawNexusPayload::deserialize(body)?;
    if raw.action != "CREATED" && raw.action != "UPDATED" {
        trace!(action = %raw.action, "Skipping nexus action");
        return Ok(Vec::new());
    }
    let Some(asset) = raw.asset else {
        return Err(ParseError::InvalidField {
            field: "asset",
            value: "missing".to_string(),
        });
    };
    if asset.format != "docker" {
        trace!(format = %asset.format, "Skipping non docker notify");
        return Ok(Vec::new());
    }

    // "v2/<repo path>/manifests/<tag>"
    let segments: Vec<&str> = asset.name.split('/').collect();
    let n_segments = segments.len();
    if n_segments < 3
        || segments[n_segments - 2] != "manifests"
        || segments[n_segments - 1].starts_with("sha")
    {
        trace!(asset = %asset.name, "Skipping layer push notification");
        return Ok(Vec::new());
    }

    let mut repo_name = host.to_string();
    for segment in &segments[1..n_segments - 2] {
        repo_name.push('/');
        repo_name.push_str(segment);
    }
    let tag = segments[n_segments - 1];
    trace!(repo = %repo_name, "Notify for nexus repository");

    let n = PushNotification::new(Registry::Nexus, repo_name, received_at)
        .with_registry_host(host)
        .with_extra(extra::TAG, tag);
    Ok(vec![with_optional_pushed_at(n, raw.timestamp.as_deref())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixed_time;
    use serde_json::json;

    fn parse(registry: Registry, body: Value) -> Vec<PushNotification> {
        parse_payload(registry, &body, fixed_time(), &ParseOptions::default())
            .unwrap()
            .notifications
    }

    // ─── Docker Hub ───

    #[test]
    fn docker_hub_full_payload() {
        let body = json!({
            "callback_url": "https://registry.hub.docker.com/u/csanchez/jenkins-swarm-slave/hook/2i5e3gj1bi354asb3f05gchi4ccjg0gas/",
            "push_data": {
                "images": [],
                "pushed_at": 1417566822,
                "pusher": "csanchez",
                "tag": "latest"
            },
            "repository": {
                "repo_name": "csanchez/jenkins-swarm-slave",
                "status": "Active"
            }
        });
        let ns = parse(Registry::DockerHub, body);
        assert_eq!(ns.len(), 1);
        let n = &ns[0];
        assert_eq!(n.repo_name(), "csanchez/jenkins-swarm-slave");
        assert_eq!(n.registry_host(), Some("registry.hub.docker.com"));
        assert_eq!(n.extra(extra::TAG), Some("latest"));
        assert_eq!(n.extra(extra::PUSHER), Some("csanchez"));
        assert_eq!(n.pushed_at(), DateTime::from_timestamp(1417566822, 0));
        assert!(n.callback_url().unwrap().ends_with("/hook/2i5e3gj1bi354asb3f05gchi4ccjg0gas/"));
    }

    #[test]
    fn docker_hub_requires_repo_name() {
        let body = json!({ "repository": {} });
        let result = parse_payload(Registry::DockerHub, &body, fixed_time(), &ParseOptions::default());
        assert!(matches!(result, Err(ParseError::Json(_))));
    }

    #[test]
    fn blank_repository_names_are_rejected() {
        let cases = [
            (Registry::DockerHub, json!({ "repository": { "repo_name": "" } })),
            (
                Registry::DockerRegistry,
                json!({ "events": [{
                    "action": "push",
                    "target": { "url": "http://h:5000/v2/x/manifests/latest" }
                }] }),
            ),
            (
                Registry::DockerRegistry,
                json!({ "events": [{
                    "action": "push",
                    "target": { "url": "http://h:5000/v2/x/manifests/latest", "repository": "  " }
                }] }),
            ),
            (
                Registry::Acr,
                json!({ "action": "push", "target": { "repository": "" },
                        "request": { "host": "x.azurecr.io" } }),
            ),
            (
                Registry::TrustedRegistry,
                json!({ "type": "TAG_PUSH", "contents": { "imageName": "" } }),
            ),
        ];
        for (registry, body) in cases {
            let result = parse_payload(registry, &body, fixed_time(), &ParseOptions::default());
            assert!(
                matches!(result, Err(ParseError::InvalidField { .. })),
                "{registry:?} accepted {body}"
            );
        }
    }

    #[test]
    fn docker_hub_ignores_zero_pushed_at() {
        let body = json!({
            "push_data": { "pushed_at": 0 },
            "repository": { "repo_name": "acme/app" }
        });
        let ns = parse(Registry::DockerHub, body);
        assert_eq!(ns[0].pushed_at(), None);
        assert_eq!(ns[0].callback_url(), None);
    }

    // ─── Registry v2 ───

    #[test]
    fn registry_only_push_events_become_notifications() {
        let body = json!({
            "events": [
                {
                    "action": "push",
                    "timestamp": "2016-03-09T14:44:26.402973972-08:00",
                    "target": {
                        "url": "http://localhost:5000/v2/hello-world/manifests/sha256:fea8895f450959fa676bcc1df0611ea93823a735a01205fd8622846041d0c7cf",
                        "repository": "hello-world",
                        "tag": "latest"
                    },
                    "request": { "host": "localhost:5000" }
                },
                {
                    "action": "pull",
                    "target": { "url": "http://localhost:5000/v2/other", "repository": "other" }
                },
                {
                    "action": "push",
                    "timestamp": "2016-03-09T14:44:27Z",
                    "target": {
                        "url": "http://localhost:5000/v2/acme/app/manifests/v1",
                        "repository": "acme/app"
                    },
                    "request": { "host": "localhost:5000" }
                }
            ]
        });
        let ns = parse(Registry::DockerRegistry, body);
        assert_eq!(ns.len(), 2);
        assert_eq!(ns[0].repo_name(), "localhost:5000/hello-world");
        assert_eq!(ns[0].registry_host(), Some("localhost:5000"));
        assert_eq!(ns[0].extra(extra::TAG), Some("latest"));
        assert!(ns[0].pushed_at().is_some());
        assert_eq!(ns[1].repo_name(), "localhost:5000/acme/app");
        // Same batch, same receipt time, different repos.
        assert_ne!(ns[0].fingerprint(), ns[1].fingerprint());
    }

    #[test]
    fn registry_requires_events_array() {
        let body = json!({ "event": [] });
        let result = parse_payload(Registry::DockerRegistry, &body, fixed_time(), &ParseOptions::default());
        assert!(result.is_err());
    }

    // ─── Trusted registry ───

    fn trusted_payload(event_type: &str) -> Value {
        json!({
            "type": event_type,
            "contents": {
                "namespace": "junit",
                "repository": "reponame",
                "tag": "latest",
                "digest": "sha256:b9e4a2d5b4d6c1e0d8b3e1c2",
                "imageName": "dtr.example.com/junit/reponame:latest",
                "pushedAt": "2017-01-17T19:42:13.193Z",
                "deletedAt": "2017-01-18T08:00:00Z",
                "scanSummary": { "check_completed_at": "2017-01-19T10:00:00Z" }
            },
            "location": "/repositories/junit/reponame/tags/latest"
        })
    }

    #[test]
    fn trusted_tag_push() {
        let ns = parse(Registry::TrustedRegistry, trusted_payload("TAG_PUSH"));
        assert_eq!(ns.len(), 1);
        let n = &ns[0];
        assert_eq!(n.repo_name(), "dtr.example.com/junit/reponame");
        assert_eq!(n.registry_host(), Some("dtr.example.com"));
        assert_eq!(n.event_type(), Some(EventType::TagPushed));
        assert_eq!(n.extra(extra::DIGEST), Some("sha256:b9e4a2d5b4d6c1e0d8b3e1c2"));
        assert_eq!(n.pushed_at(), parse_timestamp("2017-01-17T19:42:13.193Z"));
    }

    #[test]
    fn trusted_timestamp_depends_on_event_type() {
        let deleted = &parse(Registry::TrustedRegistry, trusted_payload("TAG_DELETE"))[0];
        assert_eq!(deleted.pushed_at(), parse_timestamp("2017-01-18T08:00:00Z"));

        let scanned = &parse(Registry::TrustedRegistry, trusted_payload("SCAN_COMPLETED"))[0];
        assert_eq!(scanned.pushed_at(), parse_timestamp("2017-01-19T10:00:00Z"));
        assert_eq!(scanned.extra(extra::DIGEST), None);
    }

    #[test]
    fn trusted_unknown_type_is_skipped() {
        assert!(parse(Registry::TrustedRegistry, trusted_payload("REPO_EVENT")).is_empty());
    }

    #[test]
    fn split_image_name_keeps_host_port() {
        assert_eq!(
            split_image_name("dtr:8443/junit/reponame:1.0"),
            ("dtr:8443/junit/reponame", "dtr:8443")
        );
        assert_eq!(split_image_name("dtr:8443/junit/reponame"), ("dtr:8443/junit/reponame", "dtr:8443"));
    }

    // ─── ACR ───

    #[test]
    fn acr_push() {
        let body = json!({
            "id": "cb8c3971-9adc-488b-bdd8-43cbb4974ff5",
            "timestamp": "2017-11-17T16:52:01.343145347Z",
            "action": "push",
            "target": {
                "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
                "size": 524,
                "digest": "sha256:80f0d5c8786bb9e621a45ece0db56d11cdc624ad20da9fe62e9d25490f331d7d",
                "repository": "hello-world",
                "tag": "v1"
            },
            "request": {
                "id": "3cbb6949-7549-4fa1-86cd-a6d5451dffc7",
                "host": "myregistry.azurecr.io",
                "method": "PUT",
                "useragent": "docker/17.09.0-ce"
            }
        });
        let ns = parse(Registry::Acr, body);
        assert_eq!(ns.len(), 1);
        assert_eq!(ns[0].repo_name(), "myregistry.azurecr.io/hello-world");
        assert_eq!(ns[0].extra(extra::TAG), Some("v1"));
        assert_eq!(ns[0].registry_host(), Some("myregistry.azurecr.io"));
    }

    #[test]
    fn acr_non_push_is_skipped() {
        let body = json!({ "action": "delete" });
        assert!(parse(Registry::Acr, body).is_empty());
    }

    // ─── Nexus ───

    fn nexus_payload(action: &str, format: &str, name: &str) -> Value {
        json!({
            "timestamp": "2016-11-14T19:32:13.515+0000",
            "nodeId": "7FFA7361-6ED33978-36997BD4-47095CC4-331356BE",
            "initiator": "admin/127.0.0.1",
            "repositoryName": "docker-hosted",
            "action": action,
            "asset": { "id": "31c950c8eeeab78336308177ae9c441c", "format": format, "name": name }
        })
    }

    fn parse_nexus_with_host(body: Value, host: Option<&str>) -> Vec<PushNotification> {
        let options = ParseOptions {
            host: host.map(str::to_string),
        };
        parse_payload(Registry::Nexus, &body, fixed_time(), &options)
            .unwrap()
            .notifications
    }

    #[test]
    fn nexus_manifest_push() {
        let body = nexus_payload("CREATED", "docker", "v2/acme/app/manifests/1.2");
        let ns = parse_nexus_with_host(body, Some("nexus.example.com:8082"));
        assert_eq!(ns.len(), 1);
        assert_eq!(ns[0].repo_name(), "nexus.example.com:8082/acme/app");
        assert_eq!(ns[0].extra(extra::TAG), Some("1.2"));
        assert_eq!(ns[0].pushed_at(), parse_timestamp("2016-11-14T19:32:13.515+00:00"));
    }

    #[test]
    fn nexus_requires_host() {
        let body = nexus_payload("CREATED", "docker", "v2/acme/app/manifests/1.2");
        assert!(parse_nexus_with_host(body, None).is_empty());
    }

    #[test]
    fn nexus_skips_layers_digests_and_other_formats() {
        let host = Some("nexus");
        let layer = nexus_payload("CREATED", "docker", "v2/acme/app/blobs/sha256:abc");
        let digest = nexus_payload("UPDATED", "docker", "v2/acme/app/manifests/sha256:abc");
        let maven = nexus_payload("CREATED", "maven2", "v2/acme/app/manifests/1.0");
        let deleted = nexus_payload("DELETED", "docker", "v2/acme/app/manifests/1.0");
        let short = nexus_payload("CREATED", "docker", "manifests");
        assert!(parse_nexus_with_host(layer, host).is_empty());
        assert!(parse_nexus_with_host(digest, host).is_empty());
        assert!(parse_nexus_with_host(maven, host).is_empty());
        assert!(parse_nexus_with_host(deleted, host).is_empty());
        assert!(parse_nexus_with_host(short, host).is_empty());
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2016-03-09T14:44:26.402973972-08:00").is_some());
        assert!(parse_timestamp("2016-11-14T19:32:13.515+0000").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
