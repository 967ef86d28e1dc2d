//! Registry Trigger - builds on container image pushes.
//!
//! Receives webhook notifications from container registries (Docker Hub,
//! Docker Registry v2, Docker Trusted Registry, Azure Container Registry,
//! Nexus), triggers the jobs configured for the pushed image, tracks every
//! build a notification spawned, and reports the aggregated result back to
//! the registry once all of them are done.

pub mod callback;
pub mod config;
pub mod coordinator;
pub mod host;
pub mod notification;
pub mod persistence;
pub mod server;
pub mod store;
pub mod token;
pub mod trigger;
pub mod types;

#[cfg(test)]
pub mod test_utils;
