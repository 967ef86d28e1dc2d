//! Core domain types shared across the trigger pipeline.

pub mod ids;
pub mod result;

pub use ids::{BuildId, Fingerprint, JobName};
pub use result::BuildResult;
