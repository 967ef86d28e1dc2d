//! Shared test utilities and arbitrary generators for property-based testing.

use std::future::Future;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use crate::callback::{
    CallbackDispatcher, CallbackResult, CallbackState, DEFAULT_CONTEXT, DispatchError,
};

/// 2024-01-15T12:00:00.250Z
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(250)
}

pub fn arb_repo_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}(/[a-z][a-z0-9._-]{0,20}){0,2}".prop_map(String::from)
}

pub fn sample_callback(state: CallbackState) -> CallbackResult {
    CallbackResult {
        state,
        description: "Build result SUCCESS".to_string(),
        context: DEFAULT_CONTEXT.to_string(),
        target_url: "https://ci.example.com/dockerhub-webhook/details/abcd".to_string(),
    }
}

/// Dispatcher that records every call instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<(Option<String>, CallbackResult)>>,
    fail: bool,
}

impl RecordingDispatcher {
    /// Records calls, then reports each as a 503.
    pub fn failing() -> Self {
        RecordingDispatcher {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<(Option<String>, CallbackResult)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CallbackDispatcher for RecordingDispatcher {
    fn dispatch(
        &self,
        url: Option<&str>,
        result: &CallbackResult,
    ) -> impl Future<Output = Result<Option<u16>, DispatchError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((url.map(str::to_string), result.clone()));
        let outcome = if self.fail {
            Err(DispatchError::Status { status: 503 })
        } else {
            Ok(url.map(|_| 200))
        };
        std::future::ready(outcome)
    }
}
