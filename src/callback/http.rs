//! Callback delivery over HTTP.

use std::future::Future;

use tracing::{debug, warn};

use super::{CallbackDispatcher, CallbackResult, DispatchError};

/// Posts callbacks as JSON with a single attempt and no retries.
#[derive(Debug, Clone, Default)]
pub struct HttpCallbackDispatcher {
    client: reqwest::Client,
}

impl HttpCallbackDispatcher {
    pub fn new(client: reqwest::Client) -> Self {
        HttpCallbackDispatcher { client }
    }
}

impl CallbackDispatcher for HttpCallbackDispatcher {
    fn dispatch(
        &self,
        url: Option<&str>,
        result: &CallbackResult,
    ) -> impl Future<Output = Result<Option<u16>, DispatchError>> + Send {
        let url = url.filter(|u| !u.trim().is_empty()).map(str::to_string);
        let request = url.as_ref().map(|u| self.client.post(u).json(result));
        async move {
            let (Some(url), Some(request)) = (url, request) else {
                warn!("No callback URL specified, skipping callback");
                return Ok(None);
            };
            debug!(url = %url, "Sending callback");
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(DispatchError::Status {
                    status: status.as_u16(),
                });
            }
            Ok(Some(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CallbackState;
    use crate::test_utils::sample_callback;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use std::sync::{Arc, Mutex};

    async fn spawn_receiver(status: StatusCode) -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let app = Router::new().route(
            "/hook",
            post(move |axum::Json(body): axum::Json<serde_json::Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().unwrap().push(body);
                    status
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}/hook"), received)
    }

    #[tokio::test]
    async fn posts_payload_once() {
        let (url, received) = spawn_receiver(StatusCode::OK).await;
        let dispatcher = HttpCallbackDispatcher::default();

        let status = dispatcher
            .dispatch(Some(&url), &sample_callback(CallbackState::Failure))
            .await
            .unwrap();
        assert_eq!(status, Some(200));

        let bodies = received.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["state"], "failure");
        assert_eq!(bodies[0]["context"], "Jenkins");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, received) = spawn_receiver(StatusCode::INTERNAL_SERVER_ERROR).await;
        let dispatcher = HttpCallbackDispatcher::default();

        let result = dispatcher
            .dispatch(Some(&url), &sample_callback(CallbackState::Success))
            .await;
        assert!(matches!(result, Err(DispatchError::Status { status: 500 })));
        // No retry.
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_url_is_skipped() {
        let dispatcher = HttpCallbackDispatcher::default();
        let result = sample_callback(CallbackState::Success);
        assert_eq!(dispatcher.dispatch(None, &result).await.unwrap(), None);
        assert_eq!(dispatcher.dispatch(Some("  "), &result).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_receiver_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dispatcher = HttpCallbackDispatcher::default();
        let result = dispatcher
            .dispatch(Some(&format!("http://{addr}/hook")), &sample_callback(CallbackState::Success))
            .await;
        assert!(matches!(result, Err(DispatchError::Http(_))));
    }
}
