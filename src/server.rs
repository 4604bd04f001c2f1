//! Webhook receiver — acks every callback immediately, processes in the
//! background.
//!
//! GroupMe retries callbacks that don't come back `200`, so the handler
//! never signals failure: undecodable bodies, bot echoes, and send errors
//! all degrade to a log line.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use crate::extract::OrderBlockExtractor;
use crate::groupme::Notifier;
use crate::report::build_report;

/// Posted when extraction finds nothing and the notify-on-empty policy is on.
const EMPTY_NOTICE: &str = "No order blocks found in that message.";

/// GroupMe callback payload — only the fields we read; the platform sends
/// more, all ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sender_type: Option<String>,
}

/// Shared handler state. Everything here is read-only per request.
#[derive(Clone)]
pub struct AppState {
    extractor: Arc<OrderBlockExtractor>,
    notifier: Arc<dyn Notifier>,
    notify_on_empty: bool,
}

impl AppState {
    pub fn new(notifier: Arc<dyn Notifier>, notify_on_empty: bool) -> Self {
        Self {
            extractor: Arc::new(OrderBlockExtractor::new()),
            notifier,
            notify_on_empty,
        }
    }
}

/// Build the app router: health check + webhook callback.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/groupme/webhook", post(webhook))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// The GroupMe bot "Callback URL" endpoint.
///
/// Answers `200` right away and hands the payload to a background task; the
/// body is parsed by hand so a malformed payload is still acked.
async fn webhook(State(state): State<AppState>, body: Bytes) -> StatusCode {
    match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(payload) => {
            tokio::spawn(async move {
                process_callback(state, payload).await;
            });
        }
        Err(error) => {
            tracing::warn!(%error, "undecodable callback body; acking anyway");
        }
    }
    StatusCode::OK
}

/// Run extraction over one callback and post the report.
async fn process_callback(state: AppState, payload: WebhookPayload) {
    // Ignore our own bot posts to avoid feedback loops.
    if payload.sender_type.as_deref() == Some("bot") {
        tracing::debug!("ignoring bot message");
        return;
    }

    let text = payload.text.unwrap_or_default();
    let poster = payload.name.unwrap_or_else(|| "Unknown".to_string());

    let entries = state.extractor.extract(&text);
    tracing::debug!(poster = %poster, entries = entries.len(), "extraction finished");

    if entries.is_empty() {
        if state.notify_on_empty {
            if let Err(error) = state.notifier.notify(EMPTY_NOTICE).await {
                tracing::warn!(%error, "empty notice not sent");
            }
        }
        return;
    }

    let report = build_report(&poster, &entries);
    if let Err(error) = state.notifier.notify(&report).await {
        tracing::warn!(%error, "report not sent");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::error::NotifyError;

    /// Records every post instead of talking to GroupMe.
    #[derive(Default)]
    struct MockNotifier {
        posts: Mutex<Vec<String>>,
    }

    impl MockNotifier {
        fn posts(&self) -> Vec<String> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Notifier for MockNotifier {
        async fn notify(&self, text: &str) -> Result<(), NotifyError> {
            self.posts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn state_with_mock(notify_on_empty: bool) -> (AppState, Arc<MockNotifier>) {
        let mock = Arc::new(MockNotifier::default());
        let state = AppState::new(Arc::clone(&mock) as Arc<dyn Notifier>, notify_on_empty);
        (state, mock)
    }

    fn payload(text: &str, name: &str, sender_type: &str) -> WebhookPayload {
        WebhookPayload {
            text: Some(text.to_string()),
            name: Some(name.to_string()),
            sender_type: Some(sender_type.to_string()),
        }
    }

    // ── process_callback ────────────────────────────────────────────

    #[tokio::test]
    async fn order_block_posts_csv_report() {
        let (state, mock) = state_with_mock(false);
        let raw = "Customer Information:\nName: Jane Doe\nOrder Due Date: 5/1/2024\n";

        process_callback(state, payload(raw, "Alice", "user")).await;

        assert_eq!(
            mock.posts(),
            vec!["Sales Rep,Customer Name,Order Due Date\nAlice,Jane Doe,5/1/2024\n"]
        );
    }

    #[tokio::test]
    async fn bot_sender_is_dropped() {
        let (state, mock) = state_with_mock(true);
        let raw = "Customer Information:\nName: Jane Doe\nOrder Due Date: 5/1/2024\n";

        process_callback(state, payload(raw, "Order Digest", "bot")).await;

        assert!(mock.posts().is_empty());
    }

    #[tokio::test]
    async fn no_entries_is_silent_by_default() {
        let (state, mock) = state_with_mock(false);

        process_callback(state, payload("lunch anyone?", "Alice", "user")).await;

        assert!(mock.posts().is_empty());
    }

    #[tokio::test]
    async fn no_entries_posts_notice_when_enabled() {
        let (state, mock) = state_with_mock(true);

        process_callback(state, payload("lunch anyone?", "Alice", "user")).await;

        assert_eq!(mock.posts(), vec![EMPTY_NOTICE]);
    }

    #[tokio::test]
    async fn missing_fields_default_sanely() {
        let (state, mock) = state_with_mock(false);
        let raw = "Customer Information:\nName: Jane Doe\nOrder Due Date: 5/1/2024\n";
        let payload = WebhookPayload {
            text: Some(raw.to_string()),
            name: None,
            sender_type: None,
        };

        process_callback(state, payload).await;

        assert_eq!(
            mock.posts(),
            vec!["Sales Rep,Customer Name,Order Due Date\nUnknown,Jane Doe,5/1/2024\n"]
        );
    }

    // ── Router ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn health_check_returns_ok_body() {
        let (state, _mock) = state_with_mock(false);
        let response = router(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn webhook_acks_valid_payload() {
        let (state, _mock) = state_with_mock(false);
        let request = Request::builder()
            .method("POST")
            .uri("/groupme/webhook")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text":"hi","name":"Alice","sender_type":"user"}"#))
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_acks_malformed_body() {
        let (state, mock) = state_with_mock(true);
        let request = Request::builder()
            .method("POST")
            .uri("/groupme/webhook")
            .body(Body::from("{definitely not json"))
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(mock.posts().is_empty());
    }

    #[tokio::test]
    async fn webhook_acks_payload_with_unknown_fields() {
        let (state, _mock) = state_with_mock(false);
        let body = r#"{"attachments":[],"avatar_url":null,"created_at":1700000000,
                       "group_id":"123","id":"456","sender_id":"789",
                       "sender_type":"user","source_guid":"guid","system":false,
                       "name":"Alice","text":"hello","user_id":"789"}"#;
        let request = Request::builder()
            .method("POST")
            .uri("/groupme/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
