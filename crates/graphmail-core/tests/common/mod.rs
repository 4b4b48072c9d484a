//! Shared test doubles: an in-memory Graph transport and token source.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use graphmail_core::{
    ClientConfig, GraphMailClient, GraphRequest, GraphResponse, GraphTransport, Result,
    TokenSource,
};
use graphmail_oauth::Token;
use serde_json::{Value, json};

type Handler = Box<dyn FnMut(&GraphRequest) -> GraphResponse + Send>;

/// Transport that records every request and answers from a handler.
pub struct MockTransport {
    handler: Mutex<Handler>,
    requests: Mutex<Vec<(GraphRequest, String)>>,
}

impl MockTransport {
    /// Answers each request with `handler`.
    pub fn new(handler: impl FnMut(&GraphRequest) -> GraphResponse + Send + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Mutex::new(Box::new(handler)),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers with `responses` in order, then with 500.
    pub fn scripted(responses: Vec<GraphResponse>) -> Arc<Self> {
        let mut queue: VecDeque<GraphResponse> = responses.into();
        Self::new(move |_| {
            queue
                .pop_front()
                .unwrap_or_else(|| GraphResponse::new(500, b"script exhausted".to_vec()))
        })
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<GraphRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(r, _)| r.clone())
            .collect()
    }

    /// Bearer tokens sent so far, one per request.
    pub fn bearers(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, b)| b.clone())
            .collect()
    }

    /// Number of requests sent.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GraphTransport for MockTransport {
    async fn send(&self, request: &GraphRequest, bearer: &str) -> Result<GraphResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), bearer.to_string()));
        let mut handler = self.handler.lock().unwrap();
        Ok((*handler)(request))
    }
}

/// Token source handing out `token-0`, `token-1`, ... valid for an hour.
pub struct StaticTokenSource {
    calls: AtomicUsize,
    fail: bool,
}

impl StaticTokenSource {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    /// Rejects every request as the token endpoint does for a bad secret.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch_token(&self) -> Result<Token> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(graphmail_oauth::Error::oauth_error(
                "invalid_client",
                "AADSTS7000215: Invalid client secret provided.",
            )
            .into());
        }
        Ok(Token::new(format!("token-{n}"), "Bearer")
            .with_expires_at(Utc::now() + Duration::hours(1)))
    }
}

/// Mailbox user every test client addresses.
pub const MAILBOX: &str = "ops@example.com";

/// Path prefix of [`MAILBOX`].
pub const USER: &str = "/users/ops%40example.com";

pub fn config(attachments_dir: &Path) -> ClientConfig {
    ClientConfig::builder()
        .credentials("app-id", "app-secret", "contoso")
        .mailbox(MAILBOX)
        .attachments_dir(attachments_dir)
        .build()
}

/// Authenticated client over `transport`.
pub async fn client(transport: Arc<MockTransport>, attachments_dir: &Path) -> GraphMailClient {
    let client =
        GraphMailClient::authenticate_with(config(attachments_dir), StaticTokenSource::ok(), transport)
            .await;
    assert!(client.is_authenticated());
    client
}

pub fn ok(body: Value) -> GraphResponse {
    GraphResponse::json_body(200, &body)
}

pub fn no_content() -> GraphResponse {
    GraphResponse::new(204, Vec::new())
}

pub fn accepted() -> GraphResponse {
    GraphResponse::new(202, Vec::new())
}

pub fn not_found() -> GraphResponse {
    GraphResponse::json_body(
        404,
        &json!({"error": {"code": "ErrorItemNotFound", "message": "The specified object was not found in the store."}}),
    )
}

pub fn unauthorized() -> GraphResponse {
    GraphResponse::json_body(
        401,
        &json!({"error": {"code": "InvalidAuthenticationToken", "message": "Access token has expired."}}),
    )
}

pub fn service_unavailable() -> GraphResponse {
    GraphResponse::json_body(
        503,
        &json!({"error": {"code": "ServiceUnavailable", "message": "Try again later."}}),
    )
}

/// A collection page.
pub fn page(values: Vec<Value>) -> GraphResponse {
    ok(json!({ "value": values }))
}

/// A message resource as Graph returns it.
pub fn message(id: &str, subject: &str, received: &str) -> Value {
    json!({
        "id": id,
        "subject": subject,
        "body": {"contentType": "html", "content": format!("<p>{subject}</p>")},
        "from": {"emailAddress": {"name": "Sender", "address": "sender@example.com"}},
        "receivedDateTime": received,
        "attachments": []
    })
}

/// An event resource as Graph returns it with `Prefer: outlook.timezone="UTC"`.
pub fn event(id: &str, subject: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "subject": subject,
        "start": {"dateTime": start, "timeZone": "UTC"},
        "end": {"dateTime": end, "timeZone": "UTC"},
        "location": {"displayName": "Room 1"},
        "organizer": {"emailAddress": {"address": "lead@example.com"}},
        "attendees": []
    })
}
