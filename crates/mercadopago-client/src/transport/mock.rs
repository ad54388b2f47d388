//! Mock Transport
//!
//! Replays queued responses and records every request it receives.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Headers, HttpResponse, HttpTransport, TransportError};

/// Request seen by the mock
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body
    pub async fn respond(&self, status: u16, body: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure
    pub async fn fail(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(TransportError(message.into())));
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    async fn record(&self, request: RecordedRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().await.push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("mock transport: no response queued".into())))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &str,
    ) -> Result<HttpResponse, TransportError> {
        self.record(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            headers: headers.clone(),
            body: Some(body.to_string()),
        })
        .await
    }

    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse, TransportError> {
        self.record(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            headers: headers.clone(),
            body: None,
        })
        .await
    }
}
