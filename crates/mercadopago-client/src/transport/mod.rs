//! HTTP Transport
//!
//! The client speaks to the provider through this trait, so tests and
//! offline demos can replace the network with [`MockTransport`].

mod http;
mod mock;

pub use http::ReqwestTransport;
pub use mock::{MockTransport, RecordedRequest};

use async_trait::async_trait;

/// Transport-level failure (connection, DNS, timeout)
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Raw HTTP response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Header name/value pairs
pub type Headers = Vec<(&'static str, String)>;

/// One round trip per call; no retries at this layer.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST a JSON body
    async fn post_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &str,
    ) -> Result<HttpResponse, TransportError>;

    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse, TransportError>;
}
