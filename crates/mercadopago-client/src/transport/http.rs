//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

use super::{Headers, HttpResponse, HttpTransport, TransportError};
use crate::config::ClientConfig;
use crate::error::{self, PaymentError};

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport honouring the configured timeout and user agent
    pub fn new(config: &ClientConfig) -> error::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PaymentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn send(
        request: RequestBuilder,
        headers: &Headers,
    ) -> Result<HttpResponse, TransportError> {
        let request = headers
            .iter()
            .fold(request, |req, (name, value)| req.header(*name, value));

        let response = request.send().await.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &str,
    ) -> Result<HttpResponse, TransportError> {
        Self::send(self.client.post(url).body(body.to_owned()), headers).await
    }

    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse, TransportError> {
        Self::send(self.client.get(url), headers).await
    }
}
