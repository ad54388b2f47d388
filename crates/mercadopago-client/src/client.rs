//! Mercado Pago Client
//!
//! Builds authenticated, idempotent calls to `/v1/payments` and normalizes
//! the PIX and boleto responses.

use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{PaymentError, Result};
use crate::idempotency::{IdempotencyKey, RandomSource, ThreadRandom};
use crate::model::{CreatedPayment, PaymentMethod, PaymentRequest};
use crate::response;
use crate::transport::{Headers, HttpTransport, ReqwestTransport};

const PAYMENTS_PATH: [&str; 2] = ["v1", "payments"];

/// A payment request bound to its idempotency key.
///
/// Submitting the same attempt again reuses the key, so the provider
/// deduplicates the retry instead of charging twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentAttempt {
    request: PaymentRequest,
    key: IdempotencyKey,
}

impl PaymentAttempt {
    pub const fn request(&self) -> &PaymentRequest {
        &self.request
    }

    pub const fn idempotency_key(&self) -> &IdempotencyKey {
        &self.key
    }
}

/// Mercado Pago client wrapper
///
/// Holds no mutable state besides its collaborators; share it behind an
/// `Arc` across tasks.
pub struct MercadoPagoClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    random: Arc<dyn RandomSource>,
}

impl MercadoPagoClient {
    /// Create a client backed by reqwest
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client with a custom transport
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        config.validate()?;
        Url::parse(&config.base_url).map_err(|e| {
            PaymentError::Config(format!("invalid base URL {}: {e}", config.base_url))
        })?;

        Ok(Self {
            config,
            transport,
            random: Arc::new(ThreadRandom),
        })
    }

    /// Replace the random source behind idempotency keys
    #[must_use]
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Bind a fresh idempotency key to `request`
    pub fn prepare(&self, request: PaymentRequest) -> PaymentAttempt {
        PaymentAttempt {
            request,
            key: IdempotencyKey::generate(self.random.as_ref()),
        }
    }

    /// Create a PIX or boleto payment with one POST and a fresh key
    pub async fn create_payment(&self, request: PaymentRequest) -> Result<CreatedPayment> {
        let attempt = self.prepare(request);
        self.submit(&attempt).await
    }

    /// Send `attempt` to the provider. Safe to call again for a retry.
    pub async fn submit(&self, attempt: &PaymentAttempt) -> Result<CreatedPayment> {
        let request = &attempt.request;
        if !request.method.is_supported() {
            return Err(PaymentError::UnsupportedMethod(request.method.to_string()));
        }

        let url = self.payments_url(None)?;
        let notification_url = self.config.credentials.notification_url();
        let body = serde_json::to_string(&request.to_body(notification_url))?;
        let headers: Headers = vec![
            ("Content-Type", "application/json".into()),
            ("Authorization", self.config.credentials.bearer()),
            ("X-Idempotency-Key", attempt.key.to_string()),
        ];

        tracing::debug!(
            method = "POST",
            path = url.path(),
            payment_method = %request.method,
            idempotency_key = %attempt.key,
            "Creating payment"
        );

        let response = self
            .transport
            .post_json(url.as_str(), &headers, &body)
            .await
            .map_err(|e| PaymentError::Transport(e.0))?;

        let parsed = serde_json::from_str::<Value>(&response.body);

        if let Some(message) = parsed.as_ref().ok().and_then(response::provider_error) {
            tracing::warn!(
                status = response.status,
                error = %message,
                "Payment rejected by provider"
            );
            return Err(PaymentError::Provider { message });
        }

        if !(200..300).contains(&response.status) {
            tracing::warn!(status = response.status, "Payment creation failed");
            return Err(PaymentError::Http {
                status: response.status,
                body: response.body,
            });
        }

        let parsed = parsed.map_err(|e| {
            PaymentError::Decode(format!("HTTP {} with non-JSON body: {e}", response.status))
        })?;

        let created = match &request.method {
            PaymentMethod::Pix => CreatedPayment::Pix(response::parse_pix(&parsed)?),
            PaymentMethod::Boleto => CreatedPayment::Boleto(response::parse_boleto(&parsed)?),
            PaymentMethod::Other(id) => return Err(PaymentError::UnsupportedMethod(id.clone())),
        };

        tracing::info!(
            payment_id = %created.payment_id(),
            payment_method = %request.method,
            "Payment created"
        );

        Ok(created)
    }

    /// Fetch a payment by id. The body of a 200 is returned untouched.
    pub async fn get_payment(&self, payment_id: &str) -> Result<Value> {
        let payment_id = payment_id.trim();
        if payment_id.is_empty() {
            return Err(PaymentError::InvalidRequest("payment id is empty".into()));
        }

        let url = self.payments_url(Some(payment_id))?;
        let headers: Headers = vec![("Authorization", self.config.credentials.bearer())];

        tracing::debug!(method = "GET", path = url.path(), "Fetching payment");

        let response = self
            .transport
            .get(url.as_str(), &headers)
            .await
            .map_err(|e| PaymentError::Transport(format!("request failed: {}", e.0)))?;

        if !response.is_ok() {
            tracing::warn!(status = response.status, payment_id, "Payment lookup failed");
            return Err(PaymentError::Http {
                status: response.status,
                body: response.body,
            });
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    /// `{base}/v1/payments[/{id}]`, with the id encoded as one path segment
    fn payments_url(&self, payment_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| PaymentError::Config(format!("invalid base URL: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| PaymentError::Config("base URL cannot have a path".into()))?;
            segments.pop_if_empty().extend(PAYMENTS_PATH);
            if let Some(id) = payment_id {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::config::Credentials;
    use crate::idempotency::SeededRandom;
    use crate::model::PaymentResult;
    use crate::transport::MockTransport;

    fn client(mock: &Arc<MockTransport>) -> MercadoPagoClient {
        let credentials = Credentials::new("TEST-token", "https://shop.example/hook");
        MercadoPagoClient::with_transport(ClientConfig::new(credentials), mock.clone())
            .unwrap()
            .with_random_source(Arc::new(SeededRandom::new(42)))
    }

    fn request(method: PaymentMethod) -> PaymentRequest {
        PaymentRequest::new("ORD-1", dec!(10.50), "x", "a@b.com", "12345678900", method)
    }

    fn pix_response() -> String {
        json!({
            "id": "123",
            "point_of_interaction": {
                "transaction_data": {
                    "qr_code": "Q1",
                    "qr_code_base64": "QjE=",
                    "ticket_url": "http://x"
                }
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_create_pix_payment() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(201, pix_response()).await;

        let created = client(&mock).create_payment(request(PaymentMethod::Pix)).await;
        assert_eq!(
            serde_json::to_value(PaymentResult::from(created)).unwrap(),
            json!({
                "payment_id": "123",
                "qr_code": "Q1",
                "qr_code_base64": "QjE=",
                "payment_url": "http://x"
            })
        );
    }

    #[tokio::test]
    async fn test_create_sends_auth_and_idempotency_headers() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(201, pix_response()).await;

        client(&mock).create_payment(request(PaymentMethod::Pix)).await.unwrap();

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.url, "https://api.mercadopago.com/v1/payments");
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.header("authorization"), Some("Bearer TEST-token"));
        assert_eq!(sent.header("x-idempotency-key").map(str::len), Some(36));

        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["notification_url"], "https://shop.example/hook");
        assert_eq!(body["transaction_amount"], json!(10.5));
        assert_eq!(body["payer"]["identification"]["type"], "CPF");
    }

    #[tokio::test]
    async fn test_create_boleto_payment() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            201,
            json!({
                "id": 987_654_321_u64,
                "transaction_details": {
                    "external_resource_url": "https://boleto.example/987",
                    "barcode": { "content": "23790.00009" }
                }
            })
            .to_string(),
        )
        .await;

        let created = client(&mock).create_payment(request(PaymentMethod::Boleto)).await.unwrap();
        match created {
            CreatedPayment::Boleto(boleto) => {
                assert_eq!(boleto.payment_id, "987654321");
                assert_eq!(boleto.boleto_url, "https://boleto.example/987");
                assert_eq!(boleto.boleto_barcode, "23790.00009");
            }
            other => panic!("expected boleto, got {other:?}"),
        }
        let sent = mock.requests().await;
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["payment_method_id"], "bolbradesco");
    }

    #[tokio::test]
    async fn test_provider_message_surfaced_verbatim() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(401, r#"{"message":"invalid token"}"#).await;

        let created = client(&mock).create_payment(request(PaymentMethod::Pix)).await;
        let result = PaymentResult::from(created);
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "error": "invalid token" }));
    }

    #[tokio::test]
    async fn test_unsupported_method_makes_no_call() {
        let mock = Arc::new(MockTransport::new());

        let err = client(&mock)
            .create_payment(request(PaymentMethod::from_id("visa")))
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::UnsupportedMethod("visa".into()));
        assert_eq!(err.to_error_result().error, "unsupported payment method");
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_nested_field_is_reported() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(201, json!({ "id": "123", "point_of_interaction": {} }).to_string()).await;

        let err = client(&mock).create_payment(request(PaymentMethod::Pix)).await.unwrap_err();
        assert_eq!(
            err,
            PaymentError::MissingField("point_of_interaction.transaction_data.qr_code".into())
        );
    }

    #[tokio::test]
    async fn test_transport_failure_not_retried() {
        let mock = Arc::new(MockTransport::new());
        mock.fail("connection refused").await;

        let err = client(&mock).create_payment(request(PaymentMethod::Pix)).await.unwrap_err();
        assert_eq!(err, PaymentError::Transport("connection refused".into()));
        assert_eq!(err.to_error_result().error, "connection refused");
        assert_eq!(mock.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_resubmitting_attempt_reuses_key() {
        let mock = Arc::new(MockTransport::new());
        mock.fail("timeout").await;
        mock.respond(201, pix_response()).await;
        mock.respond(201, pix_response()).await;

        let client = client(&mock);
        let attempt = client.prepare(request(PaymentMethod::Pix));
        let first = client.submit(&attempt).await.unwrap_err();
        assert!(first.is_retryable());
        client.submit(&attempt).await.unwrap();
        client.create_payment(request(PaymentMethod::Pix)).await.unwrap();

        let keys: Vec<String> = mock
            .requests()
            .await
            .iter()
            .map(|r| r.header("X-Idempotency-Key").unwrap().to_string())
            .collect();
        assert_eq!(keys[0], attempt.idempotency_key().as_str());
        assert_eq!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
    }

    #[tokio::test]
    async fn test_get_payment_passthrough() {
        let mock = Arc::new(MockTransport::new());
        let payload = json!({ "id": 123, "status": "approved", "extra": { "nested": [1, 2, 3] } });
        mock.respond(200, payload.to_string()).await;

        let fetched = client(&mock).get_payment("123").await.unwrap();
        assert_eq!(fetched, payload);

        let sent = &mock.requests().await[0];
        assert_eq!(sent.method, "GET");
        assert_eq!(sent.url, "https://api.mercadopago.com/v1/payments/123");
        assert_eq!(sent.header("Authorization"), Some("Bearer TEST-token"));
        assert_eq!(sent.header("X-Idempotency-Key"), None);
    }

    #[tokio::test]
    async fn test_get_payment_non_200_keeps_raw_body() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(404, r#"{"message":"Payment not found"}"#).await;

        let err = client(&mock).get_payment("999").await.unwrap_err();
        assert_eq!(
            err,
            PaymentError::Http {
                status: 404,
                body: r#"{"message":"Payment not found"}"#.into(),
            }
        );
        let result = err.to_error_result();
        assert!(result.error.contains("HTTP 404"));
        assert_eq!(result.response.as_deref(), Some(r#"{"message":"Payment not found"}"#));
    }

    #[tokio::test]
    async fn test_get_payment_transport_error() {
        let mock = Arc::new(MockTransport::new());
        mock.fail("dns error").await;

        let err = client(&mock).get_payment("1").await.unwrap_err();
        assert!(matches!(err, PaymentError::Transport(ref m) if m.contains("dns error")));
    }

    #[tokio::test]
    async fn test_get_payment_encodes_id_and_rejects_empty() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, "{}").await;
        let client = client(&mock);

        assert!(matches!(client.get_payment("  ").await, Err(PaymentError::InvalidRequest(_))));
        client.get_payment("12/../34").await.unwrap();

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.mercadopago.com/v1/payments/12%2F..%2F34");
    }

    #[tokio::test]
    async fn test_base_url_with_path_prefix() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, "{}").await;
        let config = ClientConfig::new(Credentials::new("t", "n"))
            .with_base_url("http://localhost:8080/sandbox/");
        let client = MercadoPagoClient::with_transport(config, mock.clone()).unwrap();

        client.get_payment("7").await.unwrap();
        assert_eq!(mock.requests().await[0].url, "http://localhost:8080/sandbox/v1/payments/7");
    }

    #[tokio::test]
    async fn test_gateway_html_page_is_retryable_http_error() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(502, "<html>Bad Gateway</html>").await;

        let err = client(&mock).create_payment(request(PaymentMethod::Pix)).await.unwrap_err();
        assert_eq!(
            err,
            PaymentError::Http {
                status: 502,
                body: "<html>Bad Gateway</html>".into(),
            }
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_without_message_is_retryable_http_error() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(500, r#"{"status":500,"cause":[]}"#).await;

        let err = client(&mock).create_payment(request(PaymentMethod::Boleto)).await.unwrap_err();
        assert!(matches!(err, PaymentError::Http { status: 500, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_provider_message_wins_over_status() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(503, r#"{"message":"service unavailable"}"#).await;

        let err = client(&mock).create_payment(request(PaymentMethod::Pix)).await.unwrap_err();
        assert_eq!(
            err,
            PaymentError::Provider {
                message: "service unavailable".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_success_with_non_json_body_is_decode_error() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(201, "created").await;

        let err = client(&mock).create_payment(request(PaymentMethod::Pix)).await.unwrap_err();
        assert!(matches!(err, PaymentError::Decode(_)));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_logs_never_contain_secrets() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mock = Arc::new(MockTransport::new());
        mock.respond(201, pix_response()).await;
        mock.respond(401, r#"{"message":"invalid token"}"#).await;
        mock.respond(404, "{}").await;
        mock.respond(200, "{}").await;

        let client = client(&mock);
        client.create_payment(request(PaymentMethod::Pix)).await.unwrap();
        client.create_payment(request(PaymentMethod::Pix)).await.unwrap_err();
        client.get_payment("404").await.unwrap_err();
        client.get_payment("200").await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Creating payment"), "nothing captured: {output}");
        assert!(output.contains("Payment created"));
        assert!(!output.contains("TEST-token"));
        assert!(!output.contains("shop.example/hook"));
        assert!(!output.contains("a@b.com"));
        assert!(!output.contains("12345678900"));
    }
}
