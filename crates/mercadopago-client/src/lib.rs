//! # mercadopago-client
//!
//! Idempotent PIX and boleto payments against the Mercado Pago REST API.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  prepare   ┌────────────────┐  submit (POST)  ┌──────────────┐
//! │PaymentRequest│───────────▶│ PaymentAttempt │────────────────▶│ /v1/payments │
//! └──────────────┘            │ + idem. key    │◀── retry reuses │              │
//!                             └────────────────┘     the key     └──────────────┘
//! ```
//!
//! - One idempotency key per logical attempt, reused by every retry of it
//! - Provider errors are surfaced verbatim, never classified
//! - Missing response fields become errors instead of panics
//! - No automatic retries: the caller decides, using `PaymentError::is_retryable`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mercadopago_client::{MercadoPagoClient, PaymentMethod, PaymentRequest, PaymentResult};
//! use rust_decimal_macros::dec;
//!
//! let client = MercadoPagoClient::from_env()?;
//!
//! let request = PaymentRequest::new(
//!     "ORD-1", dec!(10.50), "Order #1", "buyer@example.com", "12345678900",
//!     PaymentMethod::Pix,
//! );
//!
//! let attempt = client.prepare(request);
//! let result = match client.submit(&attempt).await {
//!     Err(e) if e.is_retryable() => client.submit(&attempt).await,
//!     other => other,
//! };
//!
//! // { "payment_id": ..., "qr_code": ..., "qr_code_base64": ..., "payment_url": ... }
//! println!("{}", serde_json::to_string(&PaymentResult::from(result))?);
//! ```

mod client;
mod config;
mod error;
mod idempotency;
mod model;
pub mod response;
pub mod transport;

pub use client::{MercadoPagoClient, PaymentAttempt};
pub use config::{ClientConfig, Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{ErrorResult, PaymentError, Result, UNSUPPORTED_METHOD_MESSAGE};
pub use idempotency::{IdempotencyKey, RandomSource, SeededRandom, ThreadRandom};
pub use model::{
    BoletoPayment, CreatedPayment, Payer, PaymentMethod, PaymentRequest, PaymentResult, PixPayment,
    TAX_ID_TYPE,
};
