//! Client Configuration
//!
//! Credentials are fixed at construction and read-only afterwards.

use std::fmt;
use std::time::Duration;

use crate::error::{PaymentError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.mercadopago.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Access token and webhook URL. Both are secrets and must stay out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    notification_url: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, notification_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            notification_url: notification_url.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn notification_url(&self) -> &str {
        &self.notification_url
    }

    /// Value for the `Authorization` header
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("notification_url", &"<redacted>")
            .finish()
    }
}

/// Mercado Pago client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub credentials: Credentials,

    /// API host, without trailing slash
    pub base_url: String,

    /// Per-request timeout applied by the transport
    pub timeout: Duration,

    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("mercadopago-client/", env!("CARGO_PKG_VERSION")).into(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any `MERCADOPAGO_*` variable source
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key).ok_or_else(|| PaymentError::Config(format!("{key} not set")))
        };
        let access_token = required("MERCADOPAGO_ACCESS_TOKEN")?;
        let notification_url = required("MERCADOPAGO_NOTIFICATION_URL")?;

        let mut config = Self::new(Credentials::new(access_token, notification_url));

        if let Some(base_url) = get("MERCADOPAGO_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = get("MERCADOPAGO_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                PaymentError::Config(format!("MERCADOPAGO_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.credentials.access_token.trim().is_empty() {
            return Err(PaymentError::Config("access token is empty".into()));
        }
        if self.base_url.is_empty() {
            return Err(PaymentError::Config("base URL is empty".into()));
        }
        Ok(())
    }
}
