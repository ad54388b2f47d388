//! Payment Domain Model
//!
//! Requests the caller builds, the wire payload sent to `/v1/payments`,
//! and the normalized results handed back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorResult, Result};

/// Tax identification type sent with every payer
pub const TAX_ID_TYPE: &str = "CPF";

/// Payment method requested from the provider
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Instant payment via QR code
    Pix,
    /// Bank slip (Bradesco)
    Boleto,
    /// Anything else; rejected before reaching the network
    Other(String),
}

impl PaymentMethod {
    /// Provider identifier for `payment_method_id`
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Boleto => "bolbradesco",
            PaymentMethod::Other(id) => id,
        }
    }

    pub fn from_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "pix" => PaymentMethod::Pix,
            "bolbradesco" | "boleto" => PaymentMethod::Boleto,
            _ => PaymentMethod::Other(id.to_string()),
        }
    }

    pub const fn is_supported(&self) -> bool {
        !matches!(self, PaymentMethod::Other(_))
    }
}

impl From<String> for PaymentMethod {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.as_str().to_string()
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Person paying
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    pub email: String,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    /// CPF number
    pub tax_id: String,
}

/// One payment to create. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Caller's order reference (`external_reference`)
    pub reference: String,
    pub amount: Decimal,
    pub description: String,
    pub payer: Payer,
    pub method: PaymentMethod,
}

impl PaymentRequest {
    pub fn new(
        reference: impl Into<String>,
        amount: Decimal,
        description: impl Into<String>,
        payer_email: impl Into<String>,
        payer_tax_id: impl Into<String>,
        method: PaymentMethod,
    ) -> Self {
        Self {
            reference: reference.into(),
            amount,
            description: description.into(),
            payer: Payer {
                email: payer_email.into(),
                first_name: None,
                last_name: None,
                tax_id: payer_tax_id.into(),
            },
            method,
        }
    }

    #[must_use]
    pub fn with_payer_name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.payer.first_name = Some(first_name.into());
        self.payer.last_name = Some(last_name.into());
        self
    }

    /// Build the JSON body for `POST /v1/payments`
    pub(crate) fn to_body<'a>(&'a self, notification_url: &'a str) -> CreatePaymentBody<'a> {
        CreatePaymentBody {
            external_reference: &self.reference,
            transaction_amount: self.amount,
            description: &self.description,
            notification_url,
            payment_method_id: self.method.as_str(),
            payer: PayerBody {
                email: &self.payer.email,
                first_name: self.payer.first_name.as_deref().unwrap_or_default(),
                last_name: self.payer.last_name.as_deref().unwrap_or_default(),
                identification: Identification {
                    kind: TAX_ID_TYPE,
                    number: &self.payer.tax_id,
                },
            },
        }
    }
}

/// Wire payload for payment creation
#[derive(Debug, Serialize)]
pub(crate) struct CreatePaymentBody<'a> {
    external_reference: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    transaction_amount: Decimal,
    description: &'a str,
    notification_url: &'a str,
    payment_method_id: &'a str,
    payer: PayerBody<'a>,
}

#[derive(Debug, Serialize)]
struct PayerBody<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    identification: Identification<'a>,
}

#[derive(Debug, Serialize)]
struct Identification<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    number: &'a str,
}

/// Created PIX payment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixPayment {
    pub payment_id: String,
    /// Copy-and-paste PIX payload
    pub qr_code: String,
    pub qr_code_base64: String,
    /// Provider-hosted ticket page
    pub payment_url: String,
}

/// Created boleto payment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoletoPayment {
    pub payment_id: String,
    pub boleto_url: String,
    pub boleto_barcode: String,
}

/// Successfully created payment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreatedPayment {
    Pix(PixPayment),
    Boleto(BoletoPayment),
}

impl CreatedPayment {
    pub fn payment_id(&self) -> &str {
        match self {
            CreatedPayment::Pix(pix) => &pix.payment_id,
            CreatedPayment::Boleto(boleto) => &boleto.payment_id,
        }
    }
}

/// Result surface returned to callers, serialized as a flat JSON object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentResult {
    Pix(PixPayment),
    Boleto(BoletoPayment),
    Error(ErrorResult),
}

impl PaymentResult {
    pub const fn is_error(&self) -> bool {
        matches!(self, PaymentResult::Error(_))
    }
}

impl From<Result<CreatedPayment>> for PaymentResult {
    fn from(result: Result<CreatedPayment>) -> Self {
        match result {
            Ok(CreatedPayment::Pix(pix)) => PaymentResult::Pix(pix),
            Ok(CreatedPayment::Boleto(boleto)) => PaymentResult::Boleto(boleto),
            Err(err) => PaymentResult::Error(err.to_error_result()),
        }
    }
}
