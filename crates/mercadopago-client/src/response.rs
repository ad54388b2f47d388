//! Provider Response Navigation
//!
//! Every nested field is presence-checked; absence becomes
//! `PaymentError::MissingField` carrying the dotted path.

use serde_json::Value;

use crate::error::{PaymentError, Result};
use crate::model::{BoletoPayment, PixPayment};

const PIX_DATA: [&str; 2] = ["point_of_interaction", "transaction_data"];

/// Walk `path` from `value`. Null counts as absent.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = value;
    for segment in path {
        current = match current.get(segment) {
            Some(Value::Null) | None => return Err(PaymentError::MissingField(path.join("."))),
            Some(next) => next,
        };
    }
    Ok(current)
}

/// Like [`lookup`], but the field must be a string or number
pub fn lookup_text(value: &Value, path: &[&str]) -> Result<String> {
    match lookup(value, path)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(PaymentError::Decode(format!(
            "expected text at {}, found {}",
            path.join("."),
            kind(other)
        ))),
    }
}

/// Error reported by the provider, `error` taking precedence over `message`
pub fn provider_error(value: &Value) -> Option<String> {
    ["error", "message"].iter().find_map(|field| match value.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

pub fn parse_pix(value: &Value) -> Result<PixPayment> {
    let field = |name| [PIX_DATA[0], PIX_DATA[1], name];
    Ok(PixPayment {
        payment_id: lookup_text(value, &["id"])?,
        qr_code: lookup_text(value, &field("qr_code"))?,
        qr_code_base64: lookup_text(value, &field("qr_code_base64"))?,
        payment_url: lookup_text(value, &field("ticket_url"))?,
    })
}

pub fn parse_boleto(value: &Value) -> Result<BoletoPayment> {
    Ok(BoletoPayment {
        payment_id: lookup_text(value, &["id"])?,
        boleto_url: lookup_text(value, &["transaction_details", "external_resource_url"])?,
        boleto_barcode: lookup_text(value, &["transaction_details", "barcode", "content"])?,
    })
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
