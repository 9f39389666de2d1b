//! Stripe webhook verification and event shaping.
//!
//! Stripe signs webhooks with a `stripe-signature` header of the form
//! `t=<unix>,v1=<hex>[,v1=...]`; the signed payload is `"{t}.{raw_body}"`
//! under HMAC-SHA256 with the workflow's signing secret. The timestamp
//! bounds replay of captured deliveries.

use crate::error::SignatureError;
use crate::webhook_auth::verify_signature;
use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue, json};

/// Default accepted clock skew between Stripe and us, in seconds.
pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

/// A parsed `stripe-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeSignature {
    /// The `t=` timestamp (unix seconds).
    pub timestamp: i64,
    /// Every `v1=` signature candidate.
    pub signatures: Vec<String>,
}

/// Parses a `stripe-signature` header.
///
/// Returns `None` unless the header carries a numeric `t=` and at least one
/// `v1=` entry.
#[must_use]
pub fn parse_signature_header(header: &str) -> Option<StripeSignature> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => signatures.push(value.to_string()),
            // Stripe also sends v0 for legacy endpoints; ignore it.
            _ => {}
        }
    }

    let timestamp = timestamp?;
    if signatures.is_empty() {
        return None;
    }
    Some(StripeSignature {
        timestamp,
        signatures,
    })
}

/// Verifies a Stripe webhook delivery.
///
/// # Errors
///
/// - [`SignatureError::Malformed`] if the header does not parse.
/// - [`SignatureError::Expired`] if the timestamp is outside `tolerance_seconds` of `now`.
/// - [`SignatureError::Invalid`] if no `v1` candidate matches the payload.
pub fn verify_stripe_signature(
    secret: &str,
    payload: &str,
    header: &str,
    tolerance_seconds: i64,
    now: DateTime<Utc>,
) -> Result<(), SignatureError> {
    let parsed = parse_signature_header(header).ok_or(SignatureError::Malformed)?;

    if (now.timestamp() - parsed.timestamp).abs() > tolerance_seconds {
        return Err(SignatureError::Expired);
    }

    let signed_payload = format!("{}.{payload}", parsed.timestamp);
    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| verify_signature(secret, &signed_payload, candidate));

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Invalid)
    }
}

/// Shapes a verified Stripe event into the run's initial context data.
///
/// The whole event stays available under `raw`; the commonly used fields
/// are lifted to the top so templates read `{{stripe.eventType}}` instead
/// of digging through the envelope.
#[must_use]
pub fn stripe_initial_data(event: &JsonValue) -> JsonValue {
    let timestamp = event
        .get("created")
        .and_then(JsonValue::as_i64)
        .and_then(|created| DateTime::<Utc>::from_timestamp(created, 0))
        .map(|dt| dt.to_rfc3339());

    json!({
        "stripe": {
            "eventId": event.get("id").cloned().unwrap_or(JsonValue::Null),
            "eventType": event.get("type").cloned().unwrap_or(JsonValue::Null),
            "timestamp": timestamp,
            "livemode": event.get("livemode").cloned().unwrap_or(JsonValue::Null),
            "data": event.pointer("/data/object").cloned().unwrap_or(JsonValue::Null),
            "raw": event,
        }
    })
}
