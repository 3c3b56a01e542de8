//! Webhook signature verification.
//!
//! Stripe signs deliveries with a `Stripe-Signature` header of the form
//! `t=<unix-ts>,v1=<hex-hmac>[,v1=...]`. The signed message is
//! `"{t}.{payload}"`, keyed with the endpoint's signing secret. Verification
//! uses constant-time comparison and rejects stale timestamps.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use marketplace_types::{ProviderError, ProviderEvent};

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age (and clock skew) of a delivery, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verifies a delivery against the signing secret and parses the event.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
) -> Result<ProviderEvent, ProviderError> {
    construct_event_at(payload, header, secret, chrono::Utc::now().timestamp())
}

/// Timestamp-injectable inner verification, for testability.
fn construct_event_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<ProviderEvent, ProviderError> {
    let (timestamp, candidates) = parse_header(header)?;

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(ProviderError::Signature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let expected = sign(payload, timestamp, secret);
    let valid = candidates
        .iter()
        .any(|candidate| expected.as_bytes().ct_eq(candidate.as_bytes()).into());
    if !valid {
        return Err(ProviderError::Signature(
            "no matching v1 signature".to_string(),
        ));
    }

    serde_json::from_slice(payload).map_err(|e| ProviderError::Decode(e.to_string()))
}

/// Computes the hex HMAC-SHA256 signature of `"{t}.{payload}"`.
fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Parses `t=...,v1=...` into the timestamp and all v1 candidates.
fn parse_header(header: &str) -> Result<(i64, Vec<&str>), ProviderError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = value.parse::<i64>().ok();
            }
            Some(("v1", value)) => candidates.push(value),
            // Older scheme versions (v0) and unknown keys are ignored.
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| ProviderError::Signature("missing timestamp in header".to_string()))?;
    if candidates.is_empty() {
        return Err(ProviderError::Signature(
            "missing v1 signature in header".to_string(),
        ));
    }
    Ok((timestamp, candidates))
}
