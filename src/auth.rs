//! Bitfinex authenticated-endpoint signing.
//!
//! Private v2 endpoints expect three headers on every request:
//! `bfx-apikey`, `bfx-nonce` and `bfx-signature`, where the signature is
//! `hex(HMAC-SHA384(secret, "/api/v2/auth/r/<resource>" + nonce + body))`.
//! The payload must match byte-for-byte what is sent on the wire.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha384;

use crate::Result;

/// Tracks the last nonce issued so every call returns a strictly
/// increasing value even when the wall-clock hasn't advanced.
///
/// Microsecond resolution in a `u64` overflows around year 586_000.
static LAST_NONCE: AtomicU64 = AtomicU64::new(0);

/// Path prefix every signed read endpoint shares.
const AUTH_READ_PREFIX: &str = "/api/v2/auth/r/";

/// Builds the string that gets signed for an authenticated read endpoint.
///
/// `resource` is the path segment after `/auth/r/` (`wallets`, `alerts`),
/// `body` is the exact request body that will be sent (empty for wallets).
pub fn auth_payload(resource: &str, nonce: &str, body: &str) -> String {
    format!("{AUTH_READ_PREFIX}{resource}{nonce}{body}")
}

/// Computes the `bfx-signature` header value: lowercase hex HMAC-SHA384.
///
/// # Errors
///
/// Returns [`WatchError::Config`](crate::WatchError::Config) if the secret
/// is rejected as an HMAC key.
pub fn sign(api_secret: &str, payload: &str) -> Result<String> {
    let mut mac = Hmac::<Sha384>::new_from_slice(api_secret.as_bytes())
        .map_err(|e| crate::WatchError::Config(format!("invalid HMAC key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Returns a strictly monotonically-increasing nonce in microseconds
/// since the UNIX epoch, rendered as a decimal string.
///
/// Uses the wall-clock as the baseline but guarantees that successive calls
/// always return a value larger than the previous one, even when the clock
/// resolution is too coarse or the clock jumps backwards.
pub fn next_nonce() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64;

    let mut prev = LAST_NONCE.load(Ordering::Relaxed);
    loop {
        let nonce = now.max(prev + 1);
        match LAST_NONCE.compare_exchange_weak(prev, nonce, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return nonce.to_string(),
            Err(actual) => prev = actual,
        }
    }
}
