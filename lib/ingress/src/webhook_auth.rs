//! HMAC webhook authentication.
//!
//! Generic webhook triggers are signed with HMAC-SHA256 over the raw
//! request body using a per-workflow secret, carried hex-encoded in the
//! `x-webhook-signature` header. Verification is constant-time.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generates a random 32-byte webhook secret, hex-encoded.
#[must_use]
pub fn generate_webhook_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn mac_for(secret: &str, payload: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    mac
}

/// Computes the hex-encoded HMAC-SHA256 signature for a payload.
#[must_use]
pub fn sign_payload(secret: &str, payload: &str) -> String {
    hex::encode(mac_for(secret, payload).finalize().into_bytes())
}

/// Verifies a hex-encoded signature in constant time.
///
/// A malformed (non-hex, wrong-length) signature is invalid, not an error.
#[must_use]
pub fn verify_signature(secret: &str, payload: &str, signature: &str) -> bool {
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };
    mac_for(secret, payload).verify_slice(&signature).is_ok()
}
