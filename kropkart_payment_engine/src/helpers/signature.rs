//! HMAC-SHA256 signatures, hex encoded, as used by the payment gateway for both client-side payment confirmations
//! and server-to-server webhooks.
use hmac::{Hmac, Mac};
use kpg_common::Secret;
use log::trace;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Calculates the hex-encoded HMAC-SHA256 of `data`, keyed with `secret`.
pub fn calculate_signature(secret: &str, data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `signature` against the HMAC-SHA256 of `payload` keyed with `secret`.
///
/// The comparison runs in constant time. This function never fails: a missing, empty, non-hex or simply wrong
/// signature all return `false`.
pub fn verify_signature(payload: &[u8], signature: Option<&str>, secret: &Secret<String>) -> bool {
    let Some(signature) = signature.map(str::trim).filter(|s| !s.is_empty()) else {
        trace!("🔐️ No signature supplied");
        return false;
    };
    let Ok(expected) = hex::decode(signature) else {
        trace!("🔐️ Signature is not valid hex");
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.reveal().as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
