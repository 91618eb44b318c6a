//! Payment verification collaborator.
//!
//! The gateway calls back with `(order_ref, payment_id, signature)` where
//! the signature is an HMAC-SHA256 of `"{order_ref}|{payment_id}"` under
//! the gateway key secret. Only the verification leg lives here; creating
//! gateway orders is the client's concern.

use hmac::{Hmac, Mac};
use makaan_common::{AppResult, config::PaymentConfig};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Payment signature verification contract.
pub trait PaymentVerifier: Send + Sync {
    /// Whether the signature is authentic for this order/payment pair.
    fn verify(&self, order_ref: &str, payment_id: &str, signature: &str) -> AppResult<bool>;
}

/// HMAC-SHA256 verifier using the gateway key secret.
pub struct HmacPaymentVerifier {
    key_secret: String,
}

impl HmacPaymentVerifier {
    /// Create a verifier from the payment configuration.
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            key_secret: config.key_secret.clone(),
        }
    }

    fn expected_signature(&self, order_ref: &str, payment_id: &str) -> String {
        // Key length is unrestricted for HMAC; new_from_slice cannot fail.
        #[allow(clippy::unwrap_used)]
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes()).unwrap();
        mac.update(format!("{order_ref}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl PaymentVerifier for HmacPaymentVerifier {
    fn verify(&self, order_ref: &str, payment_id: &str, signature: &str) -> AppResult<bool> {
        let expected = self.expected_signature(order_ref, payment_id);
        // Hex-decode the caller's signature so the comparison is on raw MAC
        // bytes; a malformed signature is simply not authentic.
        let Ok(provided) = hex::decode(signature) else {
            return Ok(false);
        };
        let Ok(expected) = hex::decode(expected) else {
            return Ok(false);
        };
        Ok(constant_time_eq(&provided, &expected))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Approves everything; for tests and gateway-less development.
pub struct NoOpPaymentVerifier;

impl PaymentVerifier for NoOpPaymentVerifier {
    fn verify(&self, _order_ref: &str, _payment_id: &str, _signature: &str) -> AppResult<bool> {
        tracing::warn!("Payment verification skipped (no gateway configured)");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn verifier() -> HmacPaymentVerifier {
        HmacPaymentVerifier::new(&PaymentConfig {
            key_id: "key_test".to_string(),
            key_secret: "secret_test".to_string(),
        })
    }

    #[test]
    fn test_accepts_authentic_signature() {
        let v = verifier();
        let sig = v.expected_signature("order1", "pay1");
        assert!(v.verify("order1", "pay1", &sig).unwrap());
    }

    #[test]
    fn test_rejects_tampered_payment_id() {
        let v = verifier();
        let sig = v.expected_signature("order1", "pay1");
        assert!(!v.verify("order1", "pay2", &sig).unwrap());
    }

    #[test]
    fn test_rejects_malformed_signature() {
        let v = verifier();
        assert!(!v.verify("order1", "pay1", "not-hex!").unwrap());
    }
}
