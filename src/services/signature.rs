use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Authenticate a webhook delivery: HMAC-SHA256 over the exact bytes that
/// arrived on the wire, compared against the hex signature header. The body
/// must never be re-serialized before verification; key order and whitespace
/// changes would break the MAC. Comparison is constant-time via
/// `Mac::verify_slice`.
pub fn verify_webhook_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// Checkout-side confirmation signature: HMAC-SHA256 over
/// `"{order_id}|{payment_id}"`, signed with the API key secret.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    let payload = format!("{order_id}|{payment_id}");
    verify_webhook_signature(payload.as_bytes(), signature, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_a_valid_signature() {
        let payload = br#"{"event":"payment.captured"}"#;
        let signature = sign(payload, "whsec_123");

        assert!(verify_webhook_signature(payload, &signature, "whsec_123"));
    }

    #[test]
    fn rejects_a_signature_from_the_wrong_secret() {
        let payload = br#"{"event":"payment.captured"}"#;
        let signature = sign(payload, "not_the_secret");

        assert!(!verify_webhook_signature(payload, &signature, "whsec_123"));
    }

    #[test]
    fn rejects_a_tampered_payload() {
        let original = br#"{"event":"payment.captured"}"#;
        let tampered = br#"{"event":"payment.captured","amount":1}"#;
        let signature = sign(original, "whsec_123");

        assert!(!verify_webhook_signature(tampered, &signature, "whsec_123"));
    }

    #[test]
    fn rejects_non_hex_signatures() {
        let payload = br#"{"event":"payment.captured"}"#;

        assert!(!verify_webhook_signature(payload, "zz-not-hex", "whsec_123"));
        assert!(!verify_webhook_signature(payload, "", "whsec_123"));
    }

    #[test]
    fn tolerates_surrounding_whitespace_in_the_header_value() {
        let payload = br#"{"event":"payment.captured"}"#;
        let signature = format!(" {} ", sign(payload, "whsec_123"));

        assert!(verify_webhook_signature(payload, &signature, "whsec_123"));
    }

    #[test]
    fn payment_signature_covers_order_and_payment_ids() {
        let signature = sign(b"order_abc|pay_xyz", "key_secret");

        assert!(verify_payment_signature(
            "order_abc",
            "pay_xyz",
            &signature,
            "key_secret"
        ));
        assert!(!verify_payment_signature(
            "order_abc",
            "pay_other",
            &signature,
            "key_secret"
        ));
        assert!(!verify_payment_signature(
            "order_other",
            "pay_xyz",
            &signature,
            "key_secret"
        ));
    }
}
