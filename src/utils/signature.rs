use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 over `{order_id}|{payment_id}`, the payload the
/// payment gateway signs on a successful capture.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a gateway-supplied hex signature in constant time. Undecodable
/// signatures fail closed.
pub fn verify(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let supplied = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&supplied).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-gateway-secret";

    #[test]
    fn test_correct_signature_verifies() {
        let signature = sign(SECRET, "order_abc", "pay_xyz");
        assert!(verify(SECRET, "order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn test_single_character_mutation_fails() {
        let signature = sign(SECRET, "order_abc", "pay_xyz");
        let mut mutated: Vec<char> = signature.chars().collect();
        mutated[0] = if mutated[0] == 'a' { 'b' } else { 'a' };
        let mutated: String = mutated.into_iter().collect();
        assert!(!verify(SECRET, "order_abc", "pay_xyz", &mutated));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let signature = sign(SECRET, "order_abc", "pay_xyz");
        assert!(!verify("another-secret", "order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn test_swapped_identifiers_fail() {
        let signature = sign(SECRET, "order_abc", "pay_xyz");
        assert!(!verify(SECRET, "pay_xyz", "order_abc", &signature));
    }

    #[test]
    fn test_non_hex_signature_fails_closed() {
        assert!(!verify(SECRET, "order_abc", "pay_xyz", "not-hex-at-all"));
        assert!(!verify(SECRET, "order_abc", "pay_xyz", ""));
    }
}
