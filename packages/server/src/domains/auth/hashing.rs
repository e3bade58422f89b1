use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// SHA-256 of a secret (OTP code or bearer token), hex encoded.
///
/// Secrets are only ever stored and looked up by this digest.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compare a submitted secret against a stored digest in constant time.
pub fn matches_digest(submitted: &str, stored_digest: &str) -> bool {
    let submitted_digest = hash_secret(submitted);
    submitted_digest
        .as_bytes()
        .ct_eq(stored_digest.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let digest = hash_secret("123456");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, hash_secret("123456"));
        assert_ne!(digest, hash_secret("123457"));
    }

    #[test]
    fn test_matches_digest() {
        let stored = hash_secret("654321");
        assert!(matches_digest("654321", &stored));
        assert!(!matches_digest("654320", &stored));
        assert!(!matches_digest("", &stored));
    }
}
