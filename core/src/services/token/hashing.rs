//! Refresh token fingerprinting

use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

/// SHA-256 of the full token string, lowercase hex
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare two hex digests without leaking where they differ
pub fn hashes_match(stored: &str, presented: &str) -> bool {
    constant_time_eq(stored.as_bytes(), presented.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hashes_match() {
        let digest = hash_token("token");
        assert!(hashes_match(&digest, &hash_token("token")));
        assert!(!hashes_match(&digest, &hash_token("token2")));
        assert!(!hashes_match(&digest, ""));
    }
}
