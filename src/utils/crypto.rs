// src/utils/crypto.rs
//! Document fingerprinting.
//!
//! Uses SHA-256 (via `ring`) so identical uploads can be recognised no
//! matter which file name they were submitted under.

use ring::digest::{digest, SHA256};

/// Computes the SHA-256 digest of `data`.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest(&SHA256, data).as_ref());
    out
}

/// Lowercase hex SHA-256 of `data`.
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(hash_data(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_of_empty_input() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_differs_per_content() {
        assert_ne!(fingerprint(b"%PDF-1.7 a"), fingerprint(b"%PDF-1.7 b"));
        assert_eq!(fingerprint(b"same"), fingerprint(b"same"));
    }
}
