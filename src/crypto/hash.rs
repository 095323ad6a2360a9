//! Cryptographic hashing utilities for the ledger
//!
//! Provides the SHA-256 based hashing functions used for block digests
//! and the proof-of-work difficulty predicate.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Checks if a hex-encoded hash meets the difficulty target.
/// The first `difficulty` hex digits of the hash must all be `'0'`.
/// A zero-length target is satisfied by any hash.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    hash.bytes().take(difficulty as usize).all(|b| b == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_meets_difficulty() {
        let hash = "000fab34".repeat(8);
        assert!(meets_difficulty(&hash, 0));
        assert!(meets_difficulty(&hash, 2));
        assert!(meets_difficulty(&hash, 3));
        assert!(!meets_difficulty(&hash, 4));
    }

    #[test]
    fn test_zero_difficulty_always_satisfied() {
        assert!(meets_difficulty("ffff", 0));
        assert!(meets_difficulty("", 0));
    }
}
