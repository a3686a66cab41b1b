//! # Hashing Utilities
//!
//! VERA uses a single hash function: **SHA-256**, rendered as lowercase
//! hex. The original deployment chained its blocks with SHA-256 hex
//! digests, and every archived export embeds them, so compatibility pins
//! the choice. SHA-256 is also perfectly adequate here — block hashing is
//! nowhere near the hot path of a system that seals two ballots at a time.
//!
//! Digests are returned as `String` rather than `[u8; 32]` because the
//! chain stores, compares, links, and exports hex strings end to end.
//! Converting at every boundary would buy nothing but conversions.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input and return it as lowercase hex.
///
/// # Example
///
/// ```
/// use vera_ledger::crypto::sha256_hex;
///
/// let digest = sha256_hex(b"vera");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeds each part sequentially into one hasher. Identical to hashing the
/// concatenation, minus the temporary buffer. This is how block digests
/// are assembled from `(index, created_at, entries, previous_hash)`.
pub fn sha256_hex_multi(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HASH_HEX_LENGTH;

    #[test]
    fn sha256_known_vector() {
        // SHA-256 of the empty string — the canonical test vector.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_deterministic() {
        let a = sha256_hex(b"ballot");
        let b = sha256_hex(b"ballot");
        assert_eq!(a, b);
        assert_eq!(a.len(), HASH_HEX_LENGTH);
    }

    #[test]
    fn sha256_output_is_lowercase_hex() {
        let digest = sha256_hex(b"case check");
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn multi_matches_concatenation() {
        // update()-in-parts must equal one-shot hashing of the whole.
        let multi = sha256_hex_multi(&[b"hello", b" ", b"world"]);
        let single = sha256_hex(b"hello world");
        assert_eq!(multi, single);
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(sha256_hex(b"vera"), sha256_hex(b"Vera"));
    }
}
