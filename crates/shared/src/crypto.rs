//! Cryptographic utilities for confirmation-code handling.
//!
//! Confirmation codes authorize destructive device commands (wipe,
//! remote wipe). They are stored and compared only as SHA-256 digests.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a generated confirmation code (192 bits).
const CONFIRMATION_CODE_BYTES: usize = 24;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a random confirmation code (URL-safe base64, no padding).
pub fn generate_confirmation_code() -> String {
    let mut bytes = [0u8; CONFIRMATION_CODE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compares two equal-length byte slices in constant time.
///
/// Returns false immediately on length mismatch; for equal lengths the
/// comparison always touches every byte so match progress does not leak
/// through timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Checks a candidate code against a stored SHA-256 hex digest.
///
/// The candidate is hashed first, so the compared values are always
/// fixed-length digests regardless of attacker-controlled input length.
pub fn verify_code_digest(candidate: &str, expected_digest_hex: &str) -> bool {
    let candidate_digest = sha256_hex(candidate);
    constant_time_eq(candidate_digest.as_bytes(), expected_digest_hex.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty_string() {
        let hash = sha256_hex("");
        assert_eq!(hash.len(), 64);
        // SHA256 of empty string
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        let hash1 = sha256_hex("same_input");
        let hash2 = sha256_hex("same_input");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_generate_confirmation_code_length() {
        let code = generate_confirmation_code();
        // 24 bytes -> 32 base64 chars without padding
        assert_eq!(code.len(), 32);
        assert!(!code.contains('='));
    }

    #[test]
    fn test_generate_confirmation_code_unique() {
        let a = generate_confirmation_code();
        let b = generate_confirmation_code();
        assert_ne!(a, b);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_verify_code_digest_match() {
        let digest = sha256_hex("SECRET-1234");
        assert!(verify_code_digest("SECRET-1234", &digest));
    }

    #[test]
    fn test_verify_code_digest_mismatch() {
        let digest = sha256_hex("SECRET-1234");
        assert!(!verify_code_digest("SECRET-1235", &digest));
        assert!(!verify_code_digest("", &digest));
    }

    #[test]
    fn test_verify_code_digest_rejects_raw_secret_as_digest() {
        // Passing the plaintext where a digest is expected must not match.
        assert!(!verify_code_digest("SECRET-1234", "SECRET-1234"));
    }
}
