//! Pluggable verification of wipe confirmation codes.
//!
//! The command controller never sees how the secret is configured; it
//! forwards the opaque code and trusts the boolean verdict.

use shared::crypto::{sha256_hex, verify_code_digest};

/// Collaborator that decides whether a confirmation code authorizes a
/// destructive command.
pub trait SecretVerifier: Send + Sync {
    fn verify(&self, code: &str) -> bool;
}

/// Verifier backed by the SHA-256 digest of a configured secret.
///
/// Only the digest is retained, and comparison is constant-work over the
/// fixed-length digests.
pub struct Sha256SecretVerifier {
    digest_hex: String,
}

impl Sha256SecretVerifier {
    /// Builds a verifier from the plaintext secret.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            digest_hex: sha256_hex(secret),
        }
    }

    /// Builds a verifier from an already-hashed secret (hex SHA-256).
    pub fn from_digest_hex(digest_hex: impl Into<String>) -> Self {
        Self {
            digest_hex: digest_hex.into(),
        }
    }
}

impl SecretVerifier for Sha256SecretVerifier {
    fn verify(&self, code: &str) -> bool {
        verify_code_digest(code, &self.digest_hex)
    }
}
