//! Write-only password digests
//!
//! A `PasswordHash` can be created from a plaintext credential and checked
//! against a candidate, nothing else: no accessor, no serialization, and a
//! redacted `Debug`. Digest is SHA-256 over a random per-account salt plus
//! the plaintext, hex-encoded.

use std::fmt;

use rand::{distributions::Alphanumeric, Rng, RngCore};
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Salted password digest. Write-only by construction.
#[derive(Clone)]
pub struct PasswordHash {
    salt: [u8; SALT_LEN],
    digest: [u8; 32],
}

impl PasswordHash {
    /// Hash a plaintext credential with a fresh random salt.
    pub fn new(plaintext: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = Self::digest_with(&salt, plaintext);
        Self { salt, digest }
    }

    /// Check a candidate credential against the stored digest.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate_digest = Self::digest_with(&self.salt, candidate);
        // Byte-wise comparison over fixed-length digests
        let mut diff = 0u8;
        for (a, b) in self.digest.iter().zip(candidate_digest.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }

    fn digest_with(salt: &[u8], plaintext: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(plaintext.as_bytes());
        hasher.finalize().into()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Salt is harmless to show; the digest is not
        write!(f, "PasswordHash(salt={}, digest=<redacted>)", hex::encode(self.salt))
    }
}

/// Random 10-character alphanumeric password, used by the reset endpoint.
pub fn temp_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

/// Random 6-digit verification code.
pub fn verification_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_original() {
        let hash = PasswordHash::new("senha123");
        assert!(hash.verify("senha123"));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = PasswordHash::new("senha123");
        assert!(!hash.verify("senha124"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = PasswordHash::new("senha123");
        let b = PasswordHash::new("senha123");
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_debug_redacts_digest() {
        let hash = PasswordHash::new("secret");
        let dbg = format!("{:?}", hash);
        assert!(dbg.contains("<redacted>"));
        assert!(!dbg.contains(&hex::encode(hash.digest)));
    }

    #[test]
    fn test_temp_password_shape() {
        let p = temp_password();
        assert_eq!(p.len(), 10);
        assert!(p.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(temp_password(), temp_password());
    }

    #[test]
    fn test_verification_code_shape() {
        let code = verification_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
