//! SHA-256 password digest.

use sha2::{Digest, Sha256};

use super::traits::PasswordEncryptor;

/// One-way password transform producing a lowercase hex SHA-256 digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestEncryptor;

impl PasswordEncryptor for DigestEncryptor {
    fn encrypt(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }
}
