use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use zeroize::Zeroizing;

use super::{DerivedKey, NONCE_LEN, TAG_LEN, secure_random};
use crate::error::{Result, VaultError};

/// One encrypted secret: its nonce and the ciphertext with the
/// Poly1305 tag appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl SecretEntry {
    /// Rebuilds an entry from stored fields.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::MalformedVault`] if the nonce has the wrong
    /// length or the ciphertext is too short to hold a tag.
    pub fn from_parts(nonce: &[u8], ciphertext: Vec<u8>) -> Result<Self> {
        let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| {
            VaultError::MalformedVault(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                nonce.len()
            ))
        })?;

        if ciphertext.len() < TAG_LEN {
            return Err(VaultError::MalformedVault(format!(
                "ciphertext shorter than the {TAG_LEN}-byte tag"
            )));
        }

        Ok(Self { nonce, ciphertext })
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Ciphertext followed by the authentication tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

/// Encrypt plaintext under a fresh random nonce
pub fn encrypt(key: &DerivedKey, plaintext: &[u8]) -> Result<SecretEntry> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| VaultError::Encryption)?;

    Ok(SecretEntry { nonce, ciphertext })
}

/// Decrypt an entry. A wrong key and a tampered entry fail identically.
pub fn decrypt(key: &DerivedKey, entry: &SecretEntry) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let plaintext = cipher
        .decrypt(XNonce::from_slice(&entry.nonce), entry.ciphertext.as_slice())
        .map_err(|_| VaultError::AuthenticationFailed)?;
    Ok(Zeroizing::new(plaintext))
}
