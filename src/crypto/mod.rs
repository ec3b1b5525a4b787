//! Cryptographic primitives for the vault.
//!
//! Provides password-based key derivation, per-secret authenticated
//! encryption and an optional per-invocation key cache.

pub mod aead;
pub mod cache;
pub mod kdf;

pub use aead::{SecretEntry, decrypt, encrypt};
pub use cache::KeyCache;
pub use kdf::{DerivedKey, KdfConfig, KdfParams, derive_key, generate_salt};

use crate::error::{Result, VaultError};
use getrandom::fill;

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the nonce (24 bytes for XChaCha20-Poly1305).
pub const NONCE_LEN: usize = 24;
/// Length of the Poly1305 authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;

/// Fill buffer with cryptographically secure random bytes
pub(crate) fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| VaultError::Random)
}
