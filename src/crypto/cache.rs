//! Short-lived cache of derived keys.
//!
//! A CLI invocation that performs several operations on the same vault can
//! hold one `KeyCache` so the Argon2 cost is paid once per password. The
//! cache is owned by the caller, never shared across invocations, and wipes
//! its contents on [`KeyCache::clear`] and on drop.

use sha2::{Digest, Sha256};
use tracing::trace;
use zeroize::Zeroize;

use super::{DerivedKey, KdfParams, SALT_LEN, derive_key};
use crate::error::{Result, VaultError};

struct CachedKey {
    salt: [u8; SALT_LEN],
    kdf: KdfParams,
    password_hash: [u8; 32],
    key: DerivedKey,
}

impl Drop for CachedKey {
    fn drop(&mut self) {
        self.password_hash.zeroize();
    }
}

#[derive(Default)]
pub struct KeyCache {
    entries: Vec<CachedKey>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the key for `(password, salt, kdf)`, deriving it on first use.
    pub fn derive(&mut self, password: &[u8], salt: &[u8], kdf: KdfParams) -> Result<DerivedKey> {
        let salt: [u8; SALT_LEN] = salt
            .try_into()
            .map_err(|_| VaultError::InvalidParameters(format!("salt must be {SALT_LEN} bytes")))?;

        let mut password_hash: [u8; 32] = Sha256::digest(password).into();

        if let Some(hit) = self
            .entries
            .iter()
            .find(|c| c.salt == salt && c.kdf == kdf && c.password_hash == password_hash)
        {
            password_hash.zeroize();
            trace!("derived key served from cache");
            return Ok(hit.key.clone());
        }

        let key = match derive_key(password, &salt, kdf) {
            Ok(key) => key,
            Err(e) => {
                password_hash.zeroize();
                return Err(e);
            }
        };

        self.entries.push(CachedKey {
            salt,
            kdf,
            password_hash,
            key: key.clone(),
        });
        password_hash.zeroize();

        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops and wipes every cached key.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
