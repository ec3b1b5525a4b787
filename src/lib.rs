//! Password vault engine.
//!
//! A [`Vault`] holds any number of named secrets, each encrypted with
//! XChaCha20-Poly1305 under a key derived from the master password with
//! Argon2id. The key is derived per operation and wiped afterwards; the
//! password is never stored.
//!
//! ```no_run
//! use pv::{KdfParams, Vault};
//!
//! # fn main() -> pv::Result<()> {
//! let mut vault = Vault::initialize(KdfParams::default())?;
//! vault.store("api", b"sk-123", b"correct horse")?;
//! vault.save("v.dat")?;
//!
//! let vault = Vault::load("v.dat")?;
//! assert_eq!(*vault.read("api", b"correct horse")?, b"sk-123");
//! # Ok(())
//! # }
//! ```

pub mod crypto;
mod error;
pub mod format;
mod storage;
mod store;

pub use crate::crypto::{KdfConfig, KdfParams, KeyCache, SecretEntry};
pub use crate::error::{Result, VaultError};
pub use crate::storage::Storage;

use crate::crypto::{DerivedKey, SALT_LEN};
use crate::store::Store;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

/// In-memory vault container: salt, KDF parameters and the encrypted
/// secrets in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    version: u8,
    salt: [u8; SALT_LEN],
    kdf: KdfParams,
    store: Store,
}

impl Vault {
    /// Creates an empty vault with a fresh random salt.
    ///
    /// No key is derived here, so unlike a password-taking constructor this
    /// needs only the KDF parameters. The master password is first used by
    /// [`Vault::store`] or [`Vault::read`]:
    ///
    /// ```
    /// # fn main() -> pv::Result<()> {
    /// let kdf = pv::KdfParams::new(1024, 1, 1)?;
    /// let mut vault = pv::Vault::initialize(kdf)?;
    /// assert!(vault.is_empty());
    ///
    /// vault.store("api", b"sk-123", b"correct horse")?;
    /// assert_eq!(*vault.read("api", b"correct horse")?, b"sk-123");
    /// # Ok(())
    /// # }
    /// ```
    pub fn initialize(kdf: KdfParams) -> Result<Self> {
        kdf.validate()?;

        Ok(Self {
            version: format::CURRENT_VERSION,
            salt: crypto::generate_salt()?,
            kdf,
            store: Store::new(),
        })
    }

    pub(crate) fn from_parts(
        version: u8,
        salt: [u8; SALT_LEN],
        kdf: KdfParams,
        store: Store,
    ) -> Self {
        Self {
            version,
            salt,
            kdf,
            store,
        }
    }

    /// Reads and parses the vault file at `path`. No password is needed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let storage = Storage::new(path.as_ref());
        let data = storage.load()?;
        let vault = format::parse(&data)?;

        debug!(path = %storage.path().display(), secrets = vault.len(), "vault loaded");
        Ok(vault)
    }

    /// Writes the whole vault to `path` atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let storage = Storage::new(path.as_ref());
        let data = format::serialize(self)?;
        storage.save(&data)?;

        debug!(path = %storage.path().display(), secrets = self.len(), "vault saved");
        Ok(())
    }

    /// Encrypts `plaintext` and stores it under `name`, replacing any
    /// existing entry.
    ///
    /// The password is not checked against existing entries. Storing with a
    /// different password than before leaves the vault with entries under
    /// different keys; callers that care should call
    /// [`Vault::verify_password`] first.
    pub fn store(&mut self, name: &str, plaintext: &[u8], password: &[u8]) -> Result<()> {
        let key = self.derive(password)?;
        self.store_with_key(name, plaintext, &key)
    }

    /// Like [`Vault::store`], reusing keys from `cache`.
    pub fn store_with(
        &mut self,
        cache: &mut KeyCache,
        name: &str,
        plaintext: &[u8],
        password: &[u8],
    ) -> Result<()> {
        let key = cache.derive(password, &self.salt, self.kdf)?;
        self.store_with_key(name, plaintext, &key)
    }

    fn store_with_key(&mut self, name: &str, plaintext: &[u8], key: &DerivedKey) -> Result<()> {
        let entry = crypto::encrypt(key, plaintext)?;
        let replaced = self.store.set(name, entry).is_some();

        debug!(name, replaced, "secret stored");
        Ok(())
    }

    /// Decrypts the secret stored under `name`.
    ///
    /// # Errors
    ///
    /// [`VaultError::SecretNotFound`] if there is no such entry,
    /// [`VaultError::AuthenticationFailed`] for a wrong password or a
    /// corrupted entry.
    pub fn read(&self, name: &str, password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let entry = self.entry_or_not_found(name)?;
        let key = self.derive(password)?;
        crypto::decrypt(&key, entry)
    }

    /// Like [`Vault::read`], reusing keys from `cache`.
    pub fn read_with(
        &self,
        cache: &mut KeyCache,
        name: &str,
        password: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let entry = self.entry_or_not_found(name)?;
        let key = cache.derive(password, &self.salt, self.kdf)?;
        crypto::decrypt(&key, entry)
    }

    /// Removes the secret stored under `name`.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.store.remove(name)?;

        debug!(name, "secret deleted");
        Ok(())
    }

    /// Secret names in insertion order.
    pub fn list(&self) -> Vec<&str> {
        self.store.names().collect()
    }

    /// Checks `password` by decrypting the oldest entry.
    ///
    /// An empty vault accepts any password. This is a guard for callers;
    /// [`Vault::store`] never runs it on its own.
    pub fn verify_password(&self, password: &[u8]) -> Result<()> {
        let Some((name, entry)) = self.store.first() else {
            return Ok(());
        };

        let key = self.derive(password)?;
        crypto::decrypt(&key, entry)?;

        debug!(name, "password verified against existing entry");
        Ok(())
    }

    /// Same check as [`Vault::verify_password`], reusing keys from `cache`.
    pub fn verify_password_with(&self, cache: &mut KeyCache, password: &[u8]) -> Result<()> {
        let Some((_, entry)) = self.store.first() else {
            return Ok(());
        };

        let key = cache.derive(password, &self.salt, self.kdf)?;
        crypto::decrypt(&key, entry).map(|_| ())
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    pub fn entry(&self, name: &str) -> Option<&SecretEntry> {
        self.store.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &SecretEntry)> {
        self.store.entries()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn entry_or_not_found(&self, name: &str) -> Result<&SecretEntry> {
        self.store
            .get(name)
            .ok_or_else(|| VaultError::SecretNotFound(name.to_string()))
    }

    fn derive(&self, password: &[u8]) -> Result<DerivedKey> {
        crypto::derive_key(password, &self.salt, self.kdf)
    }
}
