use argon2::{Algorithm, Argon2, Params, Version};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{KEY_LEN, SALT_LEN, secure_random};
use crate::error::{Result, VaultError};

/// Argon2id cost parameters, fixed at vault creation and stored with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KdfParams {
    memory_cost_kib: u32,
    iterations: u32,
    parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            // default memory cost
            memory_cost_kib: 64 * 1024, // 64 MiB
            // default number of iterations
            iterations: 3,
            // default number of lanes
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Largest accepted memory cost: 4 GiB, in KiB.
    pub const MAX_MEMORY_COST_KIB: u32 = 4 * 1024 * 1024;

    pub fn new(memory_cost_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Self {
            memory_cost_kib,
            iterations,
            parallelism,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn memory_cost_kib(&self) -> u32 {
        self.memory_cost_kib
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    /// Checks the parameters against the Argon2 minimums and
    /// [`KdfParams::MAX_MEMORY_COST_KIB`]. Values are never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.iterations < Params::MIN_T_COST {
            return Err(invalid("iterations must be >= 1"));
        }
        if self.parallelism < Params::MIN_P_COST {
            return Err(invalid("parallelism must be >= 1"));
        }
        if self.memory_cost_kib < Params::MIN_M_COST {
            return Err(invalid("memory cost too low"));
        }
        if self.memory_cost_kib > Self::MAX_MEMORY_COST_KIB {
            return Err(invalid("memory cost above 4 GiB"));
        }
        if u64::from(self.memory_cost_kib) < 8 * u64::from(self.parallelism) {
            return Err(invalid("memory cost must be at least 8 * parallelism KiB"));
        }
        self.argon2_params().map(|_| ())
    }

    fn argon2_params(&self) -> Result<Params> {
        Params::new(
            self.memory_cost_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| VaultError::InvalidParameters(format!("argon2 rejected parameters: {e}")))
    }
}

fn invalid(reason: &str) -> VaultError {
    VaultError::InvalidParameters(reason.to_string())
}

/// Sparse KDF overrides, resolved against [`KdfParams::default`].
///
/// Each field left as `None` keeps the default value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KdfConfig {
    /// Argon2 memory cost in KiB. Must be at least 8 × `parallelism` and at
    /// most 4 GiB.
    /// Default 65536 (64 MiB).
    pub memory_cost_kib: Option<u32>,
    /// Argon2 pass count. Must be >= 1. Default 3.
    pub iterations: Option<u32>,
    /// Argon2 lane count; also the number of threads used while deriving.
    /// Must be between 1 and 2^24 - 1. Default 1.
    pub parallelism: Option<u32>,
}

impl KdfConfig {
    /// Merges the overrides with the defaults and validates the result.
    pub fn resolve(self) -> Result<KdfParams> {
        let default = KdfParams::default();

        KdfParams::new(
            self.memory_cost_kib.unwrap_or(default.memory_cost_kib()),
            self.iterations.unwrap_or(default.iterations()),
            self.parallelism.unwrap_or(default.parallelism()),
        )
    }
}

/// Key material derived from the master password. Zeroed when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Generate salt
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Derives the vault key with Argon2id. Same inputs always yield the same key.
pub fn derive_key(password: &[u8], salt: &[u8], kdf: KdfParams) -> Result<DerivedKey> {
    kdf.validate()?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, kdf.argon2_params()?);

    let mut key = DerivedKey([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, &mut key.0)
        .map_err(|e| VaultError::InvalidParameters(format!("argon2 key derivation failed: {e}")))?;

    Ok(key)
}
