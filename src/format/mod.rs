//! File format handling for the vault container.
//!
//! Provides version-aware parsing and serialization of the vault file format.

use crate::Vault;
use crate::error::{Result, VaultError};

pub mod v1;

/// Magic bytes identifying a pv vault file ("PVLT").
pub const MAGIC: &[u8; 4] = b"PVLT";
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 4;
/// Length of version field.
pub const VER_LEN: usize = 1;
/// Latest format version
pub const CURRENT_VERSION: u8 = v1::VERSION_V1;

/// Parses a vault file.
///
/// Automatically dispatches to the appropriate version parser.
///
/// # Errors
///
/// Returns [`VaultError::MalformedVault`] if:
/// - The file is too short
/// - The magic bytes are invalid
/// - The version is unsupported
/// - The version-specific body is invalid
pub fn parse(data: &[u8]) -> Result<Vault> {
    if data.len() < MAGIC_LEN + VER_LEN {
        return Err(malformed("file too short"));
    }

    if &data[..MAGIC_LEN] != MAGIC {
        return Err(malformed("invalid magic"));
    }

    let version = data[MAGIC_LEN];

    match version {
        v1::VERSION_V1 => v1::parse(&data[MAGIC_LEN + VER_LEN..]),
        other => Err(malformed(&format!("unsupported version {other}"))),
    }
}

/// Serializes a vault to bytes in its own format version.
///
/// # Errors
///
/// Returns [`VaultError::Serialization`] if the version is unsupported.
pub fn serialize(vault: &Vault) -> Result<Vec<u8>> {
    let body = match vault.version() {
        v1::VERSION_V1 => v1::serialize(vault)?,
        other => {
            return Err(VaultError::Serialization(format!(
                "unsupported version {other}"
            )));
        }
    };

    let mut buf = Vec::with_capacity(MAGIC_LEN + VER_LEN + body.len());
    buf.extend_from_slice(MAGIC);
    buf.push(vault.version());
    buf.extend_from_slice(&body);

    Ok(buf)
}

fn malformed(reason: &str) -> VaultError {
    VaultError::MalformedVault(reason.to_string())
}
