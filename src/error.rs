use thiserror::Error;

/// Errors returned by the vault engine.
///
/// No variant ever carries password, key or plaintext bytes.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("invalid KDF parameters: {0}")]
    InvalidParameters(String),

    /// Wrong master password or a corrupted entry. The two cases are
    /// deliberately reported the same way.
    #[error("authentication failed: wrong password or corrupted data")]
    AuthenticationFailed,

    #[error("secret '{0}' not found")]
    SecretNotFound(String),

    #[error("malformed vault: {0}")]
    MalformedVault(String),

    #[error("failed to encode vault: {0}")]
    Serialization(String),

    #[error("OS random generator unavailable")]
    Random,

    #[error("encryption failed")]
    Encryption,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
