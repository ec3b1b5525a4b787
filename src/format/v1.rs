//! File format v1 for the vault container.
//!
//! V1 File Format:
//! ```text
//! MAGIC (4) | VERSION (1) | JSON BODY
//! ```
//!
//! The JSON body holds the salt, the KDF parameters and the secrets in
//! insertion order. Byte strings are base64 encoded:
//!
//! ```text
//! {
//!   "salt": "...",
//!   "kdf": { "memory_cost": 65536, "iterations": 3, "parallelism": 1 },
//!   "secrets": { "api": { "nonce": "...", "ciphertext": "..." } }
//! }
//! ```

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Vault;
use crate::crypto::{KdfParams, SALT_LEN, SecretEntry};
use crate::error::{Result, VaultError};
use crate::store::Store;

/// Current file format version.
pub const VERSION_V1: u8 = 1;

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Body {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    salt: Vec<u8>,
    kdf: KdfBody,
    #[serde(deserialize_with = "unique_names")]
    secrets: IndexMap<String, EntryBody>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct KdfBody {
    memory_cost: u32,
    iterations: u32,
    parallelism: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryBody {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    nonce: Vec<u8>,
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    ciphertext: Vec<u8>,
}

/// Parses a v1 body (everything after the magic and version byte).
///
/// # Errors
///
/// Returns [`VaultError::MalformedVault`] for invalid JSON, missing or
/// unknown fields, bad base64, wrong salt/nonce lengths, truncated
/// ciphertexts or stored KDF parameters that fail validation.
pub fn parse(data: &[u8]) -> Result<Vault> {
    let body: Body = serde_json::from_slice(data)
        .map_err(|e| VaultError::MalformedVault(format!("v1 body: {e}")))?;

    let salt: [u8; SALT_LEN] = body.salt.as_slice().try_into().map_err(|_| {
        VaultError::MalformedVault(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            body.salt.len()
        ))
    })?;

    let kdf = KdfParams::new(
        body.kdf.memory_cost,
        body.kdf.iterations,
        body.kdf.parallelism,
    )
    .map_err(|e| VaultError::MalformedVault(format!("stored KDF parameters: {e}")))?;

    let secrets = body
        .secrets
        .into_iter()
        .map(|(name, entry)| {
            SecretEntry::from_parts(&entry.nonce, entry.ciphertext)
                .map(|e| (name.clone(), e))
                .map_err(|e| match e {
                    VaultError::MalformedVault(reason) => {
                        VaultError::MalformedVault(format!("entry '{name}': {reason}"))
                    }
                    other => other,
                })
        })
        .collect::<Result<Store>>()?;

    Ok(Vault::from_parts(VERSION_V1, salt, kdf, secrets))
}

/// Serializes a vault to a v1 body.
///
/// # Errors
///
/// Returns [`VaultError::Serialization`] if the vault is not a v1 vault.
pub fn serialize(vault: &Vault) -> Result<Vec<u8>> {
    if vault.version() != VERSION_V1 {
        return Err(VaultError::Serialization(
            "wrong version for v1 serializer".to_string(),
        ));
    }

    let body = Body {
        salt: vault.salt().to_vec(),
        kdf: KdfBody {
            memory_cost: vault.kdf().memory_cost_kib(),
            iterations: vault.kdf().iterations(),
            parallelism: vault.kdf().parallelism(),
        },
        secrets: vault
            .entries()
            .map(|(name, entry)| {
                (
                    name.to_string(),
                    EntryBody {
                        nonce: entry.nonce().to_vec(),
                        ciphertext: entry.ciphertext().to_vec(),
                    },
                )
            })
            .collect(),
    };

    serde_json::to_vec_pretty(&body)
        .map_err(|e| VaultError::Serialization(format!("v1 body: {e}")))
}

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

/// Deserializes the secrets map, rejecting names that appear twice.
fn unique_names<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, EntryBody>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueNames;

    impl<'de> Visitor<'de> for UniqueNames {
        type Value = IndexMap<String, EntryBody>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of secret names to entries")
        }

        fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, entry)) = access.next_entry::<String, EntryBody>()? {
                if map.contains_key(&name) {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate secret name '{name}'"
                    )));
                }
                map.insert(name, entry);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueNames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> Result<Vault> {
        parse(json.as_bytes())
    }

    const SALT: &str = "AAAAAAAAAAAAAAAAAAAAAA=="; // 16 zero bytes
    const NONCE: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"; // 24 zero bytes
    const CT: &str = "AAAAAAAAAAAAAAAAAAAAAA=="; // 16 zero bytes

    fn valid_json() -> String {
        format!(
            r#"{{"salt":"{SALT}","kdf":{{"memory_cost":1024,"iterations":1,"parallelism":1}},"secrets":{{"b":{{"nonce":"{NONCE}","ciphertext":"{CT}"}},"a":{{"nonce":"{NONCE}","ciphertext":"{CT}"}}}}}}"#
        )
    }

    #[test]
    fn parses_valid_body_in_file_order() {
        let vault = body(&valid_json()).unwrap();

        assert_eq!(vault.version(), VERSION_V1);
        assert_eq!(vault.salt(), &[0u8; SALT_LEN]);
        assert_eq!(vault.kdf().memory_cost_kib(), 1024);
        assert_eq!(vault.list(), ["b", "a"]);
    }

    #[test]
    fn serialize_then_parse_preserves_vault() {
        let vault = body(&valid_json()).unwrap();
        let bytes = serialize(&vault).unwrap();
        assert_eq!(parse(&bytes).unwrap(), vault);
    }

    #[test]
    fn missing_field_is_malformed() {
        let json = format!(r#"{{"salt":"{SALT}","secrets":{{}}}}"#);
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn unknown_field_is_malformed() {
        let json = valid_json().replacen('{', r#"{"extra":1,"#, 1);
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn short_nonce_is_malformed() {
        let json = valid_json().replace(NONCE, "AAAAAAAAAAAAAAAA"); // 12 bytes
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn short_salt_is_malformed() {
        let json = valid_json().replacen(SALT, "AAAAAAAAAAA=", 1); // 8 bytes
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let json = valid_json().replace(CT, "not base64!");
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn invalid_stored_kdf_is_malformed() {
        let json = valid_json().replace(r#""iterations":1"#, r#""iterations":0"#);
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn oversized_stored_memory_cost_is_malformed() {
        let json = valid_json().replace(r#""memory_cost":1024"#, r#""memory_cost":4294967295"#);
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn bad_entry_reason_is_not_wrapped_twice() {
        let json = valid_json().replacen(NONCE, "AAAAAAAAAAAAAAAA", 1);
        let msg = body(&json).unwrap_err().to_string();

        assert!(msg.starts_with("malformed vault: entry 'b': "));
        assert_eq!(msg.matches("malformed vault").count(), 1);
    }

    #[test]
    fn serializing_foreign_version_is_an_encoding_error() {
        let vault = Vault::from_parts(2, [0u8; SALT_LEN], KdfParams::default(), Store::new());
        assert!(matches!(
            serialize(&vault),
            Err(VaultError::Serialization(_))
        ));
    }

    #[test]
    fn duplicate_names_are_malformed() {
        let json = valid_json().replace(r#""a":"#, r#""b":"#);
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        let json = format!("{}xyz", valid_json());
        assert!(matches!(body(&json), Err(VaultError::MalformedVault(_))));
    }

    #[test]
    fn truncated_body_is_malformed() {
        let json = valid_json();
        let cut = &json[..json.len() / 2];
        assert!(matches!(body(cut), Err(VaultError::MalformedVault(_))));
    }
}
