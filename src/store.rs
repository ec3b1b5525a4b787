use crate::crypto::SecretEntry;
use crate::error::VaultError;
use indexmap::IndexMap;

/// Insertion-ordered table of encrypted secrets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Store {
    secrets: IndexMap<String, SecretEntry>,
}

impl Store {
    pub fn new() -> Self {
        Store {
            secrets: IndexMap::new(),
        }
    }

    /// Inserts or replaces. A replaced name keeps its original position.
    pub fn set(&mut self, name: &str, entry: SecretEntry) -> Option<SecretEntry> {
        self.secrets.insert(name.to_string(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&SecretEntry> {
        self.secrets.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Result<(), VaultError> {
        if self.secrets.shift_remove(name).is_some() {
            Ok(())
        } else {
            Err(VaultError::SecretNotFound(name.to_string()))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.secrets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.secrets.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &SecretEntry)> {
        self.secrets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn first(&self) -> Option<(&str, &SecretEntry)> {
        self.secrets.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl FromIterator<(String, SecretEntry)> for Store {
    fn from_iter<I: IntoIterator<Item = (String, SecretEntry)>>(iter: I) -> Self {
        Store {
            secrets: iter.into_iter().collect(),
        }
    }
}
