use derive_more::{Display, From};
use thiserror::Error;

use super::StorePrefix;

/// A store key.
///
/// A key is a non-empty string that neither starts nor ends with `/`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct StoreKey(String);

/// An invalid store key.
#[derive(Debug, From, Error)]
#[error("invalid store key {0}")]
pub struct StoreKeyError(String);

/// A list of [`StoreKey`].
pub type StoreKeys = Vec<StoreKey>;

impl StoreKey {
    /// Create a new store key from `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreKeyError`] if `key` is not valid according to [`StoreKey::validate()`].
    pub fn new(key: impl Into<String>) -> Result<Self, StoreKeyError> {
        let key = key.into();
        if Self::validate(&key) {
            Ok(Self(key))
        } else {
            Err(StoreKeyError(key))
        }
    }

    /// Create a new store key from `key` without validation.
    ///
    /// # Safety
    ///
    /// `key` is not validated, so this can result in an invalid store key.
    #[must_use]
    pub unsafe fn new_unchecked(key: impl Into<String>) -> Self {
        let key = key.into();
        debug_assert!(Self::validate(&key));
        Self(key)
    }

    /// Extracts a string slice of the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates a key: it must be non-empty and must not start or end with `/`.
    #[must_use]
    pub fn validate(key: &str) -> bool {
        !key.is_empty() && !key.starts_with('/') && !key.ends_with('/')
    }

    /// Returns true if the key has prefix `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &StorePrefix) -> bool {
        self.0.starts_with(prefix.as_str())
    }

    /// Returns the key relative to `prefix`, or [`None`] if the key is not under `prefix`.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &StorePrefix) -> Option<&str> {
        self.0.strip_prefix(prefix.as_str())
    }

    /// Returns the prefix of the directory holding this key.
    #[must_use]
    pub fn parent(&self) -> StorePrefix {
        self.0.rsplit_once('/').map_or_else(StorePrefix::root, |(parent, _)| unsafe {
            StorePrefix::new_unchecked(format!("{parent}/"))
        })
    }
}

impl TryFrom<&str> for StoreKey {
    type Error = StoreKeyError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_key() {
        assert!(StoreKey::new("a").is_ok());
        assert_eq!(StoreKey::new("a").unwrap().to_string(), "a");
        assert!(StoreKey::new("").is_err());
        assert!(StoreKey::new("a/").is_err());
        assert_eq!(
            StoreKey::new("a/").unwrap_err().to_string(),
            "invalid store key a/"
        );
        assert!(StoreKey::new("/a").is_err());
    }

    #[test]
    fn store_key_parent() {
        assert_eq!(
            StoreKey::new("meta/root/a.array.json").unwrap().parent(),
            StorePrefix::new("meta/root/").unwrap()
        );
        assert_eq!(
            StoreKey::new("zarr.json").unwrap().parent(),
            StorePrefix::root()
        );
    }

    #[test]
    fn store_key_strip_prefix() {
        let key = StoreKey::new("meta/root/a/b.group.json").unwrap();
        let prefix = StorePrefix::new("meta/root/").unwrap();
        assert!(key.has_prefix(&prefix));
        assert_eq!(key.strip_prefix(&prefix), Some("a/b.group.json"));
        assert_eq!(key.strip_prefix(&StorePrefix::new("data/").unwrap()), None);
    }
}
