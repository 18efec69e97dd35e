//! A storage adapter which logs store method calls.

use std::sync::Arc;

use itertools::Itertools;

use crate::storage::{
    Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
    StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
};

#[cfg(feature = "async")]
use crate::storage::{
    AsyncListableStorageTraits, AsyncReadableStorageTraits, AsyncWritableStorageTraits,
};

/// The usage log storage adapter. Logs store method calls with the [`log`] crate.
///
/// It is intended to aid in debugging and optimising performance by revealing storage access patterns.
///
/// ### Example
/// ```rust
/// # use std::sync::Arc;
/// # use zarrs_core::storage::store::MemoryStore;
/// # use zarrs_core::storage::storage_adapter::UsageLogStorageAdapter;
/// let store = Arc::new(MemoryStore::new());
/// let store = Arc::new(UsageLogStorageAdapter::new(store, log::Level::Info));
/// ```
///
/// Applying hierarchy and array methods through the above adapter logs records like:
/// ```text
/// get(zarr.json) -> len=Ok(Some(195))
/// get(meta/root/group/array.array.json) -> len=Ok(Some(298))
/// set(data/root/group/array/c1/0, len=140) -> Ok(())
/// get(data/root/group/array/c0/0) -> len=Ok(None)
/// list_dir(meta/root/group/) -> (keys:[meta/root/group/array.array.json], prefixes:[])
/// ```
pub struct UsageLogStorageAdapter<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    level: log::Level,
}

impl<TStorage: ?Sized> core::fmt::Debug for UsageLogStorageAdapter<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "usage log ({})", self.level)
    }
}

impl<TStorage: ?Sized> UsageLogStorageAdapter<TStorage> {
    /// Create a new usage log storage adapter which logs calls to `storage` at `level`.
    pub fn new(storage: Arc<TStorage>, level: log::Level) -> Self {
        Self { storage, level }
    }

    /// Returns the log level.
    #[must_use]
    pub const fn level(&self) -> log::Level {
        self.level
    }
}

fn format_keys(result: &Result<StoreKeys, StorageError>) -> String {
    result
        .as_ref()
        .map_or_else(ToString::to_string, |keys| keys.iter().format(", ").to_string())
}

fn format_keys_prefixes(result: &Result<StoreKeysPrefixes, StorageError>) -> String {
    result.as_ref().map_or_else(ToString::to_string, |skp| {
        format!(
            "(keys:[{}], prefixes:[{}])",
            skp.keys().iter().format(", "),
            skp.prefixes().iter().format(", ")
        )
    })
}

impl<TStorage: ?Sized + ReadableStorageTraits> ReadableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let result = self.storage.get(key);
        log::log!(
            self.level,
            "get({key}) -> len={:?}",
            result.as_ref().map(|v| v.as_ref().map(Bytes::len))
        );
        result
    }
}

impl<TStorage: ?Sized + ListableStorageTraits> ListableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn list(&self) -> Result<StoreKeys, StorageError> {
        let result = self.storage.list();
        log::log!(self.level, "list() -> [{}]", format_keys(&result));
        result
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let result = self.storage.list_prefix(prefix);
        log::log!(
            self.level,
            "list_prefix({prefix}) -> [{}]",
            format_keys(&result)
        );
        result
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let result = self.storage.list_dir(prefix);
        log::log!(
            self.level,
            "list_dir({prefix}) -> {}",
            format_keys_prefixes(&result)
        );
        result
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> WritableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        let len = value.len();
        let result = self.storage.set(key, value);
        log::log!(self.level, "set({key}, len={len}) -> {result:?}");
        result
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        let result = self.storage.erase(key);
        log::log!(self.level, "erase({key}) -> {result:?}");
        result
    }

    fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        let result = self.storage.erase_values(keys);
        log::log!(
            self.level,
            "erase_values([{}]) -> {result:?}",
            keys.iter().format(", ")
        );
        result
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        let result = self.storage.erase_prefix(prefix);
        log::log!(self.level, "erase_prefix({prefix}) -> {result:?}");
        result
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl<TStorage: ?Sized + AsyncReadableStorageTraits> AsyncReadableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    async fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let result = self.storage.get(key).await;
        log::log!(
            self.level,
            "get({key}) -> len={:?}",
            result.as_ref().map(|v| v.as_ref().map(Bytes::len))
        );
        result
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl<TStorage: ?Sized + AsyncListableStorageTraits> AsyncListableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    async fn list(&self) -> Result<StoreKeys, StorageError> {
        let result = self.storage.list().await;
        log::log!(self.level, "list() -> [{}]", format_keys(&result));
        result
    }

    async fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let result = self.storage.list_prefix(prefix).await;
        log::log!(
            self.level,
            "list_prefix({prefix}) -> [{}]",
            format_keys(&result)
        );
        result
    }

    async fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let result = self.storage.list_dir(prefix).await;
        log::log!(
            self.level,
            "list_dir({prefix}) -> {}",
            format_keys_prefixes(&result)
        );
        result
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl<TStorage: ?Sized + AsyncWritableStorageTraits> AsyncWritableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    async fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        let len = value.len();
        let result = self.storage.set(key, value).await;
        log::log!(self.level, "set({key}, len={len}) -> {result:?}");
        result
    }

    async fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        let result = self.storage.erase(key).await;
        log::log!(self.level, "erase({key}) -> {result:?}");
        result
    }

    async fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        let result = self.storage.erase_prefix(prefix).await;
        log::log!(self.level, "erase_prefix({prefix}) -> {result:?}");
        result
    }
}
