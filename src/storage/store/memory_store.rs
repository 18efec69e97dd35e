//! An in-memory store.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::storage::{
    Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
    StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
};

#[cfg(feature = "async")]
use crate::storage::{
    AsyncListableStorageTraits, AsyncReadableStorageTraits, AsyncWritableStorageTraits,
};

/// An in-memory store.
///
/// Values are reference counted, so a [`get`](ReadableStorageTraits::get) does not copy the stored bytes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data_map: RwLock<BTreeMap<StoreKey, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get_impl(&self, key: &StoreKey) -> MaybeBytes {
        self.data_map.read().get(key).cloned()
    }

    fn set_impl(&self, key: &StoreKey, value: Bytes) {
        self.data_map.write().insert(key.clone(), value);
    }

    fn erase_impl(&self, key: &StoreKey) {
        self.data_map.write().remove(key);
    }

    fn erase_prefix_impl(&self, prefix: &StorePrefix) {
        self.data_map.write().retain(|key, _| !key.has_prefix(prefix));
    }

    fn list_prefix_impl(&self, prefix: &StorePrefix) -> StoreKeys {
        self.data_map
            .read()
            .keys()
            .filter(|key| key.has_prefix(prefix))
            .cloned()
            .collect()
    }

    fn list_dir_impl(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let mut keys: StoreKeys = vec![];
        let mut prefixes: BTreeSet<StorePrefix> = BTreeSet::default();
        let data_map = self.data_map.read();
        for key in data_map.keys() {
            if let Some(key_strip) = key.strip_prefix(prefix) {
                if let Some((child, _)) = key_strip.split_once('/') {
                    prefixes.insert(StorePrefix::new(format!("{}{child}/", prefix.as_str()))?);
                } else {
                    keys.push(key.clone());
                }
            }
        }
        Ok(StoreKeysPrefixes::new(keys, prefixes.into_iter().collect()))
    }
}

impl ReadableStorageTraits for MemoryStore {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        Ok(self.get_impl(key))
    }
}

impl WritableStorageTraits for MemoryStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.set_impl(key, value);
        Ok(())
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        self.erase_impl(key);
        Ok(())
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        self.erase_prefix_impl(prefix);
        Ok(())
    }
}

impl ListableStorageTraits for MemoryStore {
    fn list(&self) -> Result<StoreKeys, StorageError> {
        Ok(self.data_map.read().keys().cloned().collect())
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        Ok(self.list_prefix_impl(prefix))
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        self.list_dir_impl(prefix)
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl AsyncReadableStorageTraits for MemoryStore {
    async fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        Ok(self.get_impl(key))
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl AsyncWritableStorageTraits for MemoryStore {
    async fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.set_impl(key, value);
        Ok(())
    }

    async fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        self.erase_impl(key);
        Ok(())
    }

    async fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        self.erase_prefix_impl(prefix);
        Ok(())
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl AsyncListableStorageTraits for MemoryStore {
    async fn list(&self) -> Result<StoreKeys, StorageError> {
        Ok(self.data_map.read().keys().cloned().collect())
    }

    async fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        Ok(self.list_prefix_impl(prefix))
    }

    async fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        self.list_dir_impl(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn memory() -> Result<(), Box<dyn Error>> {
        let store = MemoryStore::new();
        super::super::test_util::store_write(&store)?;
        super::super::test_util::store_read(&store)?;
        super::super::test_util::store_list(&store)?;
        Ok(())
    }

    #[test]
    fn memory_concurrent_set() -> Result<(), Box<dyn Error>> {
        use rayon::prelude::*;

        let store = MemoryStore::new();
        (0..16u8).into_par_iter().try_for_each(|i| {
            WritableStorageTraits::set(
                &store,
                &StoreKey::new(format!("data/root/c{i}"))?,
                vec![i].into(),
            )
        })?;
        assert_eq!(
            ListableStorageTraits::list_prefix(&store, &"data/root/".try_into()?)?.len(),
            16
        );
        assert_eq!(
            ReadableStorageTraits::get(&store, &"data/root/c7".try_into()?)?,
            Some(vec![7].into())
        );
        Ok(())
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn memory_async() -> Result<(), Box<dyn Error>> {
        let store = MemoryStore::new();
        let key: StoreKey = "meta/root/a.array.json".try_into()?;
        AsyncWritableStorageTraits::set(&store, &key, vec![0, 1, 2].into()).await?;
        assert_eq!(
            AsyncReadableStorageTraits::get(&store, &key).await?,
            Some(vec![0, 1, 2].into())
        );
        let list_dir = AsyncListableStorageTraits::list_dir(&store, &"meta/".try_into()?).await?;
        assert_eq!(list_dir.prefixes(), &["meta/root/".try_into()?]);
        AsyncWritableStorageTraits::erase_prefix(&store, &"meta/".try_into()?).await?;
        assert!(AsyncListableStorageTraits::list(&store).await?.is_empty());
        Ok(())
    }
}
