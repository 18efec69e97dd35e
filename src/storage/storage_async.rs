use serde::{de::DeserializeOwned, Serialize};

use crate::{
    array::ChunkKeySeparator,
    metadata::{ArrayMetadata, EntryPointMetadata, GroupMetadata},
    node::NodePath,
};

use super::{
    data_key, data_prefix, meta_key_array, meta_key_entry_point, meta_key_group, meta_prefix,
    Bytes, MaybeBytes, StorageError, StoreKey, StoreKeys, StoreKeysPrefixes, StorePrefix,
};

/// Async readable storage traits.
#[async_trait::async_trait]
pub trait AsyncReadableStorageTraits: Send + Sync {
    /// Retrieve the value (bytes) associated with a given [`StoreKey`].
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    async fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError>;
}

/// Async listable storage traits.
#[async_trait::async_trait]
pub trait AsyncListableStorageTraits: Send + Sync {
    /// Retrieve all [`StoreKeys`] in the store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    async fn list(&self) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] with a given [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    async fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] and [`StorePrefix`] which are direct children of [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    async fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError>;
}

/// Async writable storage traits.
#[async_trait::async_trait]
pub trait AsyncWritableStorageTraits: Send + Sync {
    /// Store bytes at a [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] on failure to store.
    async fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;

    /// Erase a [`StoreKey`].
    ///
    /// Succeeds if the key does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    async fn erase(&self, key: &StoreKey) -> Result<(), StorageError>;

    /// Erase a list of [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    async fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        let futures_erase = keys.iter().map(|key| self.erase(key));
        futures::future::join_all(futures_erase)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    /// Erase all [`StoreKey`] under [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    async fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError>;
}

/// A supertrait of [`AsyncReadableStorageTraits`] and [`AsyncWritableStorageTraits`].
pub trait AsyncReadableWritableStorageTraits:
    AsyncReadableStorageTraits + AsyncWritableStorageTraits
{
}

impl<T> AsyncReadableWritableStorageTraits for T where
    T: AsyncReadableStorageTraits + AsyncWritableStorageTraits
{
}

/// A supertrait of [`AsyncReadableStorageTraits`] and [`AsyncListableStorageTraits`].
pub trait AsyncReadableListableStorageTraits:
    AsyncReadableStorageTraits + AsyncListableStorageTraits
{
}

impl<T> AsyncReadableListableStorageTraits for T where
    T: AsyncReadableStorageTraits + AsyncListableStorageTraits
{
}

/// A supertrait of [`AsyncReadableWritableStorageTraits`] and [`AsyncListableStorageTraits`].
pub trait AsyncReadableWritableListableStorageTraits:
    AsyncReadableWritableStorageTraits + AsyncListableStorageTraits
{
}

impl<T> AsyncReadableWritableListableStorageTraits for T where
    T: AsyncReadableWritableStorageTraits + AsyncListableStorageTraits
{
}

async fn async_store_metadata<TStorage: ?Sized + AsyncWritableStorageTraits, TMetadata: Serialize>(
    storage: &TStorage,
    key: &StoreKey,
    metadata: &TMetadata,
) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(metadata)
        .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
    storage.set(key, json.into()).await
}

async fn async_retrieve_metadata<
    TStorage: ?Sized + AsyncReadableStorageTraits,
    TMetadata: DeserializeOwned,
>(
    storage: &TStorage,
    key: &StoreKey,
) -> Result<Option<TMetadata>, StorageError> {
    storage
        .get(key)
        .await?
        .map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))
        })
        .transpose()
}

/// Asynchronously create (or overwrite) the entry point metadata of a hierarchy.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub async fn async_create_entry_point<TStorage: ?Sized + AsyncWritableStorageTraits>(
    storage: &TStorage,
    metadata: &EntryPointMetadata,
) -> Result<(), StorageError> {
    async_store_metadata(storage, &meta_key_entry_point(), metadata).await
}

/// Asynchronously retrieve the entry point metadata of a hierarchy.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store or the metadata is invalid.
pub async fn async_retrieve_entry_point<TStorage: ?Sized + AsyncReadableStorageTraits>(
    storage: &TStorage,
) -> Result<Option<EntryPointMetadata>, StorageError> {
    async_retrieve_metadata(storage, &meta_key_entry_point()).await
}

/// Asynchronously create (or overwrite) the metadata of an array.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub async fn async_create_array<TStorage: ?Sized + AsyncWritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
    metadata: &ArrayMetadata,
) -> Result<(), StorageError> {
    async_store_metadata(storage, &meta_key_array(path, metadata_key_suffix), metadata).await
}

/// Asynchronously retrieve the metadata of an array.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store or the metadata is invalid.
pub async fn async_retrieve_array<TStorage: ?Sized + AsyncReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
) -> Result<Option<ArrayMetadata>, StorageError> {
    async_retrieve_metadata(storage, &meta_key_array(path, metadata_key_suffix)).await
}

/// Asynchronously create (or overwrite) the metadata of an explicit group.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub async fn async_create_group<TStorage: ?Sized + AsyncWritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
    metadata: &GroupMetadata,
) -> Result<(), StorageError> {
    async_store_metadata(storage, &meta_key_group(path, metadata_key_suffix), metadata).await
}

/// Asynchronously retrieve the metadata of an explicit group.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store or the metadata is invalid.
pub async fn async_retrieve_group<TStorage: ?Sized + AsyncReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
) -> Result<Option<GroupMetadata>, StorageError> {
    async_retrieve_metadata(storage, &meta_key_group(path, metadata_key_suffix)).await
}

/// Asynchronously store an encoded chunk.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub async fn async_store_chunk<TStorage: ?Sized + AsyncWritableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_indices: &[u64],
    separator: ChunkKeySeparator,
    chunk_encoded: Bytes,
) -> Result<(), StorageError> {
    storage
        .set(
            &data_key(array_path, chunk_indices, separator),
            chunk_encoded,
        )
        .await
}

/// Asynchronously retrieve an encoded chunk.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub async fn async_retrieve_chunk<TStorage: ?Sized + AsyncReadableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_indices: &[u64],
    separator: ChunkKeySeparator,
) -> Result<MaybeBytes, StorageError> {
    storage
        .get(&data_key(array_path, chunk_indices, separator))
        .await
}

/// Asynchronously erase a chunk.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub async fn async_erase_chunk<TStorage: ?Sized + AsyncWritableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_indices: &[u64],
    separator: ChunkKeySeparator,
) -> Result<(), StorageError> {
    storage
        .erase(&data_key(array_path, chunk_indices, separator))
        .await
}

/// Asynchronously erase a node: its metadata, chunks, and all descendants.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub async fn async_erase_node<TStorage: ?Sized + AsyncWritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
) -> Result<(), StorageError> {
    storage
        .erase_values(&[
            meta_key_array(path, metadata_key_suffix),
            meta_key_group(path, metadata_key_suffix),
        ])
        .await?;
    storage.erase_prefix(&meta_prefix(path)).await?;
    storage.erase_prefix(&data_prefix(path)).await
}

/// Asynchronously check if any key exists under `prefix`.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub async fn async_prefix_exists<TStorage: ?Sized + AsyncListableStorageTraits>(
    storage: &TStorage,
    prefix: &StorePrefix,
) -> Result<bool, StorageError> {
    Ok(!storage.list_prefix(prefix).await?.is_empty())
}
