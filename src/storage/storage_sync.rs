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

/// Readable storage traits.
pub trait ReadableStorageTraits: Send + Sync {
    /// Retrieve the value (bytes) associated with a given [`StoreKey`].
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError>;
}

/// Listable storage traits.
pub trait ListableStorageTraits: Send + Sync {
    /// Retrieve all [`StoreKeys`] in the store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn list(&self) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] with a given [`StorePrefix`].
    ///
    /// The returned keys are full keys, not keys relative to `prefix`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] and [`StorePrefix`] which are direct children of [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError>;
}

/// Writable storage traits.
pub trait WritableStorageTraits: Send + Sync {
    /// Store bytes at a [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] on failure to store.
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;

    /// Erase a [`StoreKey`].
    ///
    /// Succeeds if the key does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase(&self, key: &StoreKey) -> Result<(), StorageError>;

    /// Erase a list of [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        keys.iter().try_for_each(|key| self.erase(key))
    }

    /// Erase all [`StoreKey`] under [`StorePrefix`].
    ///
    /// Succeeds if there are no keys under the prefix.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError>;
}

/// A supertrait of [`ReadableStorageTraits`] and [`WritableStorageTraits`].
pub trait ReadableWritableStorageTraits: ReadableStorageTraits + WritableStorageTraits {}

impl<T> ReadableWritableStorageTraits for T where T: ReadableStorageTraits + WritableStorageTraits {}

/// A supertrait of [`ReadableStorageTraits`] and [`ListableStorageTraits`].
pub trait ReadableListableStorageTraits: ReadableStorageTraits + ListableStorageTraits {}

impl<T> ReadableListableStorageTraits for T where T: ReadableStorageTraits + ListableStorageTraits {}

/// A supertrait of [`ReadableWritableStorageTraits`] and [`ListableStorageTraits`].
pub trait ReadableWritableListableStorageTraits:
    ReadableWritableStorageTraits + ListableStorageTraits
{
}

impl<T> ReadableWritableListableStorageTraits for T where
    T: ReadableWritableStorageTraits + ListableStorageTraits
{
}

fn store_metadata<TStorage: ?Sized + WritableStorageTraits, TMetadata: Serialize>(
    storage: &TStorage,
    key: &StoreKey,
    metadata: &TMetadata,
) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(metadata)
        .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
    storage.set(key, json.into())
}

fn retrieve_metadata<TStorage: ?Sized + ReadableStorageTraits, TMetadata: DeserializeOwned>(
    storage: &TStorage,
    key: &StoreKey,
) -> Result<Option<TMetadata>, StorageError> {
    storage
        .get(key)?
        .map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))
        })
        .transpose()
}

/// Create (or overwrite) the entry point metadata of a hierarchy.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn create_entry_point<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    metadata: &EntryPointMetadata,
) -> Result<(), StorageError> {
    store_metadata(storage, &meta_key_entry_point(), metadata)
}

/// Retrieve the entry point metadata of a hierarchy.
///
/// Returns [`None`] if the entry point does not exist.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store or the metadata is invalid.
pub fn retrieve_entry_point<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
) -> Result<Option<EntryPointMetadata>, StorageError> {
    retrieve_metadata(storage, &meta_key_entry_point())
}

/// Create (or overwrite) the metadata of an array.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn create_array<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
    metadata: &ArrayMetadata,
) -> Result<(), StorageError> {
    store_metadata(storage, &meta_key_array(path, metadata_key_suffix), metadata)
}

/// Retrieve the metadata of an array.
///
/// Returns [`None`] if there is no array at `path`.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store or the metadata is invalid.
pub fn retrieve_array<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
) -> Result<Option<ArrayMetadata>, StorageError> {
    retrieve_metadata(storage, &meta_key_array(path, metadata_key_suffix))
}

/// Create (or overwrite) the metadata of an explicit group.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn create_group<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
    metadata: &GroupMetadata,
) -> Result<(), StorageError> {
    store_metadata(storage, &meta_key_group(path, metadata_key_suffix), metadata)
}

/// Retrieve the metadata of an explicit group.
///
/// Returns [`None`] if there is no explicit group at `path`.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store or the metadata is invalid.
pub fn retrieve_group<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
) -> Result<Option<GroupMetadata>, StorageError> {
    retrieve_metadata(storage, &meta_key_group(path, metadata_key_suffix))
}

/// Store an encoded chunk.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn store_chunk<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_indices: &[u64],
    separator: ChunkKeySeparator,
    chunk_encoded: Bytes,
) -> Result<(), StorageError> {
    storage.set(
        &data_key(array_path, chunk_indices, separator),
        chunk_encoded,
    )
}

/// Retrieve an encoded chunk.
///
/// Returns [`None`] if the chunk has not been written.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn retrieve_chunk<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_indices: &[u64],
    separator: ChunkKeySeparator,
) -> Result<MaybeBytes, StorageError> {
    storage.get(&data_key(array_path, chunk_indices, separator))
}

/// Erase a chunk.
///
/// Succeeds if the chunk does not exist.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn erase_chunk<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    array_path: &NodePath,
    chunk_indices: &[u64],
    separator: ChunkKeySeparator,
) -> Result<(), StorageError> {
    storage.erase(&data_key(array_path, chunk_indices, separator))
}

/// Erase a node (array, explicit group, or implicit group): its metadata, chunks, and all descendants.
///
/// Succeeds if the node does not exist.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn erase_node<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata_key_suffix: &str,
) -> Result<(), StorageError> {
    storage.erase_values(&[
        meta_key_array(path, metadata_key_suffix),
        meta_key_group(path, metadata_key_suffix),
    ])?;
    storage.erase_prefix(&meta_prefix(path))?;
    storage.erase_prefix(&data_prefix(path))
}

/// Returns true if any key exists under `prefix`.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn prefix_exists<TStorage: ?Sized + ListableStorageTraits>(
    storage: &TStorage,
    prefix: &StorePrefix,
) -> Result<bool, StorageError> {
    Ok(!storage.list_prefix(prefix)?.is_empty())
}
