//! Storage: the abstract store interface, stores, and storage adapters.
//!
//! A store is a flat key-value map from [`StoreKey`]s to byte buffers.
//! A hierarchy uses the following key layout:
//!  - `zarr.json`: the [entry point metadata](crate::metadata::EntryPointMetadata),
//!  - `meta/root{path}.array{suffix}` or `meta/root{path}.group{suffix}`: node metadata (the root node uses `meta/root.array{suffix}` and `meta/root.group{suffix}`),
//!  - `data/root{path}/c{i0}{sep}{i1}{sep}...`: chunk data.
//!
//! This module defines the store capability traits ([`ReadableStorageTraits`], [`WritableStorageTraits`], [`ListableStorageTraits`]), includes a [`MemoryStore`](store::MemoryStore) and a [`FilesystemStore`](store::FilesystemStore), and has functions deriving the keys of the layout above.

pub mod storage_adapter;
mod storage_sync;
pub mod store;
mod store_key;
mod store_prefix;

#[cfg(feature = "async")]
mod storage_async;

use std::sync::Arc;

use thiserror::Error;

use crate::{array::ChunkKeySeparator, node::NodePath};

pub use store_key::{StoreKey, StoreKeyError, StoreKeys};
pub use store_prefix::{StorePrefix, StorePrefixError, StorePrefixes};

pub use self::storage_sync::{
    create_array, create_entry_point, create_group, erase_chunk, erase_node, prefix_exists,
    retrieve_array, retrieve_chunk, retrieve_entry_point, retrieve_group, store_chunk,
    ListableStorageTraits, ReadableListableStorageTraits, ReadableStorageTraits,
    ReadableWritableListableStorageTraits, ReadableWritableStorageTraits, WritableStorageTraits,
};

#[cfg(feature = "async")]
pub use self::storage_async::{
    async_create_array, async_create_entry_point, async_create_group, async_erase_chunk,
    async_erase_node, async_prefix_exists, async_retrieve_array, async_retrieve_chunk,
    async_retrieve_entry_point, async_retrieve_group, async_store_chunk,
    AsyncListableStorageTraits, AsyncReadableListableStorageTraits, AsyncReadableStorageTraits,
    AsyncReadableWritableListableStorageTraits, AsyncReadableWritableStorageTraits,
    AsyncWritableStorageTraits,
};

/// The type for bytes used in synchronous and asynchronous store set and get methods.
pub type Bytes = bytes::Bytes;

/// An alias for bytes which may or may not be available.
pub type MaybeBytes = Option<Bytes>;

/// [`Arc`] wrapped readable storage.
pub type ReadableStorage = Arc<dyn ReadableStorageTraits>;

/// [`Arc`] wrapped writable storage.
pub type WritableStorage = Arc<dyn WritableStorageTraits>;

/// [`Arc`] wrapped listable storage.
pub type ListableStorage = Arc<dyn ListableStorageTraits>;

/// [`Arc`] wrapped readable and listable storage.
pub type ReadableListableStorage = Arc<dyn ReadableListableStorageTraits>;

/// [`Arc`] wrapped readable, writable, and listable storage.
pub type ReadableWritableListableStorage = Arc<dyn ReadableWritableListableStorageTraits>;

#[cfg(feature = "async")]
/// [`Arc`] wrapped asynchronous readable storage.
pub type AsyncReadableStorage = Arc<dyn AsyncReadableStorageTraits>;

#[cfg(feature = "async")]
/// [`Arc`] wrapped asynchronous readable and listable storage.
pub type AsyncReadableListableStorage = Arc<dyn AsyncReadableListableStorageTraits>;

#[cfg(feature = "async")]
/// [`Arc`] wrapped asynchronous readable, writable and listable storage.
pub type AsyncReadableWritableListableStorage = Arc<dyn AsyncReadableWritableListableStorageTraits>;

/// [`StoreKeys`] and [`StorePrefixes`] directly under a prefix.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StoreKeysPrefixes {
    keys: StoreKeys,
    prefixes: StorePrefixes,
}

impl StoreKeysPrefixes {
    /// Create a new [`StoreKeysPrefixes`].
    #[must_use]
    pub const fn new(keys: StoreKeys, prefixes: StorePrefixes) -> Self {
        Self { keys, prefixes }
    }

    /// Returns the keys.
    #[must_use]
    pub const fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Returns the prefixes.
    #[must_use]
    pub const fn prefixes(&self) -> &StorePrefixes {
        &self.prefixes
    }

    /// Returns true if there are no keys or prefixes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.prefixes.is_empty()
    }
}

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only store.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An error parsing or serialising the metadata for a key.
    #[error("error parsing metadata for {0}: {1}")]
    InvalidMetadata(StoreKey, String),
    /// An invalid store prefix.
    #[error("invalid store prefix {0}")]
    StorePrefixError(#[from] StorePrefixError),
    /// An invalid store key.
    #[error("invalid store key {0}")]
    InvalidStoreKey(#[from] StoreKeyError),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// The key of the entry point metadata document.
pub const ENTRY_POINT_KEY: &str = "zarr.json";

/// An invalid metadata key suffix.
///
/// A metadata key suffix is appended to the final segment of a metadata key, so it must not contain `/`.
#[derive(Debug, Error)]
#[error("invalid metadata key suffix {0:?}")]
pub struct MetadataKeySuffixError(String);

impl MetadataKeySuffixError {
    /// Return the invalid metadata key suffix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.0
    }
}

/// Check that `metadata_key_suffix` forms valid metadata keys.
///
/// # Errors
/// Returns a [`MetadataKeySuffixError`] if the suffix contains `/`.
pub fn validate_metadata_key_suffix(
    metadata_key_suffix: &str,
) -> Result<(), MetadataKeySuffixError> {
    if metadata_key_suffix.contains('/') {
        Err(MetadataKeySuffixError(metadata_key_suffix.to_string()))
    } else {
        Ok(())
    }
}

/// The metadata document kind of an array.
const ARRAY_METADATA_KIND: &str = "array";

/// The metadata document kind of an explicit group.
const GROUP_METADATA_KIND: &str = "group";

/// Return the path of a node relative to `meta/root` or `data/root`, empty for the root node.
fn relative_node_path(path: &NodePath) -> &str {
    if path.is_root() {
        ""
    } else {
        path.as_str()
    }
}

/// Return the entry point metadata key (`zarr.json`).
#[must_use]
pub fn meta_key_entry_point() -> StoreKey {
    unsafe { StoreKey::new_unchecked(ENTRY_POINT_KEY) }
}

fn meta_key_any(path: &NodePath, kind: &str, metadata_key_suffix: &str) -> StoreKey {
    let path = relative_node_path(path);
    unsafe { StoreKey::new_unchecked(format!("meta/root{path}.{kind}{metadata_key_suffix}")) }
}

/// Return the array metadata key (`meta/root{path}.array{suffix}`) given a node path.
#[must_use]
pub fn meta_key_array(path: &NodePath, metadata_key_suffix: &str) -> StoreKey {
    meta_key_any(path, ARRAY_METADATA_KIND, metadata_key_suffix)
}

/// Return the explicit group metadata key (`meta/root{path}.group{suffix}`) given a node path.
#[must_use]
pub fn meta_key_group(path: &NodePath, metadata_key_suffix: &str) -> StoreKey {
    meta_key_any(path, GROUP_METADATA_KIND, metadata_key_suffix)
}

/// Return the suffix of array metadata keys, e.g. `.array.json`.
#[must_use]
pub fn meta_key_array_suffix(metadata_key_suffix: &str) -> String {
    format!(".{ARRAY_METADATA_KIND}{metadata_key_suffix}")
}

/// Return the suffix of explicit group metadata keys, e.g. `.group.json`.
#[must_use]
pub fn meta_key_group_suffix(metadata_key_suffix: &str) -> String {
    format!(".{GROUP_METADATA_KIND}{metadata_key_suffix}")
}

/// Return the prefix holding the metadata of all descendants of a node (`meta/root{path}/`).
#[must_use]
pub fn meta_prefix(path: &NodePath) -> StorePrefix {
    let path = relative_node_path(path);
    unsafe { StorePrefix::new_unchecked(format!("meta/root{path}/")) }
}

/// Return the prefix holding the chunks of a node and all of its descendants (`data/root{path}/`).
#[must_use]
pub fn data_prefix(path: &NodePath) -> StorePrefix {
    let path = relative_node_path(path);
    unsafe { StorePrefix::new_unchecked(format!("data/root{path}/")) }
}

/// Return the data key given a node path, chunk grid coordinates, and a chunk key separator.
///
/// For example, the chunk at `[1, 23, 45]` of the array at `/foo/bar` with a `/` separator is stored at `data/root/foo/bar/c1/23/45`.
#[must_use]
pub fn data_key(
    path: &NodePath,
    chunk_indices: &[u64],
    separator: ChunkKeySeparator,
) -> StoreKey {
    let prefix = data_prefix(path);
    let chunk_key = separator.encode(chunk_indices);
    unsafe { StoreKey::new_unchecked(prefix.as_str().to_string() + &chunk_key) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_keys() {
        let root = NodePath::root();
        assert_eq!(meta_key_entry_point().as_str(), "zarr.json");
        assert_eq!(meta_key_array(&root, ".json").as_str(), "meta/root.array.json");
        assert_eq!(meta_key_group(&root, ".json").as_str(), "meta/root.group.json");
        let path = NodePath::new("/foo/bar").unwrap();
        assert_eq!(
            meta_key_array(&path, ".json").as_str(),
            "meta/root/foo/bar.array.json"
        );
        assert_eq!(meta_key_group(&path, "").as_str(), "meta/root/foo/bar.group");
        assert_eq!(meta_prefix(&root).as_str(), "meta/root/");
        assert_eq!(meta_prefix(&path).as_str(), "meta/root/foo/bar/");
        assert_eq!(meta_key_array_suffix(".json"), ".array.json");
        assert_eq!(meta_key_group_suffix(".json"), ".group.json");
    }

    #[test]
    fn metadata_key_suffixes() {
        assert!(validate_metadata_key_suffix(".json").is_ok());
        assert!(validate_metadata_key_suffix("").is_ok());
        assert!(validate_metadata_key_suffix(".v3.json").is_ok());
        for suffix in ["/", ".json/", "/..", "/../x"] {
            assert_eq!(
                validate_metadata_key_suffix(suffix).unwrap_err().suffix(),
                suffix
            );
        }
    }

    #[test]
    fn data_keys() {
        let path = NodePath::new("/foo/bar").unwrap();
        assert_eq!(
            data_key(&path, &[1, 23, 45], ChunkKeySeparator::Slash).as_str(),
            "data/root/foo/bar/c1/23/45"
        );
        assert_eq!(
            data_key(&path, &[1, 23, 45], ChunkKeySeparator::Dot).as_str(),
            "data/root/foo/bar/c1.23.45"
        );
        assert_eq!(
            data_key(&NodePath::root(), &[0, 0], ChunkKeySeparator::Slash).as_str(),
            "data/root/c0/0"
        );
        assert_eq!(data_prefix(&path).as_str(), "data/root/foo/bar/");
    }
}
