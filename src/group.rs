//! Groups.
//!
//! A group is a node in a hierarchy which may have child nodes (groups or [`arrays`](crate::array)).
//!
//! An [`ExplicitGroup`] has a metadata document at `meta/root{path}.group{suffix}` holding attributes and extensions. For example:
//! ```json
//! {
//!     "extensions": [],
//!     "attributes": {
//!         "spam": "ham",
//!         "eggs": 42
//!     }
//! }
//! ```
//!
//! An [`ImplicitGroup`] has no metadata document.
//! It exists only because some descendant node exists, e.g. `/a/b` is an implicit group if an array exists at `/a/b/c` and there is no metadata document for `/a/b`.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    metadata::{validate_extensions, GroupMetadata, UnsupportedExtensionError},
    node::NodePath,
    storage::{
        validate_metadata_key_suffix, MetadataKeySuffixError, StorageError, WritableStorageTraits,
    },
};

#[cfg(feature = "async")]
use crate::storage::AsyncWritableStorageTraits;

/// A group with a metadata document.
pub struct ExplicitGroup<TStorage: ?Sized> {
    /// The storage.
    storage: Arc<TStorage>,
    /// The path of the group in the hierarchy.
    path: NodePath,
    /// The metadata key suffix of the hierarchy.
    metadata_key_suffix: String,
    /// The metadata.
    metadata: GroupMetadata,
}

/// A group creation error.
#[derive(Debug, Error)]
pub enum GroupCreateError {
    /// An unsupported extension.
    #[error(transparent)]
    UnsupportedExtension(#[from] UnsupportedExtensionError),
    /// An invalid metadata key suffix.
    #[error(transparent)]
    InvalidMetadataKeySuffix(#[from] MetadataKeySuffixError),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

impl<TStorage: ?Sized> ExplicitGroup<TStorage> {
    /// Create an explicit group in `storage` at `path` with `metadata`.
    /// This does **not** write to the store, use [`store_metadata`](ExplicitGroup::store_metadata) to write `metadata` to `storage`.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if the metadata has an unsupported extension or the metadata key suffix contains `/`.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: NodePath,
        metadata_key_suffix: &str,
        metadata: GroupMetadata,
    ) -> Result<Self, GroupCreateError> {
        validate_extensions(&metadata.extensions)?;
        validate_metadata_key_suffix(metadata_key_suffix)?;
        Ok(Self {
            storage,
            path,
            metadata_key_suffix: metadata_key_suffix.to_string(),
            metadata,
        })
    }

    /// Get path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// Get attributes.
    #[must_use]
    pub const fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata.attributes
    }

    /// Mutably borrow the group attributes.
    #[must_use]
    pub fn attributes_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        &mut self.metadata.attributes
    }

    /// Get metadata.
    #[must_use]
    pub const fn metadata(&self) -> &GroupMetadata {
        &self.metadata
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> ExplicitGroup<TStorage> {
    /// Store the group metadata.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), StorageError> {
        crate::storage::create_group(
            &*self.storage,
            &self.path,
            &self.metadata_key_suffix,
            &self.metadata,
        )
    }
}

#[cfg(feature = "async")]
impl<TStorage: ?Sized + AsyncWritableStorageTraits> ExplicitGroup<TStorage> {
    /// Asynchronously store the group metadata.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub async fn async_store_metadata(&self) -> Result<(), StorageError> {
        crate::storage::async_create_group(
            &*self.storage,
            &self.path,
            &self.metadata_key_suffix,
            &self.metadata,
        )
        .await
    }
}

impl<TStorage: ?Sized> core::fmt::Debug for ExplicitGroup<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExplicitGroup")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// A group without a metadata document.
pub struct ImplicitGroup<TStorage: ?Sized> {
    #[allow(dead_code)]
    storage: Arc<TStorage>,
    path: NodePath,
}

impl<TStorage: ?Sized> ImplicitGroup<TStorage> {
    /// Create an implicit group in `storage` at `path`.
    ///
    /// The existence of descendant nodes is not checked, use [`Hierarchy::get_implicit_group`](crate::hierarchy::Hierarchy::get_implicit_group) to resolve an implicit group from a store.
    #[must_use]
    pub fn new(storage: Arc<TStorage>, path: NodePath) -> Self {
        Self { storage, path }
    }

    /// Get path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }
}

impl<TStorage: ?Sized> core::fmt::Debug for ImplicitGroup<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImplicitGroup")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::ExtensionMetadata,
        storage::{retrieve_group, store::MemoryStore},
    };

    #[test]
    fn explicit_group_store_metadata() {
        let store = Arc::new(MemoryStore::new());
        let path = NodePath::new("/a/b").unwrap();
        let mut group = ExplicitGroup::new_with_metadata(
            store.clone(),
            path.clone(),
            ".json",
            GroupMetadata::default(),
        )
        .unwrap();
        group
            .attributes_mut()
            .insert("spam".to_string(), "ham".into());
        group.store_metadata().unwrap();

        let metadata = retrieve_group(&*store, &path, ".json").unwrap().unwrap();
        assert_eq!(metadata.attributes["spam"], "ham");
        assert_eq!(&metadata, group.metadata());
    }

    #[test]
    fn explicit_group_mandatory_extension() {
        let store = Arc::new(MemoryStore::new());
        let metadata = GroupMetadata {
            extensions: vec![ExtensionMetadata::new("https://example.com/ext", true)],
            ..Default::default()
        };
        assert!(
            ExplicitGroup::new_with_metadata(store, NodePath::root(), ".json", metadata).is_err()
        );
    }

    #[test]
    fn explicit_group_invalid_metadata_key_suffix() {
        let store = Arc::new(MemoryStore::new());
        assert!(matches!(
            ExplicitGroup::new_with_metadata(
                store,
                NodePath::new("/a").unwrap(),
                "/",
                GroupMetadata::default()
            ),
            Err(GroupCreateError::InvalidMetadataKeySuffix(_))
        ));
    }
}
