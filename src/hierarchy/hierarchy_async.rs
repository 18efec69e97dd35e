use std::sync::Arc;

use crate::{
    array::Array,
    config::global_config,
    group::{ExplicitGroup, ImplicitGroup},
    metadata::{ArrayMetadata, EntryPointMetadata, GroupMetadata},
    node::{Node, NodeKind, NodePath},
    storage::{
        async_create_entry_point, async_erase_node, async_prefix_exists, async_retrieve_array,
        async_retrieve_entry_point, async_retrieve_group, meta_key_array, meta_key_group,
        meta_prefix, validate_metadata_key_suffix, AsyncReadableListableStorageTraits,
        AsyncReadableStorageTraits, AsyncReadableWritableStorageTraits,
        AsyncWritableStorageTraits, StorageError,
    },
};

use super::{validate_entry_point, Hierarchy, HierarchyError};

impl<TStorage: ?Sized + AsyncWritableStorageTraits> Hierarchy<TStorage> {
    /// Asynchronously create a new hierarchy in `storage` by writing the entry point metadata.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if the global metadata key suffix contains `/` or there is a storage error.
    pub async fn async_create(storage: Arc<TStorage>) -> Result<Self, HierarchyError> {
        let metadata_key_suffix = global_config().metadata_key_suffix().to_string();
        validate_metadata_key_suffix(&metadata_key_suffix)?;
        let metadata = EntryPointMetadata::new(&metadata_key_suffix);
        async_create_entry_point(&*storage, &metadata).await?;
        log::debug!("created hierarchy with metadata key suffix {metadata_key_suffix:?}");
        Ok(Self {
            storage,
            metadata_key_suffix,
        })
    }

    /// Asynchronously erase the node at `path` including its metadata, chunks, and all descendants.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if `path` is invalid or there is a storage error.
    pub async fn async_erase_node(&self, path: &str) -> Result<(), HierarchyError> {
        let path = NodePath::new(path)?;
        async_erase_node(&*self.storage, &path, &self.metadata_key_suffix).await?;
        log::debug!("erased node {path}");
        Ok(())
    }
}

impl<TStorage: ?Sized + AsyncReadableStorageTraits> Hierarchy<TStorage> {
    /// Asynchronously open an existing hierarchy in `storage`.
    ///
    /// # Errors
    /// See [`Hierarchy::open`].
    pub async fn async_open(storage: Arc<TStorage>) -> Result<Self, HierarchyError> {
        let metadata = async_retrieve_entry_point(&*storage)
            .await?
            .ok_or(HierarchyError::MissingEntryPoint)?;
        validate_entry_point(&metadata)?;
        log::debug!("opened hierarchy {}", metadata.zarr_format);
        Ok(Self {
            storage,
            metadata_key_suffix: metadata.metadata_key_suffix,
        })
    }

    /// Asynchronously get the array at `path`.
    ///
    /// # Errors
    /// See [`Hierarchy::get_array`].
    pub async fn async_get_array(&self, path: &str) -> Result<Array<TStorage>, HierarchyError> {
        let path = NodePath::new(path)?;
        let metadata = async_retrieve_array(&*self.storage, &path, &self.metadata_key_suffix)
            .await?
            .ok_or_else(|| HierarchyError::NodeNotFound(path.clone()))?;
        Ok(Array::new_with_metadata(
            self.storage.clone(),
            path,
            &self.metadata_key_suffix,
            metadata,
        )?)
    }

    async fn async_has_metadata(&self, path: &NodePath) -> Result<Option<NodeKind>, StorageError> {
        if self
            .storage
            .get(&meta_key_array(path, &self.metadata_key_suffix))
            .await?
            .is_some()
        {
            Ok(Some(NodeKind::Array))
        } else if self
            .storage
            .get(&meta_key_group(path, &self.metadata_key_suffix))
            .await?
            .is_some()
        {
            Ok(Some(NodeKind::ExplicitGroup))
        } else {
            Ok(None)
        }
    }
}

impl<TStorage: ?Sized + AsyncReadableListableStorageTraits> Hierarchy<TStorage> {
    /// Asynchronously resolve the node at `path`.
    ///
    /// # Errors
    /// See [`Hierarchy::get`].
    pub async fn async_get(&self, path: &str) -> Result<Node<TStorage>, HierarchyError> {
        let path = NodePath::new(path)?;
        if let Some(metadata) =
            async_retrieve_array(&*self.storage, &path, &self.metadata_key_suffix).await?
        {
            return Ok(Node::Array(Array::new_with_metadata(
                self.storage.clone(),
                path,
                &self.metadata_key_suffix,
                metadata,
            )?));
        }
        if let Some(metadata) =
            async_retrieve_group(&*self.storage, &path, &self.metadata_key_suffix).await?
        {
            return Ok(Node::ExplicitGroup(ExplicitGroup::new_with_metadata(
                self.storage.clone(),
                path,
                &self.metadata_key_suffix,
                metadata,
            )?));
        }
        if path.is_root() || async_prefix_exists(&*self.storage, &meta_prefix(&path)).await? {
            Ok(Node::ImplicitGroup(ImplicitGroup::new(
                self.storage.clone(),
                path,
            )))
        } else {
            Err(HierarchyError::NodeNotFound(path))
        }
    }

    /// Asynchronously check if a node exists at `path`.
    ///
    /// # Errors
    /// See [`Hierarchy::has`].
    pub async fn async_has(&self, path: &str) -> Result<bool, HierarchyError> {
        match self.async_get(path).await {
            Ok(_) => Ok(true),
            Err(HierarchyError::NodeNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl<TStorage: ?Sized + AsyncReadableWritableStorageTraits> Hierarchy<TStorage> {
    /// Asynchronously create an array at `path` and write its metadata.
    ///
    /// # Errors
    /// See [`Hierarchy::create_array`].
    pub async fn async_create_array(
        &self,
        path: &str,
        metadata: ArrayMetadata,
    ) -> Result<Array<TStorage>, HierarchyError> {
        let path = NodePath::new(path)?;
        let array = Array::new_with_metadata(
            self.storage.clone(),
            path.clone(),
            &self.metadata_key_suffix,
            metadata,
        )?;
        if let Some(NodeKind::ExplicitGroup) = self.async_has_metadata(&path).await? {
            return Err(HierarchyError::NodeExists(path, NodeKind::ExplicitGroup));
        }
        array.async_store_metadata().await?;
        log::debug!("created array {path}");
        Ok(array)
    }

    /// Asynchronously create an explicit group at `path` and write its metadata.
    ///
    /// # Errors
    /// See [`Hierarchy::create_group`].
    pub async fn async_create_group(
        &self,
        path: &str,
        metadata: GroupMetadata,
    ) -> Result<ExplicitGroup<TStorage>, HierarchyError> {
        let path = NodePath::new(path)?;
        let group = ExplicitGroup::new_with_metadata(
            self.storage.clone(),
            path.clone(),
            &self.metadata_key_suffix,
            metadata,
        )?;
        if let Some(NodeKind::Array) = self.async_has_metadata(&path).await? {
            return Err(HierarchyError::NodeExists(path, NodeKind::Array));
        }
        group.async_store_metadata().await?;
        log::debug!("created explicit group {path}");
        Ok(group)
    }
}
