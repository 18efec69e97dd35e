//! Hierarchies.
//!
//! A hierarchy is a tree of [arrays](crate::array::Array) and [groups](crate::group) in a store, rooted at an entry point metadata document (`zarr.json`).
//!
//! [`Hierarchy`] is the single authority for creating, resolving, listing, and erasing nodes.
//! A node at a path is resolved in the following order:
//!  1. an [`Array`] if array metadata exists at `meta/root{path}.array{suffix}`,
//!  2. an [`ExplicitGroup`] if group metadata exists at `meta/root{path}.group{suffix}`,
//!  3. an [`ImplicitGroup`] if any key exists under `meta/root{path}/`.
//!
//! The root node always exists. It is an implicit group unless it has explicit metadata.

#[cfg(feature = "async")]
mod hierarchy_async;

use std::{collections::BTreeMap, sync::Arc};

use thiserror::Error;

use crate::{
    array::{Array, ArrayCreateError},
    config::global_config,
    group::{ExplicitGroup, GroupCreateError, ImplicitGroup},
    metadata::{
        validate_extensions, ArrayMetadata, EntryPointMetadata, GroupMetadata, ProtocolVersion,
        UnsupportedExtensionError,
    },
    node::{Node, NodeKind, NodePath, NodePathError},
    storage::{
        create_entry_point, meta_key_array, meta_key_array_suffix, meta_key_group,
        meta_key_group_suffix, meta_prefix, prefix_exists, retrieve_array, retrieve_entry_point,
        retrieve_group, validate_metadata_key_suffix, MetadataKeySuffixError,
        ReadableListableStorageTraits, ReadableStorageTraits, ReadableWritableStorageTraits,
        StorageError, StorePrefix, WritableStorageTraits,
    },
};

/// The major version of the core protocol supported by this crate.
const SUPPORTED_PROTOCOL_MAJOR_VERSION: u64 = 3;

/// A hierarchy.
pub struct Hierarchy<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    metadata_key_suffix: String,
}

/// A hierarchy error.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// No node exists at a path.
    #[error("no node exists at {0}")]
    NodeNotFound(NodePath),
    /// A node of another kind exists at a path.
    #[error("an {1} already exists at {0}")]
    NodeExists(NodePath, NodeKind),
    /// The entry point metadata document is missing.
    #[error("the entry point metadata document (zarr.json) is missing")]
    MissingEntryPoint,
    /// An unsupported protocol.
    #[error("unsupported protocol {0}")]
    UnsupportedProtocol(String),
    /// An unsupported core protocol version.
    #[error("unsupported core protocol version {0}")]
    UnsupportedProtocolVersion(ProtocolVersion),
    /// An unsupported metadata encoding.
    #[error("unsupported metadata encoding {0}")]
    UnsupportedMetadataEncoding(String),
    /// An unsupported extension.
    #[error(transparent)]
    UnsupportedExtension(#[from] UnsupportedExtensionError),
    /// An invalid metadata key suffix.
    #[error(transparent)]
    InvalidMetadataKeySuffix(#[from] MetadataKeySuffixError),
    /// An array creation error.
    #[error(transparent)]
    ArrayCreateError(#[from] ArrayCreateError),
    /// A group creation error.
    #[error(transparent)]
    GroupCreateError(#[from] GroupCreateError),
}

/// Check that the entry point describes a supported protocol, metadata encoding, and extensions.
fn validate_entry_point(metadata: &EntryPointMetadata) -> Result<(), HierarchyError> {
    let version = metadata
        .protocol_version()
        .ok_or_else(|| HierarchyError::UnsupportedProtocol(metadata.zarr_format.clone()))?;
    if version.major != SUPPORTED_PROTOCOL_MAJOR_VERSION {
        return Err(HierarchyError::UnsupportedProtocolVersion(version));
    }
    match metadata.metadata_encoding_version() {
        Some(encoding) if encoding.major == SUPPORTED_PROTOCOL_MAJOR_VERSION => {}
        _ => {
            return Err(HierarchyError::UnsupportedMetadataEncoding(
                metadata.metadata_encoding.clone(),
            ))
        }
    }
    validate_extensions(&metadata.extensions)?;
    validate_metadata_key_suffix(&metadata.metadata_key_suffix)?;
    Ok(())
}

/// Parse the path of a node from a metadata key relative to `meta/root`, e.g. `/a/b.array.json`.
fn node_from_metadata_key(
    key: &str,
    array_suffix: &str,
    group_suffix: &str,
) -> Option<(NodePath, NodeKind)> {
    let (relative, kind) = if let Some(relative) = key.strip_suffix(array_suffix) {
        (relative, NodeKind::Array)
    } else {
        (key.strip_suffix(group_suffix)?, NodeKind::ExplicitGroup)
    };
    if relative.is_empty() {
        Some((NodePath::root(), kind))
    } else if relative.starts_with('/') {
        NodePath::new(relative).ok().map(|path| (path, kind))
    } else {
        None
    }
}

impl<TStorage: ?Sized> Hierarchy<TStorage> {
    /// Get the underlying storage backing the hierarchy.
    #[must_use]
    pub fn storage(&self) -> Arc<TStorage> {
        self.storage.clone()
    }

    /// Get the metadata key suffix of the hierarchy.
    #[must_use]
    pub fn metadata_key_suffix(&self) -> &str {
        &self.metadata_key_suffix
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> Hierarchy<TStorage> {
    /// Create a new hierarchy in `storage` by writing the entry point metadata.
    ///
    /// The metadata key suffix is the [global default](crate::config::Config#metadata-key-suffix).
    /// An existing entry point is overwritten.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if there is a storage error.
    pub fn create(storage: Arc<TStorage>) -> Result<Self, HierarchyError> {
        let metadata_key_suffix = global_config().metadata_key_suffix().to_string();
        Self::create_with_suffix(storage, &metadata_key_suffix)
    }

    /// Create a new hierarchy in `storage` with a specific metadata key suffix.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if the metadata key suffix contains `/` or there is a storage error.
    pub fn create_with_suffix(
        storage: Arc<TStorage>,
        metadata_key_suffix: &str,
    ) -> Result<Self, HierarchyError> {
        validate_metadata_key_suffix(metadata_key_suffix)?;
        let metadata = EntryPointMetadata::new(metadata_key_suffix);
        create_entry_point(&*storage, &metadata)?;
        log::debug!("created hierarchy with metadata key suffix {metadata_key_suffix:?}");
        Ok(Self {
            storage,
            metadata_key_suffix: metadata_key_suffix.to_string(),
        })
    }

    /// Erase the node at `path` including its metadata, chunks, and all descendants.
    ///
    /// Succeeds if the node does not exist.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if `path` is invalid or there is a storage error.
    pub fn erase_node(&self, path: &str) -> Result<(), HierarchyError> {
        let path = NodePath::new(path)?;
        crate::storage::erase_node(&*self.storage, &path, &self.metadata_key_suffix)?;
        log::debug!("erased node {path}");
        Ok(())
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> Hierarchy<TStorage> {
    /// Open an existing hierarchy in `storage`.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if
    ///  - the entry point metadata is missing or invalid,
    ///  - the core protocol major version is not 3,
    ///  - the protocol or metadata encoding is not recognised,
    ///  - an extension that must be understood is present,
    ///  - the metadata key suffix contains `/`, or
    ///  - there is a storage error.
    pub fn open(storage: Arc<TStorage>) -> Result<Self, HierarchyError> {
        let metadata =
            retrieve_entry_point(&*storage)?.ok_or(HierarchyError::MissingEntryPoint)?;
        validate_entry_point(&metadata)?;
        log::debug!("opened hierarchy {}", metadata.zarr_format);
        Ok(Self {
            storage,
            metadata_key_suffix: metadata.metadata_key_suffix,
        })
    }

    /// Get the array at `path`.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NodeNotFound`] if there is no array at `path`, or another [`HierarchyError`] if the array metadata is invalid or unsupported.
    pub fn get_array(&self, path: &str) -> Result<Array<TStorage>, HierarchyError> {
        let path = NodePath::new(path)?;
        let metadata = retrieve_array(&*self.storage, &path, &self.metadata_key_suffix)?
            .ok_or_else(|| HierarchyError::NodeNotFound(path.clone()))?;
        Ok(Array::new_with_metadata(
            self.storage.clone(),
            path,
            &self.metadata_key_suffix,
            metadata,
        )?)
    }

    /// Get the explicit group at `path`.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NodeNotFound`] if there is no explicit group at `path`, or another [`HierarchyError`] if the group metadata is invalid or unsupported.
    pub fn get_explicit_group(
        &self,
        path: &str,
    ) -> Result<ExplicitGroup<TStorage>, HierarchyError> {
        let path = NodePath::new(path)?;
        let metadata = retrieve_group(&*self.storage, &path, &self.metadata_key_suffix)?
            .ok_or_else(|| HierarchyError::NodeNotFound(path.clone()))?;
        Ok(ExplicitGroup::new_with_metadata(
            self.storage.clone(),
            path,
            &self.metadata_key_suffix,
            metadata,
        )?)
    }

    fn has_metadata(&self, path: &NodePath) -> Result<Option<NodeKind>, StorageError> {
        if self
            .storage
            .get(&meta_key_array(path, &self.metadata_key_suffix))?
            .is_some()
        {
            Ok(Some(NodeKind::Array))
        } else if self
            .storage
            .get(&meta_key_group(path, &self.metadata_key_suffix))?
            .is_some()
        {
            Ok(Some(NodeKind::ExplicitGroup))
        } else {
            Ok(None)
        }
    }
}

impl<TStorage: ?Sized + ReadableListableStorageTraits> Hierarchy<TStorage> {
    /// Get the implicit group at `path`.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NodeNotFound`] if `path` holds an array or explicit group, or no key exists under `meta/root{path}/`.
    pub fn get_implicit_group(
        &self,
        path: &str,
    ) -> Result<ImplicitGroup<TStorage>, HierarchyError> {
        let path = NodePath::new(path)?;
        if self.has_metadata(&path)?.is_none() && self.has_descendants(&path)? {
            Ok(ImplicitGroup::new(self.storage.clone(), path))
        } else {
            Err(HierarchyError::NodeNotFound(path))
        }
    }

    fn has_descendants(&self, path: &NodePath) -> Result<bool, StorageError> {
        Ok(path.is_root() || prefix_exists(&*self.storage, &meta_prefix(path))?)
    }

    /// Resolve the node at `path`.
    ///
    /// # Errors
    /// Returns [`HierarchyError::NodeNotFound`] if no node exists at `path`, or another [`HierarchyError`] if the node metadata is invalid or unsupported.
    pub fn get(&self, path: &str) -> Result<Node<TStorage>, HierarchyError> {
        let path = NodePath::new(path)?;
        if let Some(metadata) = retrieve_array(&*self.storage, &path, &self.metadata_key_suffix)? {
            return Ok(Node::Array(Array::new_with_metadata(
                self.storage.clone(),
                path,
                &self.metadata_key_suffix,
                metadata,
            )?));
        }
        if let Some(metadata) = retrieve_group(&*self.storage, &path, &self.metadata_key_suffix)? {
            return Ok(Node::ExplicitGroup(ExplicitGroup::new_with_metadata(
                self.storage.clone(),
                path,
                &self.metadata_key_suffix,
                metadata,
            )?));
        }
        if self.has_descendants(&path)? {
            Ok(Node::ImplicitGroup(ImplicitGroup::new(
                self.storage.clone(),
                path,
            )))
        } else {
            Err(HierarchyError::NodeNotFound(path))
        }
    }

    /// Returns true if a node exists at `path`.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if `path` is invalid, the node metadata is invalid, or there is a storage error.
    pub fn has(&self, path: &str) -> Result<bool, HierarchyError> {
        match self.get(path) {
            Ok(_) => Ok(true),
            Err(HierarchyError::NodeNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Get the children of the node at `path`, keyed by name.
    ///
    /// Returns an empty map if the node has no children or does not exist.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if `path` is invalid or there is a storage error.
    pub fn get_children(&self, path: &str) -> Result<BTreeMap<String, NodeKind>, HierarchyError> {
        let path = NodePath::new(path)?;
        let prefix = meta_prefix(&path);
        let array_suffix = meta_key_array_suffix(&self.metadata_key_suffix);
        let group_suffix = meta_key_group_suffix(&self.metadata_key_suffix);
        let keys_prefixes = self.storage.list_dir(&prefix)?;

        let mut children = BTreeMap::new();
        for key in keys_prefixes.keys() {
            let Some(name) = key.strip_prefix(&prefix) else {
                continue;
            };
            if let Some(name) = name.strip_suffix(&array_suffix) {
                children.insert(name.to_string(), NodeKind::Array);
            } else if let Some(name) = name.strip_suffix(&group_suffix) {
                children.insert(name.to_string(), NodeKind::ExplicitGroup);
            }
        }
        for child_prefix in keys_prefixes.prefixes() {
            if let Some(name) = child_prefix
                .as_str()
                .strip_prefix(prefix.as_str())
                .and_then(|name| name.strip_suffix('/'))
            {
                children
                    .entry(name.to_string())
                    .or_insert(NodeKind::ImplicitGroup);
            }
        }
        Ok(children)
    }

    /// Get every node in the hierarchy, keyed by path.
    ///
    /// Every proper ancestor of an array or explicit group which is not itself an array or explicit group is an implicit group.
    /// The root node is always included.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if there is a storage error.
    pub fn get_nodes(&self) -> Result<BTreeMap<NodePath, NodeKind>, HierarchyError> {
        let array_suffix = meta_key_array_suffix(&self.metadata_key_suffix);
        let group_suffix = meta_key_group_suffix(&self.metadata_key_suffix);
        let meta = unsafe { StorePrefix::new_unchecked("meta/") };

        let mut nodes: BTreeMap<NodePath, NodeKind> = self
            .storage
            .list_prefix(&meta)?
            .iter()
            .filter_map(|key| key.as_str().strip_prefix("meta/root"))
            .filter_map(|key| node_from_metadata_key(key, &array_suffix, &group_suffix))
            .collect();
        let ancestors: Vec<NodePath> = nodes.keys().flat_map(NodePath::ancestors).collect();
        for ancestor in ancestors {
            nodes.entry(ancestor).or_insert(NodeKind::ImplicitGroup);
        }
        nodes
            .entry(NodePath::root())
            .or_insert(NodeKind::ImplicitGroup);
        Ok(nodes)
    }
}

impl<TStorage: ?Sized + ReadableWritableStorageTraits> Hierarchy<TStorage> {
    /// Create an array at `path` and write its metadata.
    ///
    /// An existing array at `path` is overwritten.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if
    ///  - `path` is invalid,
    ///  - an explicit group exists at `path`,
    ///  - the array metadata is invalid or unsupported, or
    ///  - there is a storage error.
    pub fn create_array(
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
        if let Some(NodeKind::ExplicitGroup) = self.has_metadata(&path)? {
            return Err(HierarchyError::NodeExists(path, NodeKind::ExplicitGroup));
        }
        array.store_metadata()?;
        log::debug!("created array {path}");
        Ok(array)
    }

    /// Create an explicit group at `path` and write its metadata.
    ///
    /// An existing explicit group at `path` is overwritten.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] if
    ///  - `path` is invalid,
    ///  - an array exists at `path`,
    ///  - the group has an unsupported extension, or
    ///  - there is a storage error.
    pub fn create_group(
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
        if let Some(NodeKind::Array) = self.has_metadata(&path)? {
            return Err(HierarchyError::NodeExists(path, NodeKind::Array));
        }
        group.store_metadata()?;
        log::debug!("created explicit group {path}");
        Ok(group)
    }
}

impl<TStorage: ?Sized> core::fmt::Debug for Hierarchy<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hierarchy")
            .field("metadata_key_suffix", &self.metadata_key_suffix)
            .finish_non_exhaustive()
    }
}
