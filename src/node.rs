//! Hierarchy nodes.
//!
//! A node in a hierarchy is either an [`Array`], an [`ExplicitGroup`] (a group with a metadata document), or an [`ImplicitGroup`] (a group inferred from the existence of descendant nodes).
//!
//! Nodes are resolved from a store by [`Hierarchy::get`](crate::hierarchy::Hierarchy::get).

mod node_path;

pub use node_path::{normalize_path, NodePath, NodePathError};

use derive_more::Display;

use crate::{
    array::Array,
    group::{ExplicitGroup, ImplicitGroup},
};

/// A hierarchy node.
pub enum Node<TStorage: ?Sized> {
    /// An array.
    Array(Array<TStorage>),
    /// A group with a metadata document.
    ExplicitGroup(ExplicitGroup<TStorage>),
    /// A group without a metadata document.
    ImplicitGroup(ImplicitGroup<TStorage>),
}

/// The kind of a hierarchy node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum NodeKind {
    /// An array.
    #[display("array")]
    Array,
    /// A group with a metadata document.
    #[display("explicit group")]
    ExplicitGroup,
    /// A group without a metadata document.
    #[display("implicit group")]
    ImplicitGroup,
}

impl NodeKind {
    /// Returns true if the node is a group (explicit or implicit).
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self, Self::ExplicitGroup | Self::ImplicitGroup)
    }
}

impl<TStorage: ?Sized> Node<TStorage> {
    /// Returns the path of the node.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        match self {
            Self::Array(array) => array.path(),
            Self::ExplicitGroup(group) => group.path(),
            Self::ImplicitGroup(group) => group.path(),
        }
    }

    /// Returns the kind of the node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Array(_) => NodeKind::Array,
            Self::ExplicitGroup(_) => NodeKind::ExplicitGroup,
            Self::ImplicitGroup(_) => NodeKind::ImplicitGroup,
        }
    }

    /// Returns the array if the node is an array.
    #[must_use]
    pub fn into_array(self) -> Option<Array<TStorage>> {
        match self {
            Self::Array(array) => Some(array),
            Self::ExplicitGroup(_) | Self::ImplicitGroup(_) => None,
        }
    }
}

impl<TStorage: ?Sized> core::fmt::Debug for Node<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Array(array) => f.debug_tuple("Array").field(array).finish(),
            Self::ExplicitGroup(group) => f.debug_tuple("ExplicitGroup").field(group).finish(),
            Self::ImplicitGroup(group) => f.debug_tuple("ImplicitGroup").field(group).finish(),
        }
    }
}
