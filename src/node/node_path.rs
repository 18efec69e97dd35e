use derive_more::Display;
use thiserror::Error;

/// A hierarchy node path.
///
/// A node path is absolute: it is either the root path `/`, or a sequence of `/`-prefixed node names such as `/foo/bar`.
/// Each node name consists of the characters `[A-Za-z0-9._-]` and is not made up solely of `.` characters.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct NodePath(String);

/// An invalid node path.
#[derive(Debug, Error)]
#[error("invalid node path {0}")]
pub struct NodePathError(String);

/// Normalize a raw path into a [`NodePath`].
///
/// A leading `/` is implied if absent, so `foo/bar` and `/foo/bar` are the same path.
/// Normalization is idempotent.
///
/// # Errors
/// Returns [`NodePathError`] if `path`:
///  - is empty,
///  - has an empty node name (e.g. `/foo//bar` or `/foo/`),
///  - has a node name with characters outside `[A-Za-z0-9._-]`, or
///  - has a node name consisting solely of `.` characters.
pub fn normalize_path(path: &str) -> Result<NodePath, NodePathError> {
    if path.is_empty() {
        return Err(NodePathError(path.to_string()));
    }
    let relative = path.strip_prefix('/').unwrap_or(path);
    if relative.is_empty() {
        return Ok(NodePath::root());
    }
    if relative.split('/').all(NodePath::validate_name) {
        Ok(NodePath(format!("/{relative}")))
    } else {
        Err(NodePathError(path.to_string()))
    }
}

impl NodePath {
    /// Create a new node path from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`NodePathError`] if `path` is not valid according to [`normalize_path`].
    pub fn new(path: &str) -> Result<Self, NodePathError> {
        normalize_path(path)
    }

    /// The root node path.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns true if this is the root node path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Extracts a string slice containing the node path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name of the node, which is empty for the root node.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(_, name)| name)
    }

    /// Returns the path of the parent node, or [`None`] for the root node.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            match self.0.rsplit_once('/') {
                Some(("", _)) | None => Some(Self::root()),
                Some((parent, _)) => Some(Self(parent.to_string())),
            }
        }
    }

    /// Returns the path of the child node `name`.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if `name` is not a valid node name.
    pub fn child(&self, name: &str) -> Result<Self, NodePathError> {
        if Self::validate_name(name) {
            if self.is_root() {
                Ok(Self(format!("/{name}")))
            } else {
                Ok(Self(format!("{}/{name}", self.0)))
            }
        } else {
            Err(NodePathError(name.to_string()))
        }
    }

    /// Returns an iterator over the proper ancestors of this path, from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> {
        std::iter::successors(self.parent(), Self::parent)
    }

    /// Validates a node name: it must be non-empty, contain only `[A-Za-z0-9._-]`, and not consist solely of `.` characters.
    #[must_use]
    pub fn validate_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            && !name.chars().all(|c| c == '.')
    }
}

impl TryFrom<&str> for NodePath {
    type Error = NodePathError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl TryFrom<String> for NodePath {
    type Error = NodePathError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        Self::new(&path)
    }
}
