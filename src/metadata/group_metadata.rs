use serde::{Deserialize, Serialize};

use super::ExtensionMetadata;

/// Explicit group metadata, stored at `meta/root{path}.group{suffix}`.
///
/// ```json
/// {
///     "extensions": [],
///     "attributes": {
///         "spam": "ham",
///         "eggs": 42
///     }
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
pub struct GroupMetadata {
    /// Extensions.
    #[serde(default)]
    pub extensions: Vec<ExtensionMetadata>,
    /// Optional user defined attributes.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl GroupMetadata {
    /// Create group metadata with `attributes`.
    #[must_use]
    pub fn new(attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            extensions: Vec::default(),
            attributes,
        }
    }
}
