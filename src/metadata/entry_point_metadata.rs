use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::ExtensionMetadata;

/// The URI prefix of the Zarr core protocol.
pub const ZARR_PROTOCOL_CORE_PREFIX: &str = "https://purl.org/zarr/spec/protocol/core/";

/// The URI of the Zarr core protocol version 3.0.
pub const ZARR_PROTOCOL_CORE_3_0: &str = "https://purl.org/zarr/spec/protocol/core/3.0";

/// Entry point metadata, stored at `zarr.json` at the root of a hierarchy.
///
/// ```json
/// {
///     "zarr_format": "https://purl.org/zarr/spec/protocol/core/3.0",
///     "metadata_encoding": "https://purl.org/zarr/spec/protocol/core/3.0",
///     "metadata_key_suffix": ".json",
///     "extensions": []
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct EntryPointMetadata {
    /// The protocol identifier and version, as a URI.
    pub zarr_format: String,
    /// The metadata encoding identifier, as a URI.
    pub metadata_encoding: String,
    /// The suffix appended to every node metadata key.
    pub metadata_key_suffix: String,
    /// Hierarchy-wide extensions.
    #[serde(default)]
    pub extensions: Vec<ExtensionMetadata>,
}

impl EntryPointMetadata {
    /// Create entry point metadata for the core protocol 3.0 with a given metadata key suffix.
    #[must_use]
    pub fn new(metadata_key_suffix: impl Into<String>) -> Self {
        Self {
            zarr_format: ZARR_PROTOCOL_CORE_3_0.to_string(),
            metadata_encoding: ZARR_PROTOCOL_CORE_3_0.to_string(),
            metadata_key_suffix: metadata_key_suffix.into(),
            extensions: Vec::default(),
        }
    }

    /// The protocol version in `zarr_format`, if it is a core protocol URI.
    #[must_use]
    pub fn protocol_version(&self) -> Option<ProtocolVersion> {
        ProtocolVersion::from_uri(&self.zarr_format)
    }

    /// The protocol version in `metadata_encoding`, if it is a core protocol URI.
    #[must_use]
    pub fn metadata_encoding_version(&self) -> Option<ProtocolVersion> {
        ProtocolVersion::from_uri(&self.metadata_encoding)
    }
}

/// A core protocol version, e.g. `3.0`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display("{major}.{minor}")]
pub struct ProtocolVersion {
    /// The major version.
    pub major: u64,
    /// The minor version.
    pub minor: u64,
}

impl ProtocolVersion {
    /// Parse a version from a core protocol URI such as `https://purl.org/zarr/spec/protocol/core/3.0`.
    ///
    /// Returns [`None`] if `uri` is not a core protocol URI or the version is malformed.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        let version = uri.strip_prefix(ZARR_PROTOCOL_CORE_PREFIX)?;
        let (major, minor) = version.split_once('.').unwrap_or((version, "0"));
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_point_round_trip() {
        const JSON: &str = r#"{
            "zarr_format": "https://purl.org/zarr/spec/protocol/core/3.0",
            "metadata_encoding": "https://purl.org/zarr/spec/protocol/core/3.0",
            "metadata_key_suffix": ".json",
            "extensions": []
        }"#;
        let metadata: EntryPointMetadata = serde_json::from_str(JSON).unwrap();
        assert_eq!(metadata, EntryPointMetadata::new(".json"));
        assert_eq!(
            metadata.protocol_version(),
            Some(ProtocolVersion { major: 3, minor: 0 })
        );
    }

    #[test]
    fn protocol_version_parse() {
        assert_eq!(
            ProtocolVersion::from_uri("https://purl.org/zarr/spec/protocol/core/4.1")
                .unwrap()
                .to_string(),
            "4.1"
        );
        assert_eq!(
            ProtocolVersion::from_uri("https://purl.org/zarr/spec/protocol/core/3"),
            Some(ProtocolVersion { major: 3, minor: 0 })
        );
        assert!(ProtocolVersion::from_uri("https://example.com/3.0").is_none());
        assert!(ProtocolVersion::from_uri("https://purl.org/zarr/spec/protocol/core/x.0").is_none());
    }
}
