//! Metadata documents.
//!
//! A hierarchy stores three kinds of JSON metadata documents:
//!  - the [entry point](EntryPointMetadata) at `zarr.json`,
//!  - [array metadata](ArrayMetadata) at `meta/root{path}.array{suffix}`, and
//!  - [group metadata](GroupMetadata) at `meta/root{path}.group{suffix}`.
//!
//! Each document may carry a list of [extensions](ExtensionMetadata).
//! An extension that is not recognised is ignored unless it is flagged `"must_understand": true`.

mod array_metadata;
mod entry_point_metadata;
mod fill_value_metadata;
mod group_metadata;

pub use array_metadata::{ArrayMetadata, ChunkGridMetadata};
pub use entry_point_metadata::{
    EntryPointMetadata, ProtocolVersion, ZARR_PROTOCOL_CORE_3_0, ZARR_PROTOCOL_CORE_PREFIX,
};
pub use fill_value_metadata::FillValueMetadata;
pub use group_metadata::GroupMetadata;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Configuration metadata.
pub type MetadataConfiguration = serde_json::Map<String, serde_json::Value>;

/// Compressor metadata: a codec identifier with an optional configuration.
///
/// For example:
/// ```json
/// {
///     "codec": "https://purl.org/zarr/spec/codec/gzip/1.0",
///     "configuration": {
///         "level": 1
///     }
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct CodecMetadata {
    codec: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    configuration: Option<MetadataConfiguration>,
}

impl core::fmt::Display for CodecMetadata {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(configuration) = &self.configuration {
            write!(
                f,
                "{} {}",
                self.codec,
                serde_json::to_string(configuration).unwrap_or_default()
            )
        } else {
            write!(f, "{}", self.codec)
        }
    }
}

impl CodecMetadata {
    /// Create codec metadata from a codec identifier and an optional configuration.
    #[must_use]
    pub fn new(codec: impl Into<String>, configuration: Option<MetadataConfiguration>) -> Self {
        Self {
            codec: codec.into(),
            configuration,
        }
    }

    /// The codec identifier.
    #[must_use]
    pub fn codec(&self) -> &str {
        &self.codec
    }

    /// The codec configuration.
    #[must_use]
    pub const fn configuration(&self) -> Option<&MetadataConfiguration> {
        self.configuration.as_ref()
    }

    /// Convert the configuration to a specific configuration type.
    ///
    /// An absent configuration is treated as an empty JSON object.
    ///
    /// # Errors
    /// Returns a [`serde_json::Error`] if the configuration cannot be deserialized into `TConfiguration`.
    pub fn to_configuration<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, serde_json::Error> {
        let configuration = self.configuration.clone().unwrap_or_default();
        serde_json::from_value(serde_json::Value::Object(configuration))
    }
}

/// An extension declared in entry point, array, or group metadata.
///
/// ```json
/// {
///     "extension": "https://purl.org/zarr/spec/extension/example/1.0",
///     "must_understand": false,
///     "example_field": 1
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ExtensionMetadata {
    /// The extension identifier.
    pub extension: String,
    /// If true, an implementation that does not recognise the extension must fail.
    pub must_understand: bool,
    /// Any other extension fields.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ExtensionMetadata {
    /// Create a new extension declaration without additional fields.
    #[must_use]
    pub fn new(extension: impl Into<String>, must_understand: bool) -> Self {
        Self {
            extension: extension.into(),
            must_understand,
            fields: serde_json::Map::default(),
        }
    }
}

/// An unsupported extension error.
///
/// An unsupported extension is an unrecognised extension with `"must_understand": true`.
#[derive(Debug, Error)]
#[error("unsupported extension {0} must be understood")]
pub struct UnsupportedExtensionError(String);

impl UnsupportedExtensionError {
    /// Return the identifier of the unsupported extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.0
    }
}

/// Checks that every extension in `extensions` can be safely ignored.
///
/// No extensions are currently recognised, so any extension with `"must_understand": true` is rejected.
/// Optional extensions are skipped with a warning.
///
/// # Errors
/// Returns an [`UnsupportedExtensionError`] for the first mandatory extension.
pub fn validate_extensions(
    extensions: &[ExtensionMetadata],
) -> Result<(), UnsupportedExtensionError> {
    for extension in extensions {
        if extension.must_understand {
            return Err(UnsupportedExtensionError(extension.extension.clone()));
        }
        log::warn!("ignoring unrecognised extension {}", extension.extension);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_metadata_configuration() {
        let metadata: CodecMetadata = serde_json::from_str(
            r#"{"codec": "https://purl.org/zarr/spec/codec/gzip/1.0", "configuration": {"level": 1}}"#,
        )
        .unwrap();
        assert_eq!(metadata.codec(), "https://purl.org/zarr/spec/codec/gzip/1.0");
        assert_eq!(
            metadata.to_string(),
            r#"https://purl.org/zarr/spec/codec/gzip/1.0 {"level":1}"#
        );

        let metadata: CodecMetadata = serde_json::from_str(r#"{"codec": "gzip"}"#).unwrap();
        assert!(metadata.configuration().is_none());
        assert_eq!(serde_json::to_string(&metadata).unwrap(), r#"{"codec":"gzip"}"#);
    }

    #[test]
    fn extensions_optional() {
        let extensions: Vec<ExtensionMetadata> = serde_json::from_str(
            r#"[{"extension": "https://example.com/ext", "must_understand": false, "value": 1}]"#,
        )
        .unwrap();
        assert_eq!(extensions[0].fields["value"], 1);
        assert!(validate_extensions(&extensions).is_ok());
    }

    #[test]
    fn extensions_mandatory() {
        let extensions = vec![
            ExtensionMetadata::new("https://example.com/a", false),
            ExtensionMetadata::new("https://example.com/b", true),
        ];
        let err = validate_extensions(&extensions).unwrap_err();
        assert_eq!(err.extension(), "https://example.com/b");
    }

    #[test]
    fn extensions_must_understand_required() {
        assert!(serde_json::from_str::<ExtensionMetadata>(r#"{"extension": "a"}"#).is_err());
    }
}
