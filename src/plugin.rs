//! Compressor registration.
//!
//! Compressors are registered at compile time as [`Plugin`]s using the [inventory] crate.
//! A plugin is matched against [`CodecMetadata`] by the codec identifier (a URI such as `https://purl.org/zarr/spec/codec/gzip/1.0`) or by its short name (`gzip`).

use thiserror::Error;

use crate::{array::codec::BytesToBytesCodecTraits, metadata::CodecMetadata};

/// Creates a compressor from its metadata.
pub type PluginCreateFn =
    fn(metadata: &CodecMetadata) -> Result<Box<dyn BytesToBytesCodecTraits>, PluginCreateError>;

/// A registered compressor.
pub struct Plugin {
    identifier: &'static str,
    short_name: &'static str,
    create_fn: PluginCreateFn,
}

/// Compressor metadata with an invalid configuration.
#[derive(Debug, Error)]
#[error("codec {identifier} does not accept the metadata {metadata}")]
pub struct PluginMetadataInvalidError {
    identifier: &'static str,
    metadata: Box<CodecMetadata>,
}

impl PluginMetadataInvalidError {
    /// Create a new [`PluginMetadataInvalidError`].
    #[must_use]
    pub fn new(identifier: &'static str, metadata: CodecMetadata) -> Self {
        Self {
            identifier,
            metadata: Box::new(metadata),
        }
    }
}

/// A compressor creation error.
#[derive(Debug, Error)]
pub enum PluginCreateError {
    /// No registered compressor matches the codec name.
    #[error("codec {0} is not supported")]
    Unsupported(String),
    /// The configuration is invalid.
    #[error(transparent)]
    MetadataInvalid(#[from] PluginMetadataInvalidError),
}

impl Plugin {
    /// Create a new plugin for registration.
    pub const fn new(
        identifier: &'static str,
        short_name: &'static str,
        create_fn: PluginCreateFn,
    ) -> Self {
        Self {
            identifier,
            short_name,
            create_fn,
        }
    }

    /// Create a compressor from `metadata`.
    ///
    /// # Errors
    /// Returns [`PluginCreateError::MetadataInvalid`] if the configuration is invalid.
    pub fn create(
        &self,
        metadata: &CodecMetadata,
    ) -> Result<Box<dyn BytesToBytesCodecTraits>, PluginCreateError> {
        (self.create_fn)(metadata)
    }

    /// Returns true if `codec` is the identifier or the short name of this plugin.
    #[must_use]
    pub fn matches(&self, codec: &str) -> bool {
        codec == self.identifier || codec == self.short_name
    }

    /// The codec identifier.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        self.identifier
    }

    /// The codec short name.
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        self.short_name
    }
}
