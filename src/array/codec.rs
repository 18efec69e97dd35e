//! Chunk codecs.
//!
//! A chunk is encoded by byte swapping its elements into the byte order of the array [data type](super::DataType) and then (optionally) compressing them.
//! Decoding reverses these steps. See [`ChunkCodecPipeline`].
//!
//! Compressors are `bytes->bytes` codecs implementing [`BytesToBytesCodecTraits`].
//! They are registered at compile time as [`CodecPlugin`]s and created from [`CodecMetadata`] with [`compressor_from_metadata`].
//!
//! Built-in compressors:
//!  - `gzip` (feature `gzip`): <https://purl.org/zarr/spec/codec/gzip/1.0>,
//!  - `zstd` (feature `zstd`): <https://purl.org/zarr/spec/codec/zstd/1.0>.

mod chunk_codec_pipeline;

#[cfg(feature = "gzip")]
pub mod gzip;
#[cfg(feature = "zstd")]
pub mod zstd;

pub use chunk_codec_pipeline::ChunkCodecPipeline;

#[cfg(feature = "gzip")]
pub use gzip::{GzipCodec, GzipCodecConfiguration, GzipCompressionLevel};
#[cfg(feature = "zstd")]
pub use zstd::{ZstdCodec, ZstdCodecConfiguration, ZstdCompressionLevel};

use thiserror::Error;

use crate::{
    metadata::CodecMetadata,
    plugin::{Plugin, PluginCreateError},
};

/// A compressor plugin.
pub type CodecPlugin = Plugin;
inventory::collect!(CodecPlugin);

/// Create a compressor from metadata.
///
/// The registered [`CodecPlugin`] matching the codec identifier (or its short name) creates the compressor.
///
/// # Errors
/// Returns [`PluginCreateError::Unsupported`] if no registered compressor matches, or [`PluginCreateError::MetadataInvalid`] if the configuration is invalid.
pub fn compressor_from_metadata(
    metadata: &CodecMetadata,
) -> Result<Box<dyn BytesToBytesCodecTraits>, PluginCreateError> {
    for plugin in inventory::iter::<CodecPlugin> {
        if plugin.matches(metadata.codec()) {
            return plugin.create(metadata);
        }
    }
    Err(PluginCreateError::Unsupported(metadata.codec().to_string()))
}

/// Traits for `bytes->bytes` codecs (compressors).
pub trait BytesToBytesCodecTraits: dyn_clone::DynClone + core::fmt::Debug + Send + Sync {
    /// Create metadata for the codec.
    fn create_metadata(&self) -> CodecMetadata;

    /// Encode chunk bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if a codec fails.
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError>;

    /// Decode chunk bytes.
    ///
    /// `decoded_size` is the expected size of the decoded bytes, which a codec may use as a capacity hint.
    ///
    /// # Errors
    /// Returns [`CodecError`] if a codec fails.
    fn decode(&self, encoded_value: Vec<u8>, decoded_size: usize) -> Result<Vec<u8>, CodecError>;
}

dyn_clone::clone_trait_object!(BytesToBytesCodecTraits);

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An unexpected chunk decoded size.
    #[error("got chunk decoded size {_0:?}, expected {_1:?}")]
    UnexpectedChunkDecodedSize(usize, usize),
    /// Any other error.
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for CodecError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for CodecError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressor_unsupported() {
        let metadata = CodecMetadata::new("https://purl.org/zarr/spec/codec/blosc/1.0", None);
        assert!(matches!(
            compressor_from_metadata(&metadata),
            Err(PluginCreateError::Unsupported(_))
        ));
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn compressor_short_name() {
        let metadata: CodecMetadata =
            serde_json::from_str(r#"{"codec": "gzip", "configuration": {"level": 5}}"#).unwrap();
        let compressor = compressor_from_metadata(&metadata).unwrap();
        assert_eq!(compressor.create_metadata().codec(), gzip::IDENTIFIER);
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn compressor_invalid_configuration() {
        let metadata: CodecMetadata = serde_json::from_str(
            r#"{"codec": "https://purl.org/zarr/spec/codec/gzip/1.0", "configuration": {"level": 10}}"#,
        )
        .unwrap();
        assert!(matches!(
            compressor_from_metadata(&metadata),
            Err(PluginCreateError::MetadataInvalid(_))
        ));
    }
}
