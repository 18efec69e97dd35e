use std::io::{Cursor, Read};

use flate2::bufread::{GzDecoder, GzEncoder};

use crate::{
    array::codec::{BytesToBytesCodecTraits, CodecError, CodecPlugin},
    metadata::{CodecMetadata, MetadataConfiguration},
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::{GzipCodecConfiguration, GzipCompressionLevel, GzipCompressionLevelError};

/// The identifier of the gzip codec.
pub const IDENTIFIER: &str = "https://purl.org/zarr/spec/codec/gzip/1.0";

const SHORT_NAME: &str = "gzip";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, SHORT_NAME, create_codec_gzip)
}

fn create_codec_gzip(
    metadata: &CodecMetadata,
) -> Result<Box<dyn BytesToBytesCodecTraits>, PluginCreateError> {
    let configuration: GzipCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, metadata.clone()))?;
    Ok(Box::new(GzipCodec::new_with_configuration(&configuration)))
}

/// A `gzip` codec implementation.
#[derive(Clone, Debug)]
pub struct GzipCodec {
    compression_level: GzipCompressionLevel,
}

impl GzipCodec {
    /// Create a new `gzip` codec.
    ///
    /// # Errors
    /// Returns [`GzipCompressionLevelError`] if `compression_level` is not valid.
    pub fn new(compression_level: u32) -> Result<Self, GzipCompressionLevelError> {
        let compression_level: GzipCompressionLevel = compression_level.try_into()?;
        Ok(Self { compression_level })
    }

    /// Create a new `gzip` codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(configuration: &GzipCodecConfiguration) -> Self {
        let GzipCodecConfiguration::V1(configuration) = configuration;
        Self {
            compression_level: configuration.level,
        }
    }
}

impl BytesToBytesCodecTraits for GzipCodec {
    fn create_metadata(&self) -> CodecMetadata {
        let mut configuration = MetadataConfiguration::new();
        configuration.insert("level".to_string(), self.compression_level.as_u32().into());
        CodecMetadata::new(IDENTIFIER, Some(configuration))
    }

    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = GzEncoder::new(
            Cursor::new(decoded_value),
            flate2::Compression::new(self.compression_level.as_u32()),
        );
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(out)
    }

    fn decode(&self, encoded_value: Vec<u8>, decoded_size: usize) -> Result<Vec<u8>, CodecError> {
        let mut decoder = GzDecoder::new(Cursor::new(encoded_value));
        let mut out: Vec<u8> = Vec::with_capacity(decoded_size);
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}
