use std::io::Write;

use zstd::zstd_safe;

use crate::{
    array::codec::{BytesToBytesCodecTraits, CodecError, CodecPlugin},
    metadata::{CodecMetadata, MetadataConfiguration},
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::ZstdCodecConfiguration;

/// The identifier of the zstd codec.
pub const IDENTIFIER: &str = "https://purl.org/zarr/spec/codec/zstd/1.0";

const SHORT_NAME: &str = "zstd";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, SHORT_NAME, create_codec_zstd)
}

fn create_codec_zstd(
    metadata: &CodecMetadata,
) -> Result<Box<dyn BytesToBytesCodecTraits>, PluginCreateError> {
    let configuration: ZstdCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, metadata.clone()))?;
    Ok(Box::new(ZstdCodec::new_with_configuration(&configuration)))
}

/// A zstd codec implementation.
#[derive(Clone, Debug)]
pub struct ZstdCodec {
    compression: zstd_safe::CompressionLevel,
    checksum: bool,
}

impl ZstdCodec {
    /// Create a new zstd codec.
    #[must_use]
    pub const fn new(compression: zstd_safe::CompressionLevel, checksum: bool) -> Self {
        Self {
            compression,
            checksum,
        }
    }

    /// Create a new zstd codec from configuration.
    #[must_use]
    pub fn new_with_configuration(configuration: &ZstdCodecConfiguration) -> Self {
        let ZstdCodecConfiguration::V1(configuration) = configuration;
        Self {
            compression: configuration.level.into(),
            checksum: configuration.checksum,
        }
    }
}

impl BytesToBytesCodecTraits for ZstdCodec {
    fn create_metadata(&self) -> CodecMetadata {
        let mut configuration = MetadataConfiguration::new();
        configuration.insert("level".to_string(), self.compression.into());
        configuration.insert("checksum".to_string(), self.checksum.into());
        CodecMetadata::new(IDENTIFIER, Some(configuration))
    }

    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = zstd::Encoder::new(Vec::new(), self.compression)?;
        encoder.include_checksum(self.checksum)?;
        encoder.write_all(&decoded_value)?;
        Ok(encoder.finish()?)
    }

    fn decode(&self, encoded_value: Vec<u8>, _decoded_size: usize) -> Result<Vec<u8>, CodecError> {
        zstd::decode_all(encoded_value.as_slice()).map_err(CodecError::IOError)
    }
}
