use crate::{
    array::{byte_swap, DataType},
    metadata::CodecMetadata,
    plugin::PluginCreateError,
};

use super::{compressor_from_metadata, BytesToBytesCodecTraits, CodecError};

/// The codec pipeline of an array chunk.
///
/// Decoded chunks hold elements in native byte order.
/// Encoded chunks hold elements in the byte order of the data type, optionally compressed.
#[derive(Clone, Debug)]
pub struct ChunkCodecPipeline {
    data_type: DataType,
    compressor: Option<Box<dyn BytesToBytesCodecTraits>>,
}

impl ChunkCodecPipeline {
    /// Create a new chunk codec pipeline.
    #[must_use]
    pub fn new(data_type: DataType, compressor: Option<Box<dyn BytesToBytesCodecTraits>>) -> Self {
        Self {
            data_type,
            compressor,
        }
    }

    /// Create a new chunk codec pipeline from optional compressor metadata.
    ///
    /// # Errors
    /// Returns a [`PluginCreateError`] if the compressor is unsupported or its configuration is invalid.
    pub fn from_metadata(
        data_type: DataType,
        compressor: Option<&CodecMetadata>,
    ) -> Result<Self, PluginCreateError> {
        let compressor = compressor.map(compressor_from_metadata).transpose()?;
        Ok(Self::new(data_type, compressor))
    }

    /// The data type of chunk elements.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// The compressor, if any.
    #[must_use]
    pub fn compressor(&self) -> Option<&(dyn BytesToBytesCodecTraits + 'static)> {
        self.compressor.as_deref()
    }

    /// Encode a chunk of native byte order elements.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if compression fails.
    pub fn encode(&self, mut decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        if self.data_type.needs_byte_swap() {
            byte_swap(&mut decoded_value, self.data_type.size());
        }
        match &self.compressor {
            Some(compressor) => compressor.encode(decoded_value),
            None => Ok(decoded_value),
        }
    }

    /// Decode an encoded chunk of `num_elements` elements into native byte order.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if decompression fails or the decoded size is not `num_elements` times the data type size.
    pub fn decode(&self, encoded_value: Vec<u8>, num_elements: usize) -> Result<Vec<u8>, CodecError> {
        let decoded_size = num_elements * self.data_type.size();
        let mut decoded_value = match &self.compressor {
            Some(compressor) => compressor.decode(encoded_value, decoded_size)?,
            None => encoded_value,
        };
        if decoded_value.len() != decoded_size {
            return Err(CodecError::UnexpectedChunkDecodedSize(
                decoded_value.len(),
                decoded_size,
            ));
        }
        if self.data_type.needs_byte_swap() {
            byte_swap(&mut decoded_value, self.data_type.size());
        }
        Ok(decoded_value)
    }
}
