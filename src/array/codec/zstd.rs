//! The zstd compressor.
//!
//! Applies zstd compression (RFC 8878), optionally with a content checksum which is verified on decoding.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/zstd/v1.0.html>.

mod zstd_codec;
mod zstd_configuration;

pub use zstd_codec::{ZstdCodec, IDENTIFIER};
pub use zstd_configuration::{
    ZstdCodecConfiguration, ZstdCodecConfigurationV1, ZstdCompressionLevel,
};

#[cfg(test)]
mod tests {
    use crate::array::codec::{BytesToBytesCodecTraits, CodecError};

    use super::*;

    const JSON_VALID: &str = r#"{
        "level": 22,
        "checksum": false
    }"#;

    #[test]
    fn codec_zstd_configuration() {
        assert!(serde_json::from_str::<ZstdCodecConfiguration>(JSON_VALID).is_ok());
        assert!(serde_json::from_str::<ZstdCodecConfiguration>(r#"{"level": -131072, "checksum": true}"#).is_ok());
        assert!(serde_json::from_str::<ZstdCodecConfiguration>(r#"{"level": 5}"#).is_err());
        assert!(serde_json::from_str::<ZstdCodecConfiguration>(r#"{"level": 23, "checksum": true}"#).is_err());
        assert!(serde_json::from_str::<ZstdCodecConfiguration>(r#"{"level": -131073, "checksum": true}"#).is_err());
    }

    #[test]
    fn codec_zstd_round_trip() {
        let elements: Vec<u16> = (0..32).collect();
        let bytes = bytemuck::cast_slice::<u16, u8>(&elements).to_vec();

        let configuration: ZstdCodecConfiguration = serde_json::from_str(JSON_VALID).unwrap();
        let codec = ZstdCodec::new_with_configuration(&configuration);

        let encoded = codec.encode(bytes.clone()).unwrap();
        let decoded = codec.decode(encoded, bytes.len()).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_zstd_checksum() {
        let bytes: Vec<u8> = (0..255).collect();
        let codec = ZstdCodec::new(3, true);
        let mut encoded = codec.encode(bytes.clone()).unwrap();
        assert_eq!(codec.decode(encoded.clone(), bytes.len()).unwrap(), bytes);

        // The checksum is the last 4 bytes of the frame.
        let last = encoded.len() - 1;
        encoded[last] ^= 0xff;
        assert!(matches!(
            codec.decode(encoded, bytes.len()),
            Err(CodecError::IOError(_))
        ));
    }

    #[test]
    fn codec_zstd_metadata() {
        let metadata = ZstdCodec::new(5, true).create_metadata();
        assert_eq!(
            serde_json::to_string(&metadata).unwrap(),
            r#"{"codec":"https://purl.org/zarr/spec/codec/zstd/1.0","configuration":{"level":5,"checksum":true}}"#
        );
    }
}
