//! The gzip compressor.
//!
//! Applies gzip compression (RFC 1952) with [`flate2`].
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/gzip/v1.0.html>.

mod gzip_codec;
mod gzip_configuration;

pub use gzip_codec::{GzipCodec, IDENTIFIER};
pub use gzip_configuration::{
    GzipCodecConfiguration, GzipCodecConfigurationV1, GzipCompressionLevel,
    GzipCompressionLevelError,
};

#[cfg(test)]
mod tests {
    use crate::array::codec::BytesToBytesCodecTraits;

    use super::*;

    const JSON_VALID: &str = r#"{
        "level": 1
    }"#;

    #[test]
    fn codec_gzip_configuration_valid() {
        assert!(serde_json::from_str::<GzipCodecConfiguration>(JSON_VALID).is_ok());
    }

    #[test]
    fn codec_gzip_configuration_invalid() {
        const JSON_INVALID_LEVEL: &str = r#"{
            "level": 10
        }"#;
        assert!(serde_json::from_str::<GzipCodecConfiguration>(JSON_INVALID_LEVEL).is_err());
        assert!(serde_json::from_str::<GzipCodecConfiguration>("{}").is_err());
    }

    #[test]
    fn codec_gzip_round_trip() {
        let elements: Vec<u16> = (0..32).collect();
        let bytes = bytemuck::cast_slice::<u16, u8>(&elements).to_vec();

        let configuration: GzipCodecConfiguration = serde_json::from_str(JSON_VALID).unwrap();
        let codec = GzipCodec::new_with_configuration(&configuration);

        let encoded = codec.encode(bytes.clone()).unwrap();
        assert_eq!(&encoded[..2], &[0x1f, 0x8b]);
        let decoded = codec.decode(encoded, bytes.len()).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_gzip_metadata() {
        let codec = GzipCodec::new(9).unwrap();
        let metadata = codec.create_metadata();
        assert_eq!(metadata.codec(), IDENTIFIER);
        assert_eq!(
            serde_json::to_string(&metadata).unwrap(),
            r#"{"codec":"https://purl.org/zarr/spec/codec/gzip/1.0","configuration":{"level":9}}"#
        );
        assert!(GzipCodec::new(10).is_err());
    }
}
