use serde::{Deserialize, Serialize};

use crate::array::ChunkKeySeparator;

use super::{CodecMetadata, ExtensionMetadata, FillValueMetadata};

/// Array metadata, stored at `meta/root{path}.array{suffix}`.
///
/// An example `JSON` document for an array:
/// ```json
/// {
///     "shape": [10000, 1000],
///     "data_type": "<f8",
///     "chunk_grid": {
///         "type": "regular",
///         "separator": "/",
///         "chunk_shape": [1000, 100]
///     },
///     "chunk_memory_layout": "C",
///     "compressor": {
///         "codec": "https://purl.org/zarr/spec/codec/gzip/1.0",
///         "configuration": {
///             "level": 1
///         }
///     },
///     "fill_value": "NaN",
///     "extensions": [],
///     "attributes": {
///         "foo": 42,
///         "bar": "apples",
///         "baz": [1, 2, 3, 4]
///     }
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ArrayMetadata {
    /// The length of each dimension of the array.
    pub shape: Vec<u64>,
    /// The data type token, e.g. `<f8`, `>i4` or `u1`.
    pub data_type: String,
    /// The chunk grid.
    pub chunk_grid: ChunkGridMetadata,
    /// The memory layout of chunk elements. Only `"C"` (row-major) is supported.
    pub chunk_memory_layout: String,
    /// The fill value of unwritten chunks.
    #[serde(default)]
    pub fill_value: FillValueMetadata,
    /// An optional compressor applied to encoded chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressor: Option<CodecMetadata>,
    /// Extensions.
    #[serde(default)]
    pub extensions: Vec<ExtensionMetadata>,
    /// Optional user defined attributes.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Chunk grid metadata.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ChunkGridMetadata {
    /// The chunk grid type. Only `"regular"` is supported.
    #[serde(rename = "type")]
    pub grid_type: String,
    /// The separator joining chunk grid coordinates in chunk keys.
    #[serde(default)]
    pub separator: ChunkKeySeparator,
    /// The shape of every chunk.
    pub chunk_shape: Vec<u64>,
}

impl ChunkGridMetadata {
    /// Create regular chunk grid metadata.
    #[must_use]
    pub fn regular(chunk_shape: Vec<u64>, separator: ChunkKeySeparator) -> Self {
        Self {
            grid_type: "regular".to_string(),
            separator,
            chunk_shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_metadata_parse() {
        let json = r#"{
            "shape": [10000, 1000],
            "data_type": "<f8",
            "chunk_grid": {
                "type": "regular",
                "separator": "/",
                "chunk_shape": [1000, 100]
            },
            "chunk_memory_layout": "C",
            "compressor": {
                "codec": "https://purl.org/zarr/spec/codec/gzip/1.0",
                "configuration": {
                    "level": 1
                }
            },
            "fill_value": "NaN",
            "extensions": [],
            "attributes": {
                "foo": 42,
                "bar": "apples",
                "baz": [1, 2, 3, 4]
            }
        }"#;
        let metadata: ArrayMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.shape, vec![10000, 1000]);
        assert_eq!(
            metadata.chunk_grid,
            ChunkGridMetadata::regular(vec![1000, 100], ChunkKeySeparator::Slash)
        );
        assert!(metadata.fill_value.try_as_f64().unwrap().is_nan());
        assert_eq!(metadata.attributes["bar"], "apples");

        let round_trip: ArrayMetadata =
            serde_json::from_str(&serde_json::to_string(&metadata).unwrap()).unwrap();
        assert_eq!(round_trip.compressor, metadata.compressor);
        assert_eq!(round_trip.chunk_grid, metadata.chunk_grid);
    }

    #[test]
    fn array_metadata_minimal() {
        let json = r#"{
            "shape": [4],
            "data_type": "u1",
            "chunk_grid": {"type": "regular", "separator": ".", "chunk_shape": [2]},
            "chunk_memory_layout": "C",
            "fill_value": null
        }"#;
        let metadata: ArrayMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.chunk_grid.separator, ChunkKeySeparator::Dot);
        assert!(metadata.compressor.is_none());
        assert!(metadata.fill_value.is_null());
        assert!(!serde_json::to_string(&metadata)
            .unwrap()
            .contains("compressor"));
    }
}
