use std::sync::Arc;

use crate::{
    config::global_config,
    metadata::{
        ArrayMetadata, ChunkGridMetadata, ExtensionMetadata, FillValueMetadata,
    },
    node::NodePath,
};

use super::{codec::BytesToBytesCodecTraits, Array, ArrayCreateError, ArrayShape, ChunkKeySeparator};

/// An [`Array`] builder.
///
/// The array builder is initialised from an array shape, data type, chunk shape, and fill value.
///  - There is no compressor by default, so chunks are stored uncompressed.
///  - The default chunk key separator is `/`.
///  - Attributes and extensions are empty.
///
/// Use the methods in the array builder to change the configuration away from these defaults, and then build the array at a path of some storage with [`ArrayBuilder::build`].
/// Note that [`build`](ArrayBuilder::build) does not modify the store; the array metadata has to be explicitly written with [`Array::store_metadata`].
/// Alternatively, pass [`build_metadata`](ArrayBuilder::build_metadata) to [`Hierarchy::create_array`](crate::hierarchy::Hierarchy::create_array).
///
/// For example:
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # use std::sync::Arc;
/// use zarrs_core::array::ArrayBuilder;
/// # let store = Arc::new(zarrs_core::storage::store::MemoryStore::new());
/// let array = ArrayBuilder::new(
///     vec![8, 8], // array shape
///     "<f4",      // data type
///     vec![4, 4], // chunk shape
///     f32::NAN.into(),
/// )
/// .attributes(serde_json::json!({"units": "m"}).as_object().cloned().unwrap_or_default())
/// .build(store.clone(), "/group/array")?;
/// array.store_metadata()?; // write metadata to the store
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArrayBuilder {
    /// Array shape.
    pub shape: ArrayShape,
    /// Data type token.
    pub data_type: String,
    /// Chunk shape.
    pub chunk_shape: ArrayShape,
    /// Chunk key separator.
    pub separator: ChunkKeySeparator,
    /// Fill value.
    pub fill_value: FillValueMetadata,
    /// Compressor.
    pub compressor: Option<Box<dyn BytesToBytesCodecTraits>>,
    /// Extensions.
    pub extensions: Vec<ExtensionMetadata>,
    /// Attributes.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ArrayBuilder {
    /// Create a new array builder.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        data_type: &str,
        chunk_shape: ArrayShape,
        fill_value: FillValueMetadata,
    ) -> Self {
        Self {
            shape,
            data_type: data_type.to_string(),
            chunk_shape,
            separator: ChunkKeySeparator::default(),
            fill_value,
            compressor: None,
            extensions: Vec::default(),
            attributes: serde_json::Map::default(),
        }
    }

    /// Create a new builder copying the configuration of an existing array.
    #[must_use]
    pub fn from_array<T: ?Sized>(array: &Array<T>) -> Self {
        let mut builder = Self::new(
            array.shape().to_vec(),
            &array.data_type().to_string(),
            array.chunk_shape().to_vec(),
            array.fill_value_metadata().clone(),
        );
        builder
            .separator(array.separator())
            .compressor(array.codecs().compressor().map(dyn_clone::clone_box))
            .extensions(array.extensions().to_vec())
            .attributes(array.attributes().clone());
        builder
    }

    /// Set the shape.
    pub fn shape(&mut self, shape: ArrayShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Set the data type.
    pub fn data_type(&mut self, data_type: &str) -> &mut Self {
        self.data_type = data_type.to_string();
        self
    }

    /// Set the chunk shape.
    pub fn chunk_shape(&mut self, chunk_shape: ArrayShape) -> &mut Self {
        self.chunk_shape = chunk_shape;
        self
    }

    /// Set the chunk key separator.
    pub fn separator(&mut self, separator: ChunkKeySeparator) -> &mut Self {
        self.separator = separator;
        self
    }

    /// Set the fill value.
    pub fn fill_value(&mut self, fill_value: FillValueMetadata) -> &mut Self {
        self.fill_value = fill_value;
        self
    }

    /// Set the compressor.
    ///
    /// If left unmodified, chunks are stored uncompressed.
    pub fn compressor(
        &mut self,
        compressor: Option<Box<dyn BytesToBytesCodecTraits>>,
    ) -> &mut Self {
        self.compressor = compressor;
        self
    }

    /// Set the extensions.
    pub fn extensions(&mut self, extensions: Vec<ExtensionMetadata>) -> &mut Self {
        self.extensions = extensions;
        self
    }

    /// Set the user defined attributes.
    ///
    /// If left unmodified, the user defined attributes of the array will be empty.
    pub fn attributes(
        &mut self,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Build into [`ArrayMetadata`].
    ///
    /// The metadata is not validated until it is used to create an [`Array`].
    #[must_use]
    pub fn build_metadata(&self) -> ArrayMetadata {
        ArrayMetadata {
            shape: self.shape.clone(),
            data_type: self.data_type.clone(),
            chunk_grid: ChunkGridMetadata::regular(self.chunk_shape.clone(), self.separator),
            chunk_memory_layout: "C".to_string(),
            fill_value: self.fill_value.clone(),
            compressor: self
                .compressor
                .as_ref()
                .map(|compressor| compressor.create_metadata()),
            extensions: self.extensions.clone(),
            attributes: self.attributes.clone(),
        }
    }

    /// Build into an [`Array`] at `path` of `storage`.
    ///
    /// The array uses the metadata key suffix of the [global configuration](crate::config::Config).
    /// This does not write to the store, use [`store_metadata`](Array<WritableStorageTraits>::store_metadata) to write metadata to `storage`.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if `path` is invalid or the array metadata is invalid or unsupported.
    pub fn build<TStorage: ?Sized>(
        &self,
        storage: Arc<TStorage>,
        path: &str,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        let path = NodePath::new(path)?;
        let metadata_key_suffix = global_config().metadata_key_suffix().to_string();
        Array::new_with_metadata(storage, path, &metadata_key_suffix, self.build_metadata())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::store::MemoryStore;

    use super::*;

    #[test]
    fn array_builder() {
        let mut builder = ArrayBuilder::new(vec![8, 8], "<i2", vec![2, 2], 0i16.into());
        builder.separator(ChunkKeySeparator::Dot);
        let mut attributes = serde_json::Map::new();
        attributes.insert("key".to_string(), "value".into());
        builder.attributes(attributes.clone());

        let storage = Arc::new(MemoryStore::new());
        let array = builder.build(storage, "/array").unwrap();
        assert_eq!(array.shape(), &[8, 8]);
        assert_eq!(array.chunk_shape(), &[2, 2]);
        assert_eq!(array.separator(), ChunkKeySeparator::Dot);
        assert_eq!(array.attributes(), &attributes);
        assert_eq!(array.data_type().to_string(), "<i2");

        let builder2 = ArrayBuilder::from_array(&array);
        assert_eq!(builder.build_metadata(), builder2.build_metadata());
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn array_builder_from_array_compressor() {
        use crate::array::codec::GzipCodec;

        let mut builder = ArrayBuilder::new(vec![6], "<u2", vec![4], 0u16.into());
        builder.compressor(Some(Box::new(GzipCodec::new(5).unwrap())));
        let storage = Arc::new(MemoryStore::new());
        let array = builder.build(storage.clone(), "/array").unwrap();
        let copy = ArrayBuilder::from_array(&array).build(storage, "/copy").unwrap();
        assert_eq!(
            copy.metadata().compressor,
            builder.build_metadata().compressor
        );
        assert!(copy.metadata().compressor.is_some());
    }

    #[test]
    fn array_invalid_metadata_key_suffix() {
        let storage = Arc::new(MemoryStore::new());
        let metadata = ArrayBuilder::new(vec![8], "<i2", vec![2], 0i16.into()).build_metadata();
        assert!(matches!(
            Array::new_with_metadata(storage, NodePath::new("/array").unwrap(), "x/", metadata),
            Err(ArrayCreateError::InvalidMetadataKeySuffix(_))
        ));
    }

    #[test]
    fn array_builder_invalid() {
        let storage = Arc::new(MemoryStore::new());
        let mut builder = ArrayBuilder::new(vec![8, 8], "<i2", vec![2, 2], 0i16.into());
        assert!(builder.build(storage.clone(), "/a//b").is_err());
        builder.chunk_shape(vec![2]);
        assert!(matches!(
            builder.build(storage.clone(), "/array"),
            Err(ArrayCreateError::InvalidChunkShape(_, _))
        ));
        builder.chunk_shape(vec![2, 2]).data_type("bool");
        assert!(matches!(
            builder.build(storage.clone(), "/array"),
            Err(ArrayCreateError::DataTypeCreateError(_))
        ));
        builder.data_type("u1").fill_value((-1i64).into());
        assert!(matches!(
            builder.build(storage.clone(), "/array"),
            Err(ArrayCreateError::InvalidFillValue(_))
        ));
        builder.fill_value(0u8.into()).shape(vec![8, 0]);
        assert!(matches!(
            builder.build(storage, "/array"),
            Err(ArrayCreateError::InvalidShape(_))
        ));
    }
}
