//! Arrays.
//!
//! An array is a node in a hierarchy holding N-dimensional array data and associated metadata.
//! An array is divided into a regular grid of chunks, each of which is encoded independently and stored under its own [chunk key](ChunkKeySeparator).
//!
//! Use [`ArrayBuilder`] to setup a new array, or [`Hierarchy::get_array`](crate::hierarchy::Hierarchy::get_array) for an existing array.
//! The documentation for [`Array`] details how to interact with arrays.

#[cfg(feature = "async")]
mod array_async_readable;
#[cfg(feature = "async")]
mod array_async_readable_writable;
#[cfg(feature = "async")]
mod array_async_writable;
mod array_builder;
mod array_errors;
mod array_sync_readable;
mod array_sync_readable_writable;
mod array_sync_writable;
mod chunk_key_encoding;
pub mod codec;
mod data_type;
mod endianness;
mod fill_value;
mod options;
mod unsafe_cell_slice;

use std::sync::Arc;

pub use self::{
    array_builder::ArrayBuilder,
    array_errors::{ArrayCreateError, ArrayError},
    chunk_key_encoding::ChunkKeySeparator,
    codec::ChunkCodecPipeline,
    data_type::{DataType, DataTypeError, DataTypeKind, IncompatibleFillValueError},
    endianness::{byte_swap, Endianness, NATIVE_ENDIAN},
    fill_value::FillValue,
    options::{ArrayOptions, ArrayOptionsBuilder},
};

use crate::{
    indexer::{ArraySelection, BasicIndexer, ChunkProjection},
    metadata::{
        validate_extensions, ArrayMetadata, ChunkGridMetadata, CodecMetadata, ExtensionMetadata,
        FillValueMetadata,
    },
    node::NodePath,
    storage::{data_key, validate_metadata_key_suffix, StoreKey},
};

use unsafe_cell_slice::UnsafeCellSlice;

/// An ND index to an element in an array or a chunk in a chunk grid.
pub type ArrayIndices = Vec<u64>;

/// The shape of an array.
pub type ArrayShape = Vec<u64>;

/// The chunk grid type of a regular chunk grid, the only supported chunk grid.
const CHUNK_GRID_REGULAR: &str = "regular";

/// The `C` (row-major) chunk memory layout, the only supported chunk memory layout.
const CHUNK_MEMORY_LAYOUT_C: &str = "C";

/// An array.
///
/// ### Metadata
///
/// An array is defined by the following parameters (which are encoded in its JSON [`ArrayMetadata`]):
///  - **shape**: the length of each array dimension,
///  - **data type**: the numerical representation of array elements,
///  - **chunk grid**: a regular grid with a chunk shape and a chunk key separator,
///  - **chunk memory layout**: `C` (row-major),
///  - **fill value**: the element value of unwritten portions of the array,
///  - **compressor**: an optional codec compressing encoded chunks,
///
/// and optional **extensions** and **attributes**.
///
/// ### Initialisation
///
/// A *new* array can be initialised with an [`ArrayBuilder`] or [`Array::new_with_metadata`], or created in a hierarchy with [`Hierarchy::create_array`](crate::hierarchy::Hierarchy::create_array).
/// An *existing* array is opened with [`Hierarchy::get_array`](crate::hierarchy::Hierarchy::get_array).
///
/// The `attributes` of an array are mutable.
/// Array metadata must be written explicitly to the store with [`store_metadata`](Array<WritableStorageTraits>::store_metadata) if an array is newly created or its metadata has been mutated.
///
/// ### Methods
///
/// #### Sync API
/// Array operations are divided into several categories based on the traits implemented for the backing [storage](crate::storage). In summary:
///  - [`ReadableStorageTraits`](crate::storage::ReadableStorageTraits): read array data
///    - [`retrieve_chunk`](Array::retrieve_chunk)
///    - [`retrieve_selection`](Array::retrieve_selection)
///  - [`WritableStorageTraits`](crate::storage::WritableStorageTraits): write array data and metadata
///    - [`store_metadata`](Array::store_metadata)
///    - [`store_chunk`](Array::store_chunk)
///    - [`erase_chunk`](Array::erase_chunk)
///  - [`ReadableWritableStorageTraits`](crate::storage::ReadableWritableStorageTraits): perform operations requiring both reading and writing
///    - [`store_selection`](Array::store_selection)
///
/// These `retrieve` and `store` methods have multiple variants:
///   - The above variants store or retrieve data represented as bytes in native byte order.
///   - Variants with an `_elements` suffix can read and write array elements with a known type.
///   - [`retrieve_selection_value`](Array::retrieve_selection_value) distinguishes scalar selections from array selections.
///   - [`store_selection_broadcast`](Array::store_selection_broadcast) writes a single value to every selected element.
///   - With the `ndarray` feature, method variants with an `_ndarray` suffix can be used to store or retrieve [`ndarray::Array`]s.
///   - Variants with an `_opt` suffix accept [`ArrayOptions`].
///
/// #### Async API
/// With the `async` feature and an async store, there are equivalent methods to the sync API with an `async_` prefix.
///
/// ### Concurrency
///
/// The chunks touched by a selection are processed concurrently, bounded by the [chunk concurrent limit](crate::config::Config#chunk-concurrent-limit).
/// Writes to chunks that are not entirely covered by a selection read back the existing chunk first.
/// Chunks are not locked, so if a chunk is written concurrently by more than one operation, its element values depend on whichever operation wrote to the chunk last.
pub struct Array<TStorage: ?Sized> {
    /// The storage.
    storage: Arc<TStorage>,
    /// The path of the array in a store.
    path: NodePath,
    /// The metadata key suffix of the hierarchy.
    metadata_key_suffix: String,
    /// An array of integers providing the length of each dimension of the Zarr array.
    shape: ArrayShape,
    /// The shape of every chunk.
    chunk_shape: ArrayShape,
    /// The chunk key separator.
    separator: ChunkKeySeparator,
    /// The data type of the Zarr array.
    data_type: DataType,
    /// The fill value of the Zarr array in native byte order.
    fill_value: FillValue,
    /// The fill value as it appears in the metadata.
    fill_value_metadata: FillValueMetadata,
    /// The compressor as it appears in the metadata.
    compressor: Option<CodecMetadata>,
    /// The chunk codec pipeline.
    codecs: ChunkCodecPipeline,
    /// Extensions.
    extensions: Vec<ExtensionMetadata>,
    /// Optional user defined attributes.
    attributes: serde_json::Map<String, serde_json::Value>,
}

impl<TStorage: ?Sized> core::fmt::Debug for Array<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Array")
            .field("path", &self.path)
            .field("shape", &self.shape)
            .field("chunk_shape", &self.chunk_shape)
            .field("data_type", &self.data_type)
            .field("fill_value", &self.fill_value_metadata)
            .field("compressor", &self.compressor)
            .finish_non_exhaustive()
    }
}

impl<TStorage: ?Sized> Array<TStorage> {
    /// Create an array in `storage` at `path` with `metadata`.
    /// This does not write to the store, use [`store_metadata`](Array<WritableStorageTraits>::store_metadata) to write `metadata` to `storage`.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if:
    ///  - the shape is empty or has a zero length dimension,
    ///  - the chunk shape does not match the array dimensionality or has a zero length dimension,
    ///  - the chunk grid is not `regular` or the chunk memory layout is not `C`,
    ///  - the data type is invalid or unsupported,
    ///  - the fill value is incompatible with the data type,
    ///  - the compressor is unsupported or its configuration is invalid,
    ///  - there is an extension that must be understood, or
    ///  - the metadata key suffix contains `/`.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: NodePath,
        metadata_key_suffix: &str,
        metadata: ArrayMetadata,
    ) -> Result<Self, ArrayCreateError> {
        let ArrayMetadata {
            shape,
            data_type,
            chunk_grid,
            chunk_memory_layout,
            fill_value,
            compressor,
            extensions,
            attributes,
        } = metadata;

        if shape.is_empty() || shape.contains(&0) {
            return Err(ArrayCreateError::InvalidShape(shape));
        }
        if chunk_grid.chunk_shape.len() != shape.len() || chunk_grid.chunk_shape.contains(&0) {
            return Err(ArrayCreateError::InvalidChunkShape(
                chunk_grid.chunk_shape,
                shape,
            ));
        }
        if chunk_grid.grid_type != CHUNK_GRID_REGULAR {
            return Err(ArrayCreateError::UnsupportedChunkGrid(chunk_grid.grid_type));
        }
        if chunk_memory_layout != CHUNK_MEMORY_LAYOUT_C {
            return Err(ArrayCreateError::UnsupportedMemoryLayout(
                chunk_memory_layout,
            ));
        }
        validate_extensions(&extensions)?;
        validate_metadata_key_suffix(metadata_key_suffix)?;

        let data_type = DataType::from_token(&data_type)?;
        let fill_value_native = data_type.fill_value_from_metadata(&fill_value)?;
        let codecs = ChunkCodecPipeline::from_metadata(data_type, compressor.as_ref())?;

        Ok(Self {
            storage,
            path,
            metadata_key_suffix: metadata_key_suffix.to_string(),
            shape,
            chunk_shape: chunk_grid.chunk_shape,
            separator: chunk_grid.separator,
            data_type,
            fill_value: fill_value_native,
            fill_value_metadata: fill_value,
            compressor,
            codecs,
            extensions,
            attributes,
        })
    }

    /// Get the node path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// Get the metadata key suffix.
    #[must_use]
    pub fn metadata_key_suffix(&self) -> &str {
        &self.metadata_key_suffix
    }

    /// Get the array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Get the array dimensionality.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.shape.len()
    }

    /// Get the chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &[u64] {
        &self.chunk_shape
    }

    /// Get the chunk key separator.
    #[must_use]
    pub const fn separator(&self) -> ChunkKeySeparator {
        self.separator
    }

    /// Get the data type.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Get the fill value in native byte order.
    #[must_use]
    pub const fn fill_value(&self) -> &FillValue {
        &self.fill_value
    }

    /// Get the fill value as it appears in the metadata.
    #[must_use]
    pub const fn fill_value_metadata(&self) -> &FillValueMetadata {
        &self.fill_value_metadata
    }

    /// Get the chunk codec pipeline.
    #[must_use]
    pub const fn codecs(&self) -> &ChunkCodecPipeline {
        &self.codecs
    }

    /// Get the extensions.
    #[must_use]
    pub fn extensions(&self) -> &[ExtensionMetadata] {
        &self.extensions
    }

    /// Get the attributes.
    #[must_use]
    pub const fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.attributes
    }

    /// Mutably borrow the array attributes.
    #[must_use]
    pub fn attributes_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        &mut self.attributes
    }

    /// Create [`ArrayMetadata`].
    #[must_use]
    pub fn metadata(&self) -> ArrayMetadata {
        ArrayMetadata {
            shape: self.shape.clone(),
            data_type: self.data_type.to_string(),
            chunk_grid: ChunkGridMetadata::regular(self.chunk_shape.clone(), self.separator),
            chunk_memory_layout: CHUNK_MEMORY_LAYOUT_C.to_string(),
            fill_value: self.fill_value_metadata.clone(),
            compressor: self.compressor.clone(),
            extensions: self.extensions.clone(),
            attributes: self.attributes.clone(),
        }
    }

    /// Return the shape of the chunk grid (i.e., the number of chunks along each dimension).
    #[must_use]
    pub fn chunk_grid_shape(&self) -> ArrayShape {
        std::iter::zip(&self.shape, &self.chunk_shape)
            .map(|(&shape, &chunk_shape)| shape.div_ceil(chunk_shape))
            .collect()
    }

    /// Return the store key of the chunk at `chunk_indices`, e.g. `data/root/array/c0/1`.
    #[must_use]
    pub fn chunk_key(&self, chunk_indices: &[u64]) -> StoreKey {
        data_key(&self.path, chunk_indices, self.separator)
    }

    /// The number of elements in a chunk.
    fn chunk_num_elements(&self) -> Result<usize, ArrayError> {
        let num_elements = self
            .chunk_shape
            .iter()
            .try_fold(1u64, |acc, &n| acc.checked_mul(n))
            .ok_or(ArrayError::SelectionTooLarge(u64::MAX))?;
        usize::try_from(num_elements).map_err(|_| ArrayError::SelectionTooLarge(num_elements))
    }

    /// The size in bytes of a decoded chunk.
    fn chunk_size_bytes(&self) -> Result<usize, ArrayError> {
        let num_elements = self.chunk_num_elements()?;
        num_elements
            .checked_mul(self.data_type.size())
            .ok_or(ArrayError::SelectionTooLarge(num_elements as u64))
    }

    /// Validate that `chunk_indices` lie within the chunk grid.
    fn validate_chunk_indices(&self, chunk_indices: &[u64]) -> Result<(), ArrayError> {
        let chunk_grid_shape = self.chunk_grid_shape();
        if chunk_indices.len() == chunk_grid_shape.len()
            && std::iter::zip(chunk_indices, &chunk_grid_shape).all(|(i, n)| i < n)
        {
            Ok(())
        } else {
            Err(ArrayError::InvalidChunkGridIndices(
                chunk_indices.to_vec(),
                chunk_grid_shape,
            ))
        }
    }

    /// Index `selection` into the chunk grid.
    ///
    /// Returns the indexer and the size in bytes of the selection in native byte order.
    fn indexer(&self, selection: &ArraySelection) -> Result<(BasicIndexer, usize), ArrayError> {
        let indexer = BasicIndexer::new(selection, &self.shape, &self.chunk_shape)?;
        let num_elements = indexer.num_elements();
        let size = usize::try_from(num_elements)
            .ok()
            .and_then(|num_elements| num_elements.checked_mul(self.data_type.size()))
            .ok_or(ArrayError::SelectionTooLarge(num_elements))?;
        Ok((indexer, size))
    }

    /// Copy the selected elements of a decoded chunk into `output`, which holds the elements of the whole selection.
    ///
    /// Offsets fit in `usize` as the chunk and the selection are held in memory.
    ///
    /// # Safety
    /// No other thread may write to the elements of `output` selected by `projection`.
    #[allow(clippy::cast_possible_truncation)]
    unsafe fn scatter_chunk(
        &self,
        projection: &ChunkProjection,
        output_shape: &[u64],
        chunk: &[u8],
        output: &UnsafeCellSlice<u8>,
    ) {
        let element_size = self.data_type.size();
        projection.for_each_run(
            &self.chunk_shape,
            output_shape,
            |chunk_offset, output_offset, num_elements| {
                let chunk_offset = chunk_offset as usize * element_size;
                let output_offset = output_offset as usize * element_size;
                let length = num_elements as usize * element_size;
                output.copy_from(output_offset, &chunk[chunk_offset..chunk_offset + length]);
            },
        );
    }

    /// Copy the selected elements from `input`, which holds the elements of the whole selection, into a decoded chunk.
    #[allow(clippy::cast_possible_truncation)]
    fn gather_chunk(
        &self,
        projection: &ChunkProjection,
        input_shape: &[u64],
        input: &[u8],
        chunk: &mut [u8],
    ) {
        let element_size = self.data_type.size();
        projection.for_each_run(
            &self.chunk_shape,
            input_shape,
            |chunk_offset, input_offset, num_elements| {
                let chunk_offset = chunk_offset as usize * element_size;
                let input_offset = input_offset as usize * element_size;
                let length = num_elements as usize * element_size;
                chunk[chunk_offset..chunk_offset + length]
                    .copy_from_slice(&input[input_offset..input_offset + length]);
            },
        );
    }
}

/// A selection result: either a scalar or an array of elements.
#[derive(Clone, PartialEq, Debug)]
pub enum ArrayValue<T> {
    /// A single element, for a selection which indexes every dimension with an integer.
    Scalar(T),
    /// An array of elements in C (row-major) order.
    Array {
        /// The shape of the selection.
        shape: ArrayShape,
        /// The elements.
        elements: Vec<T>,
    },
}

impl<T> ArrayValue<T> {
    /// Create an [`ArrayValue`] from the output shape and elements of a selection.
    ///
    /// The value is a scalar if `shape` is empty.
    fn new(shape: ArrayShape, mut elements: Vec<T>) -> Self {
        if shape.is_empty() && elements.len() == 1 {
            if let Some(element) = elements.pop() {
                return Self::Scalar(element);
            }
        }
        Self::Array { shape, elements }
    }

    /// Returns the scalar, or [`None`] for an array.
    pub fn into_scalar(self) -> Option<T> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Array { .. } => None,
        }
    }

    /// Returns the elements (a single element for a scalar).
    pub fn into_elements(self) -> Vec<T> {
        match self {
            Self::Scalar(value) => vec![value],
            Self::Array { elements, .. } => elements,
        }
    }
}

/// Check that the size of `T` matches the data type size.
fn validate_element_size<T>(data_type: &DataType) -> Result<(), ArrayError> {
    if data_type.size() == std::mem::size_of::<T>() {
        Ok(())
    } else {
        Err(ArrayError::IncompatibleElementSize(
            std::mem::size_of::<T>(),
            data_type.size(),
        ))
    }
}

/// Convert from `&[u8]` to `Vec<T>`.
#[must_use]
pub fn convert_from_bytes_slice<T: bytemuck::Pod>(from: &[u8]) -> Vec<T> {
    bytemuck::allocation::pod_collect_to_vec(from)
}

/// Transmute from `Vec<u8>` to `Vec<T>`.
#[must_use]
pub fn transmute_from_bytes_vec<T: bytemuck::Pod>(from: Vec<u8>) -> Vec<T> {
    bytemuck::allocation::try_cast_vec(from)
        .unwrap_or_else(|(_err, from)| convert_from_bytes_slice(&from))
}

/// Transmute from `&[T]` to `&[u8]`.
#[must_use]
pub fn transmute_to_bytes<T: bytemuck::NoUninit>(from: &[T]) -> &[u8] {
    bytemuck::must_cast_slice(from)
}

#[cfg(feature = "ndarray")]
fn iter_u64_to_usize<'a, I: Iterator<Item = &'a u64>>(iter: I) -> Vec<usize> {
    iter.map(|v| usize::try_from(*v).unwrap_or(usize::MAX))
        .collect::<Vec<_>>()
}

#[cfg(feature = "ndarray")]
/// Convert a vector of elements to an [`ndarray::ArrayD`].
///
/// # Errors
/// Returns an error if the length of `elements` is not equal to the product of the components in `shape`.
pub fn elements_to_ndarray<T>(
    shape: &[u64],
    elements: Vec<T>,
) -> Result<ndarray::ArrayD<T>, ArrayError> {
    Ok(ndarray::ArrayD::<T>::from_shape_vec(
        iter_u64_to_usize(shape.iter()),
        elements,
    )?)
}

#[cfg(test)]
mod tests {
    use crate::storage::store::MemoryStore;

    use super::*;

    fn array_metadata() -> ArrayMetadata {
        serde_json::from_str(
            r#"{
                "shape": [10, 7],
                "data_type": ">i4",
                "chunk_grid": {"type": "regular", "separator": ".", "chunk_shape": [4, 3]},
                "chunk_memory_layout": "C",
                "fill_value": -1,
                "attributes": {"a": 1}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn array_new_with_metadata() {
        let storage = Arc::new(MemoryStore::new());
        let metadata = array_metadata();
        let array = Array::new_with_metadata(
            storage,
            NodePath::new("/a/b").unwrap(),
            ".json",
            metadata.clone(),
        )
        .unwrap();
        assert_eq!(array.dimensionality(), 2);
        assert_eq!(array.chunk_grid_shape(), vec![3, 3]);
        assert_eq!(array.fill_value().as_ne_bytes(), (-1i32).to_ne_bytes());
        assert_eq!(array.chunk_key(&[2, 1]).as_str(), "data/root/a/b/c2.1");
        assert_eq!(array.metadata(), metadata);
        assert!(array.validate_chunk_indices(&[2, 2]).is_ok());
        assert!(array.validate_chunk_indices(&[3, 0]).is_err());
        assert!(array.validate_chunk_indices(&[0]).is_err());
    }

    #[test]
    fn array_new_with_metadata_unsupported() {
        let storage = Arc::new(MemoryStore::new());
        let path = NodePath::root();

        let mut metadata = array_metadata();
        metadata.chunk_grid.grid_type = "rectilinear".to_string();
        assert!(matches!(
            Array::new_with_metadata(storage.clone(), path.clone(), ".json", metadata),
            Err(ArrayCreateError::UnsupportedChunkGrid(_))
        ));

        let mut metadata = array_metadata();
        metadata.chunk_memory_layout = "F".to_string();
        assert!(matches!(
            Array::new_with_metadata(storage.clone(), path.clone(), ".json", metadata),
            Err(ArrayCreateError::UnsupportedMemoryLayout(_))
        ));

        let mut metadata = array_metadata();
        metadata.extensions = vec![ExtensionMetadata::new("https://example.com/ext", true)];
        assert!(matches!(
            Array::new_with_metadata(storage.clone(), path.clone(), ".json", metadata),
            Err(ArrayCreateError::UnsupportedExtension(_))
        ));

        let mut metadata = array_metadata();
        metadata.compressor = Some(CodecMetadata::new("https://example.com/codec", None));
        assert!(matches!(
            Array::new_with_metadata(storage.clone(), path.clone(), ".json", metadata),
            Err(ArrayCreateError::CodecCreateError(_))
        ));

        let mut metadata = array_metadata();
        metadata.shape = vec![];
        metadata.chunk_grid.chunk_shape = vec![];
        assert!(matches!(
            Array::new_with_metadata(storage, path, ".json", metadata),
            Err(ArrayCreateError::InvalidShape(_))
        ));
    }

    #[test]
    fn array_value() {
        assert_eq!(ArrayValue::new(vec![], vec![3u8]), ArrayValue::Scalar(3));
        assert_eq!(ArrayValue::new(vec![], vec![3u8]).into_scalar(), Some(3));
        let value = ArrayValue::new(vec![2], vec![1u8, 2]);
        assert_eq!(
            value,
            ArrayValue::Array {
                shape: vec![2],
                elements: vec![1, 2]
            }
        );
        assert_eq!(value.into_elements(), vec![1, 2]);
    }

    #[test]
    fn element_size() {
        let data_type = DataType::from_token("<u2").unwrap();
        assert!(validate_element_size::<u16>(&data_type).is_ok());
        assert!(matches!(
            validate_element_size::<u32>(&data_type),
            Err(ArrayError::IncompatibleElementSize(4, 2))
        ));
        assert_eq!(transmute_from_bytes_vec::<u16>(vec![1, 0, 1, 0]).len(), 2);
    }
}
