use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon_iter_concurrent_limit::iter_concurrent_limit;

use crate::{
    indexer::{ArraySelection, BasicIndexer, ChunkProjection},
    storage::ReadableWritableStorageTraits,
};

use super::{transmute_to_bytes, validate_element_size, Array, ArrayError, ArrayOptions};

impl<TStorage: ?Sized + ReadableWritableStorageTraits> Array<TStorage> {
    /// Encode `bytes` (in native byte order) and store in the `selection` of the array.
    ///
    /// `bytes` holds the selected elements in C (row-major) order of the selection output shape.
    /// Chunks that are only partially covered by the selection are read back (or filled with the fill value if they do not exist) and updated.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the selection is invalid for the array shape,
    ///  - the length of `bytes` does not match the number of selected elements times the data type size,
    ///  - there is a codec encoding or decoding error, or
    ///  - an underlying store error.
    pub fn store_selection(&self, selection: &ArraySelection, bytes: &[u8]) -> Result<(), ArrayError> {
        self.store_selection_opt(selection, bytes, &ArrayOptions::default())
    }

    /// Encode `elements` and store in the `selection` of the array.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`store_selection`](Array::store_selection) error condition is met.
    pub fn store_selection_elements<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        elements: &[T],
    ) -> Result<(), ArrayError> {
        self.store_selection_elements_opt(selection, elements, &ArrayOptions::default())
    }

    /// Store `value` in every element of the `selection` of the array.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`store_selection`](Array::store_selection) error condition is met.
    pub fn store_selection_broadcast<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        value: T,
    ) -> Result<(), ArrayError> {
        self.store_selection_broadcast_opt(selection, value, &ArrayOptions::default())
    }

    #[cfg(feature = "ndarray")]
    /// Encode `array` and store in the `selection` of the array.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the shape of `array` does not match the selection output shape or a [`store_selection_elements`](Array::store_selection_elements) error condition is met.
    pub fn store_selection_ndarray<'a, T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        array: impl Into<ndarray::ArrayViewD<'a, T>>,
    ) -> Result<(), ArrayError> {
        self.store_selection_ndarray_opt(selection, array, &ArrayOptions::default())
    }

    /// Explicit options version of [`store_selection`](Array::store_selection).
    #[allow(clippy::missing_errors_doc)]
    pub fn store_selection_opt(
        &self,
        selection: &ArraySelection,
        bytes: &[u8],
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        let (indexer, size_input) = self.indexer(selection)?;
        if bytes.len() != size_input {
            return Err(ArrayError::InvalidBytesInputSize(
                bytes.len(),
                size_input as u64,
            ));
        }
        self.store_indexed_opt(indexer, bytes, options)
    }

    /// Explicit options version of [`store_selection_elements`](Array::store_selection_elements).
    #[allow(clippy::missing_errors_doc)]
    pub fn store_selection_elements_opt<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        elements: &[T],
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        self.store_selection_opt(selection, transmute_to_bytes(elements), options)
    }

    /// Explicit options version of [`store_selection_broadcast`](Array::store_selection_broadcast).
    #[allow(clippy::missing_errors_doc)]
    pub fn store_selection_broadcast_opt<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        value: T,
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let (indexer, size_input) = self.indexer(selection)?;
        let bytes = transmute_to_bytes(&[value]).repeat(size_input / self.data_type().size());
        self.store_indexed_opt(indexer, &bytes, options)
    }

    #[cfg(feature = "ndarray")]
    /// Explicit options version of [`store_selection_ndarray`](Array::store_selection_ndarray).
    #[allow(clippy::missing_errors_doc)]
    pub fn store_selection_ndarray_opt<'a, T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        array: impl Into<ndarray::ArrayViewD<'a, T>>,
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let array: ndarray::ArrayViewD<T> = array.into();
        let (indexer, _size_input) = self.indexer(selection)?;
        if !itertools::equal(
            array.shape().iter().map(|&len| len as u64),
            indexer.output_shape().iter().copied(),
        ) {
            return Err(ArrayError::InvalidNdarrayInputShape(
                array.shape().to_vec(),
                indexer.output_shape().to_vec(),
            ));
        }
        let elements: Vec<T> = array.iter().copied().collect();
        self.store_indexed_opt(indexer, transmute_to_bytes(&elements), options)
    }

    /// Store `bytes` in the chunks projected by `indexer`.
    fn store_indexed_opt(
        &self,
        indexer: BasicIndexer,
        bytes: &[u8],
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        let input_shape = indexer.output_shape().to_vec();
        let projections: Vec<ChunkProjection> = indexer
            .into_projections()
            .into_iter()
            .filter(|projection| !projection.is_empty())
            .collect();
        if projections.is_empty() {
            return Ok(());
        }

        let chunk_concurrent_limit = options.chunk_concurrent_limit(projections.len());
        let store_chunk = |projection: ChunkProjection| {
            let chunk_indices = projection.chunk_indices();
            let mut chunk = if projection.is_full_chunk(self.chunk_shape()) {
                vec![0; self.chunk_size_bytes()?]
            } else {
                self.retrieve_chunk_or_fill(chunk_indices)?
            };
            self.gather_chunk(&projection, &input_shape, bytes, &mut chunk);
            self.store_chunk_unchecked(chunk_indices, chunk)
        };
        iter_concurrent_limit!(chunk_concurrent_limit, projections, try_for_each, store_chunk)
    }
}
