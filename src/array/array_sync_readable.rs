use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon_iter_concurrent_limit::iter_concurrent_limit;

use crate::{
    indexer::{ArraySelection, ChunkProjection},
    storage::ReadableStorageTraits,
};

use super::{
    transmute_from_bytes_vec, unsafe_cell_slice::UnsafeCellSlice, validate_element_size, Array,
    ArrayError, ArrayOptions, ArrayShape, ArrayValue,
};

#[cfg(feature = "ndarray")]
use super::elements_to_ndarray;

impl<TStorage: ?Sized + ReadableStorageTraits> Array<TStorage> {
    /// Read and decode the chunk at `chunk_indices` into its bytes (in native byte order) if it exists.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_chunk_if_exists(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<Vec<u8>>, ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        self.retrieve_chunk_if_exists_unchecked(chunk_indices)
    }

    /// Read and decode the chunk at `chunk_indices` into its bytes (in native byte order).
    ///
    /// A chunk that does not exist is filled with the fill value.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_chunk(&self, chunk_indices: &[u64]) -> Result<Vec<u8>, ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        self.retrieve_chunk_or_fill(chunk_indices)
    }

    /// Read and decode the chunk at `chunk_indices` into a vector of its elements.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`retrieve_chunk`](Array::retrieve_chunk) error condition is met.
    pub fn retrieve_chunk_elements<T: bytemuck::Pod>(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Vec<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let bytes = self.retrieve_chunk(chunk_indices)?;
        Ok(transmute_from_bytes_vec::<T>(bytes))
    }

    /// Read and decode the `selection` of the array into its bytes (in native byte order).
    ///
    /// The bytes hold the selected elements in C (row-major) order of the selection output shape.
    /// Integer indexed dimensions are dropped from the output shape.
    /// Chunks that do not exist are filled with the fill value.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the selection is invalid for the array shape,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_selection(&self, selection: &ArraySelection) -> Result<Vec<u8>, ArrayError> {
        self.retrieve_selection_opt(selection, &ArrayOptions::default())
    }

    /// Read and decode the `selection` of the array into a vector of its elements.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`retrieve_selection`](Array::retrieve_selection) error condition is met.
    pub fn retrieve_selection_elements<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
    ) -> Result<Vec<T>, ArrayError> {
        self.retrieve_selection_elements_opt(selection, &ArrayOptions::default())
    }

    /// Read and decode the `selection` of the array into an [`ArrayValue`].
    ///
    /// The value is a [`Scalar`](ArrayValue::Scalar) if every dimension is indexed by an integer.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`retrieve_selection`](Array::retrieve_selection) error condition is met.
    pub fn retrieve_selection_value<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
    ) -> Result<ArrayValue<T>, ArrayError> {
        self.retrieve_selection_value_opt(selection, &ArrayOptions::default())
    }

    #[cfg(feature = "ndarray")]
    /// Read and decode the `selection` of the array into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`retrieve_selection`](Array::retrieve_selection) error condition is met.
    pub fn retrieve_selection_ndarray<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
    ) -> Result<ndarray::ArrayD<T>, ArrayError> {
        self.retrieve_selection_ndarray_opt(selection, &ArrayOptions::default())
    }

    /// Explicit options version of [`retrieve_selection`](Array::retrieve_selection).
    #[allow(clippy::missing_errors_doc)]
    pub fn retrieve_selection_opt(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<Vec<u8>, ArrayError> {
        self.retrieve_selection_shaped_opt(selection, options)
            .map(|(_shape, bytes)| bytes)
    }

    /// Explicit options version of [`retrieve_selection_elements`](Array::retrieve_selection_elements).
    #[allow(clippy::missing_errors_doc)]
    pub fn retrieve_selection_elements_opt<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<Vec<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let bytes = self.retrieve_selection_opt(selection, options)?;
        Ok(transmute_from_bytes_vec::<T>(bytes))
    }

    /// Explicit options version of [`retrieve_selection_value`](Array::retrieve_selection_value).
    #[allow(clippy::missing_errors_doc)]
    pub fn retrieve_selection_value_opt<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<ArrayValue<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let (shape, bytes) = self.retrieve_selection_shaped_opt(selection, options)?;
        Ok(ArrayValue::new(shape, transmute_from_bytes_vec::<T>(bytes)))
    }

    #[cfg(feature = "ndarray")]
    /// Explicit options version of [`retrieve_selection_ndarray`](Array::retrieve_selection_ndarray).
    #[allow(clippy::missing_errors_doc)]
    pub fn retrieve_selection_ndarray_opt<T: bytemuck::Pod>(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<ndarray::ArrayD<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let (shape, bytes) = self.retrieve_selection_shaped_opt(selection, options)?;
        elements_to_ndarray(&shape, transmute_from_bytes_vec::<T>(bytes))
    }

    /// Read and decode the `selection` of the array, returning the output shape and bytes.
    fn retrieve_selection_shaped_opt(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<(ArrayShape, Vec<u8>), ArrayError> {
        let (indexer, size_output) = self.indexer(selection)?;
        let output_shape = indexer.output_shape().to_vec();
        let projections: Vec<ChunkProjection> = indexer
            .into_projections()
            .into_iter()
            .filter(|projection| !projection.is_empty())
            .collect();

        let mut output = vec![0; size_output];
        if projections.is_empty() {
            return Ok((output_shape, output));
        }

        let chunk_concurrent_limit = options.chunk_concurrent_limit(projections.len());
        {
            let output = UnsafeCellSlice::new(&mut output);
            let retrieve_chunk = |projection: ChunkProjection| {
                let chunk = self.retrieve_chunk_or_fill(projection.chunk_indices())?;
                unsafe { self.scatter_chunk(&projection, &output_shape, &chunk, &output) };
                Ok::<_, ArrayError>(())
            };
            iter_concurrent_limit!(
                chunk_concurrent_limit,
                projections,
                try_for_each,
                retrieve_chunk
            )?;
        }
        Ok((output_shape, output))
    }

    /// Read and decode a chunk if it exists, without validating `chunk_indices`.
    pub(super) fn retrieve_chunk_if_exists_unchecked(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<Vec<u8>>, ArrayError> {
        let chunk_encoded = crate::storage::retrieve_chunk(
            &*self.storage,
            self.path(),
            chunk_indices,
            self.separator(),
        )?;
        chunk_encoded
            .map(|chunk_encoded| {
                log::trace!(
                    "decoding chunk {chunk_indices:?} of {} ({} bytes)",
                    self.path(),
                    chunk_encoded.len()
                );
                let chunk_decoded = self
                    .codecs()
                    .decode(chunk_encoded.to_vec(), self.chunk_num_elements()?)?;
                Ok(chunk_decoded)
            })
            .transpose()
    }

    /// Read and decode a chunk, without validating `chunk_indices`.
    ///
    /// A chunk that does not exist is filled with the fill value.
    pub(super) fn retrieve_chunk_or_fill(&self, chunk_indices: &[u64]) -> Result<Vec<u8>, ArrayError> {
        if let Some(chunk) = self.retrieve_chunk_if_exists_unchecked(chunk_indices)? {
            Ok(chunk)
        } else {
            log::trace!(
                "chunk {chunk_indices:?} of {} does not exist, using the fill value",
                self.path()
            );
            Ok(self.fill_value().repeat(self.chunk_num_elements()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        array::ArrayBuilder,
        indexer::{DimensionSelection, SliceSelection},
        storage::{store::MemoryStore, WritableStorageTraits},
    };

    use super::*;

    #[test]
    fn array_retrieve_fill_value() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(vec![5, 5], "<f4", vec![2, 2], 1.5f32.into())
            .build(store, "/array")
            .unwrap();
        let elements = array
            .retrieve_selection_elements::<f32>(&ArraySelection::full())
            .unwrap();
        assert_eq!(elements, vec![1.5; 25]);
        assert_eq!(array.retrieve_chunk_elements::<f32>(&[2, 2]).unwrap(), vec![1.5; 4]);
        assert!(array.retrieve_chunk_if_exists(&[0, 0]).unwrap().is_none());
        assert!(matches!(
            array.retrieve_chunk(&[3, 0]),
            Err(ArrayError::InvalidChunkGridIndices(_, _))
        ));
        assert!(matches!(
            array.retrieve_selection_elements::<f64>(&ArraySelection::full()),
            Err(ArrayError::IncompatibleElementSize(8, 4))
        ));
    }

    #[test]
    fn array_retrieve_big_endian_chunk() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(vec![4], ">u2", vec![2], 0u16.into())
            .build(store.clone(), "/array")
            .unwrap();
        store
            .set(&array.chunk_key(&[1]), vec![0, 1, 1, 0].into())
            .unwrap();
        assert_eq!(
            array
                .retrieve_selection_elements::<u16>(&ArraySelection::full())
                .unwrap(),
            vec![0, 0, 1, 256]
        );
        assert_eq!(
            array
                .retrieve_selection_value::<u16>(&ArraySelection::new(vec![
                    DimensionSelection::Index(-1)
                ]))
                .unwrap(),
            ArrayValue::Scalar(256)
        );
    }

    #[test]
    fn array_retrieve_corrupt_chunk() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(vec![4], "u1", vec![2], 0u8.into())
            .build(store.clone(), "/array")
            .unwrap();
        store.set(&array.chunk_key(&[0]), vec![0].into()).unwrap();
        assert!(matches!(
            array.retrieve_selection(&ArraySelection::full()),
            Err(ArrayError::CodecError(_))
        ));
        // Chunks outside of the selection are not read
        assert_eq!(
            array
                .retrieve_selection(&ArraySelection::new(vec![SliceSelection::range(2, 4).into()]))
                .unwrap(),
            vec![0, 0]
        );
    }

    #[test]
    fn array_retrieve_empty_selection() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(vec![4, 4], "u1", vec![2, 2], 0u8.into())
            .build(store, "/array")
            .unwrap();
        let value = array
            .retrieve_selection_value::<u8>(&ArraySelection::new(vec![
                SliceSelection::range(3, 1).into(),
                DimensionSelection::Index(0),
            ]))
            .unwrap();
        assert_eq!(
            value,
            ArrayValue::Array {
                shape: vec![0],
                elements: vec![]
            }
        );
    }
}
