use futures::{StreamExt, TryStreamExt};

use crate::{
    indexer::{ArraySelection, ChunkProjection},
    storage::AsyncReadableStorageTraits,
};

use super::{
    transmute_from_bytes_vec, unsafe_cell_slice::UnsafeCellSlice, validate_element_size, Array,
    ArrayError, ArrayOptions, ArrayShape, ArrayValue,
};

#[cfg(feature = "ndarray")]
use super::elements_to_ndarray;

impl<TStorage: ?Sized + AsyncReadableStorageTraits> Array<TStorage> {
    /// Async variant of [`retrieve_chunk_if_exists`](Array::retrieve_chunk_if_exists).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_chunk_if_exists(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<Vec<u8>>, ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        self.async_retrieve_chunk_if_exists_unchecked(chunk_indices)
            .await
    }

    /// Async variant of [`retrieve_chunk`](Array::retrieve_chunk).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_chunk(&self, chunk_indices: &[u64]) -> Result<Vec<u8>, ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        self.async_retrieve_chunk_or_fill(chunk_indices).await
    }

    /// Async variant of [`retrieve_chunk_elements`](Array::retrieve_chunk_elements).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_chunk_elements<T: bytemuck::Pod + Send + Sync>(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Vec<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let bytes = self.async_retrieve_chunk(chunk_indices).await?;
        Ok(transmute_from_bytes_vec::<T>(bytes))
    }

    /// Async variant of [`retrieve_selection`](Array::retrieve_selection).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_selection(
        &self,
        selection: &ArraySelection,
    ) -> Result<Vec<u8>, ArrayError> {
        self.async_retrieve_selection_opt(selection, &ArrayOptions::default())
            .await
    }

    /// Async variant of [`retrieve_selection_elements`](Array::retrieve_selection_elements).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_selection_elements<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
    ) -> Result<Vec<T>, ArrayError> {
        self.async_retrieve_selection_elements_opt(selection, &ArrayOptions::default())
            .await
    }

    /// Async variant of [`retrieve_selection_value`](Array::retrieve_selection_value).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_selection_value<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
    ) -> Result<ArrayValue<T>, ArrayError> {
        self.async_retrieve_selection_value_opt(selection, &ArrayOptions::default())
            .await
    }

    #[cfg(feature = "ndarray")]
    /// Async variant of [`retrieve_selection_ndarray`](Array::retrieve_selection_ndarray).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_selection_ndarray<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
    ) -> Result<ndarray::ArrayD<T>, ArrayError> {
        self.async_retrieve_selection_ndarray_opt(selection, &ArrayOptions::default())
            .await
    }

    /// Async variant of [`retrieve_selection_opt`](Array::retrieve_selection_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_selection_opt(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<Vec<u8>, ArrayError> {
        self.async_retrieve_selection_shaped_opt(selection, options)
            .await
            .map(|(_shape, bytes)| bytes)
    }

    /// Async variant of [`retrieve_selection_elements_opt`](Array::retrieve_selection_elements_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_selection_elements_opt<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<Vec<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let bytes = self.async_retrieve_selection_opt(selection, options).await?;
        Ok(transmute_from_bytes_vec::<T>(bytes))
    }

    /// Async variant of [`retrieve_selection_value_opt`](Array::retrieve_selection_value_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_selection_value_opt<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<ArrayValue<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let (shape, bytes) = self
            .async_retrieve_selection_shaped_opt(selection, options)
            .await?;
        Ok(ArrayValue::new(shape, transmute_from_bytes_vec::<T>(bytes)))
    }

    #[cfg(feature = "ndarray")]
    /// Async variant of [`retrieve_selection_ndarray_opt`](Array::retrieve_selection_ndarray_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_selection_ndarray_opt<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        options: &ArrayOptions,
    ) -> Result<ndarray::ArrayD<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let (shape, bytes) = self
            .async_retrieve_selection_shaped_opt(selection, options)
            .await?;
        elements_to_ndarray(&shape, transmute_from_bytes_vec::<T>(bytes))
    }

    async fn async_retrieve_selection_shaped_opt(
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
            let output = &output;
            let output_shape = &output_shape;
            let retrieve_chunk = |projection: ChunkProjection| async move {
                let chunk = self
                    .async_retrieve_chunk_or_fill(projection.chunk_indices())
                    .await?;
                unsafe { self.scatter_chunk(&projection, output_shape, &chunk, output) };
                Ok::<_, ArrayError>(())
            };
            futures::stream::iter(projections)
                .map(Ok)
                .try_for_each_concurrent(Some(chunk_concurrent_limit), retrieve_chunk)
                .await?;
        }
        Ok((output_shape, output))
    }

    pub(super) async fn async_retrieve_chunk_if_exists_unchecked(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<Vec<u8>>, ArrayError> {
        let chunk_encoded = crate::storage::async_retrieve_chunk(
            &*self.storage,
            self.path(),
            chunk_indices,
            self.separator(),
        )
        .await?;
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

    pub(super) async fn async_retrieve_chunk_or_fill(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Vec<u8>, ArrayError> {
        if let Some(chunk) = self
            .async_retrieve_chunk_if_exists_unchecked(chunk_indices)
            .await?
        {
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
