use futures::{StreamExt, TryStreamExt};

use crate::{
    indexer::{ArraySelection, BasicIndexer, ChunkProjection},
    storage::AsyncReadableWritableStorageTraits,
};

use super::{transmute_to_bytes, validate_element_size, Array, ArrayError, ArrayOptions};

impl<TStorage: ?Sized + AsyncReadableWritableStorageTraits> Array<TStorage> {
    /// Async variant of [`store_selection`](Array::store_selection).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_selection(
        &self,
        selection: &ArraySelection,
        bytes: &[u8],
    ) -> Result<(), ArrayError> {
        self.async_store_selection_opt(selection, bytes, &ArrayOptions::default())
            .await
    }

    /// Async variant of [`store_selection_elements`](Array::store_selection_elements).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_selection_elements<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        elements: &[T],
    ) -> Result<(), ArrayError> {
        self.async_store_selection_elements_opt(selection, elements, &ArrayOptions::default())
            .await
    }

    /// Async variant of [`store_selection_broadcast`](Array::store_selection_broadcast).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_selection_broadcast<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        value: T,
    ) -> Result<(), ArrayError> {
        self.async_store_selection_broadcast_opt(selection, value, &ArrayOptions::default())
            .await
    }

    #[cfg(feature = "ndarray")]
    /// Async variant of [`store_selection_ndarray`](Array::store_selection_ndarray).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_selection_ndarray<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        array: ndarray::ArrayViewD<'_, T>,
    ) -> Result<(), ArrayError> {
        self.async_store_selection_ndarray_opt(selection, array, &ArrayOptions::default())
            .await
    }

    /// Async variant of [`store_selection_opt`](Array::store_selection_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_selection_opt(
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
        self.async_store_indexed_opt(indexer, bytes, options).await
    }

    /// Async variant of [`store_selection_elements_opt`](Array::store_selection_elements_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_selection_elements_opt<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        elements: &[T],
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        self.async_store_selection_opt(selection, transmute_to_bytes(elements), options)
            .await
    }

    /// Async variant of [`store_selection_broadcast_opt`](Array::store_selection_broadcast_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_selection_broadcast_opt<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        value: T,
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let (indexer, size_input) = self.indexer(selection)?;
        let bytes = transmute_to_bytes(&[value]).repeat(size_input / self.data_type().size());
        self.async_store_indexed_opt(indexer, &bytes, options).await
    }

    #[cfg(feature = "ndarray")]
    /// Async variant of [`store_selection_ndarray_opt`](Array::store_selection_ndarray_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_selection_ndarray_opt<T: bytemuck::Pod + Send + Sync>(
        &self,
        selection: &ArraySelection,
        array: ndarray::ArrayViewD<'_, T>,
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
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
        self.async_store_indexed_opt(indexer, transmute_to_bytes(&elements), options)
            .await
    }

    async fn async_store_indexed_opt(
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
        let input_shape = &input_shape;
        let store_chunk = |projection: ChunkProjection| async move {
            let chunk_indices = projection.chunk_indices();
            let mut chunk = if projection.is_full_chunk(self.chunk_shape()) {
                vec![0; self.chunk_size_bytes()?]
            } else {
                self.async_retrieve_chunk_or_fill(chunk_indices).await?
            };
            self.gather_chunk(&projection, input_shape, bytes, &mut chunk);
            self.async_store_chunk_unchecked(chunk_indices, chunk).await
        };
        futures::stream::iter(projections)
            .map(Ok)
            .try_for_each_concurrent(Some(chunk_concurrent_limit), store_chunk)
            .await
    }
}
