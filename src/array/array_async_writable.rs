use crate::storage::{AsyncWritableStorageTraits, StorageError};

use super::{transmute_to_bytes, validate_element_size, Array, ArrayError};

impl<TStorage: ?Sized + AsyncWritableStorageTraits> Array<TStorage> {
    /// Async variant of [`store_metadata`](Array::store_metadata).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_metadata(&self) -> Result<(), StorageError> {
        crate::storage::async_create_array(
            &*self.storage,
            self.path(),
            self.metadata_key_suffix(),
            &self.metadata(),
        )
        .await
    }

    /// Async variant of [`store_chunk`](Array::store_chunk).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_chunk(
        &self,
        chunk_indices: &[u64],
        chunk_bytes: Vec<u8>,
    ) -> Result<(), ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        let chunk_size = self.chunk_size_bytes()?;
        if chunk_bytes.len() != chunk_size {
            return Err(ArrayError::InvalidBytesInputSize(
                chunk_bytes.len(),
                chunk_size as u64,
            ));
        }
        self.async_store_chunk_unchecked(chunk_indices, chunk_bytes)
            .await
    }

    /// Async variant of [`store_chunk_elements`](Array::store_chunk_elements).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_chunk_elements<T: bytemuck::Pod + Send + Sync>(
        &self,
        chunk_indices: &[u64],
        chunk_elements: &[T],
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let chunk_bytes = transmute_to_bytes(chunk_elements).to_vec();
        self.async_store_chunk(chunk_indices, chunk_bytes).await
    }

    /// Async variant of [`erase_chunk`](Array::erase_chunk).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_erase_chunk(&self, chunk_indices: &[u64]) -> Result<(), StorageError> {
        crate::storage::async_erase_chunk(
            &*self.storage,
            self.path(),
            chunk_indices,
            self.separator(),
        )
        .await
    }

    pub(super) async fn async_store_chunk_unchecked(
        &self,
        chunk_indices: &[u64],
        chunk_bytes: Vec<u8>,
    ) -> Result<(), ArrayError> {
        let chunk_encoded = self.codecs().encode(chunk_bytes)?;
        log::trace!(
            "storing chunk {chunk_indices:?} of {} ({} bytes)",
            self.path(),
            chunk_encoded.len()
        );
        crate::storage::async_store_chunk(
            &*self.storage,
            self.path(),
            chunk_indices,
            self.separator(),
            chunk_encoded.into(),
        )
        .await?;
        Ok(())
    }
}
