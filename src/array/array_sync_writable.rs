use crate::storage::{StorageError, WritableStorageTraits};

use super::{transmute_to_bytes, validate_element_size, Array, ArrayError};

impl<TStorage: ?Sized + WritableStorageTraits> Array<TStorage> {
    /// Store metadata.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), StorageError> {
        crate::storage::create_array(
            &*self.storage,
            self.path(),
            self.metadata_key_suffix(),
            &self.metadata(),
        )
    }

    /// Encode `chunk_bytes` (in native byte order) and store at `chunk_indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - the length of `chunk_bytes` is not equal to the expected length (the product of the number of elements in the chunk and the data type size in bytes),
    ///  - there is a codec encoding error, or
    ///  - an underlying store error.
    pub fn store_chunk(&self, chunk_indices: &[u64], chunk_bytes: Vec<u8>) -> Result<(), ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        let chunk_size = self.chunk_size_bytes()?;
        if chunk_bytes.len() != chunk_size {
            return Err(ArrayError::InvalidBytesInputSize(
                chunk_bytes.len(),
                chunk_size as u64,
            ));
        }
        self.store_chunk_unchecked(chunk_indices, chunk_bytes)
    }

    /// Encode `chunk_elements` and store at `chunk_indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`store_chunk`](Array::store_chunk) error condition is met.
    pub fn store_chunk_elements<T: bytemuck::Pod>(
        &self,
        chunk_indices: &[u64],
        chunk_elements: &[T],
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        let chunk_bytes = transmute_to_bytes(chunk_elements).to_vec();
        self.store_chunk(chunk_indices, chunk_bytes)
    }

    /// Erase the chunk at `chunk_indices`.
    ///
    /// Succeeds if the chunk does not exist.
    /// An erased chunk reads as the fill value.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying store error.
    pub fn erase_chunk(&self, chunk_indices: &[u64]) -> Result<(), StorageError> {
        crate::storage::erase_chunk(&*self.storage, self.path(), chunk_indices, self.separator())
    }

    /// Encode and store a chunk, without validating `chunk_indices` or the size of `chunk_bytes`.
    pub(super) fn store_chunk_unchecked(
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
        crate::storage::store_chunk(
            &*self.storage,
            self.path(),
            chunk_indices,
            self.separator(),
            chunk_encoded.into(),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        array::ArrayBuilder,
        storage::{store::MemoryStore, ReadableStorageTraits},
    };

    use super::*;

    #[test]
    fn array_store_chunk_too_large() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(vec![u64::MAX], "<u8", vec![u64::MAX / 4], 0u64.into())
            .build(store.clone(), "/array")
            .unwrap();
        assert!(matches!(
            array.store_chunk(&[0], vec![]),
            Err(ArrayError::SelectionTooLarge(_))
        ));

        let array = ArrayBuilder::new(vec![u64::MAX, 4], "u1", vec![u64::MAX, 4], 0u8.into())
            .build(store, "/array")
            .unwrap();
        assert!(matches!(
            array.store_chunk(&[0, 0], vec![]),
            Err(ArrayError::SelectionTooLarge(_))
        ));
    }

    #[test]
    fn array_store_chunk() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(vec![4, 4], ">u2", vec![2, 2], 0u16.into())
            .build(store.clone(), "/array")
            .unwrap();
        array.store_metadata().unwrap();
        assert!(store
            .get(&"meta/root/array.array.json".try_into().unwrap())
            .unwrap()
            .is_some());

        array.store_chunk_elements::<u16>(&[1, 0], &[1, 2, 3, 4]).unwrap();
        let key = "data/root/array/c1/0".try_into().unwrap();
        assert_eq!(
            store.get(&key).unwrap().unwrap().to_vec(),
            vec![0, 1, 0, 2, 0, 3, 0, 4]
        );
        assert_eq!(
            array.retrieve_chunk_elements::<u16>(&[1, 0]).unwrap(),
            vec![1, 2, 3, 4]
        );

        assert!(matches!(
            array.store_chunk(&[1, 0], vec![0; 3]),
            Err(ArrayError::InvalidBytesInputSize(3, 8))
        ));
        assert!(matches!(
            array.store_chunk(&[2, 0], vec![0; 8]),
            Err(ArrayError::InvalidChunkGridIndices(_, _))
        ));

        array.erase_chunk(&[1, 0]).unwrap();
        assert!(store.get(&key).unwrap().is_none());
        array.erase_chunk(&[1, 0]).unwrap();
        assert_eq!(
            array.retrieve_chunk_elements::<u16>(&[1, 0]).unwrap(),
            vec![0; 4]
        );
    }
}
