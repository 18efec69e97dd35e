use thiserror::Error;

use crate::{
    indexer::IndexerError,
    metadata::UnsupportedExtensionError,
    node::NodePathError,
    plugin::PluginCreateError,
    storage::{MetadataKeySuffixError, StorageError},
};

use super::{
    codec::CodecError,
    data_type::{DataTypeError, IncompatibleFillValueError},
    ArrayIndices, ArrayShape,
};

/// An array creation error.
#[derive(Debug, Error)]
pub enum ArrayCreateError {
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// The array shape is empty or has a zero length dimension.
    #[error("invalid array shape {_0:?}")]
    InvalidShape(ArrayShape),
    /// The chunk shape does not match the array dimensionality or has a zero length dimension.
    #[error("invalid chunk shape {_0:?} for array shape {_1:?}")]
    InvalidChunkShape(ArrayShape, ArrayShape),
    /// An unsupported chunk grid type.
    #[error("unsupported chunk grid type {_0}, expected regular")]
    UnsupportedChunkGrid(String),
    /// An unsupported chunk memory layout.
    #[error("unsupported chunk memory layout {_0}, expected C")]
    UnsupportedMemoryLayout(String),
    /// An invalid or unsupported data type.
    #[error(transparent)]
    DataTypeCreateError(#[from] DataTypeError),
    /// Invalid fill value.
    #[error(transparent)]
    InvalidFillValue(#[from] IncompatibleFillValueError),
    /// Error creating the compressor.
    #[error(transparent)]
    CodecCreateError(#[from] PluginCreateError),
    /// An unsupported extension.
    #[error(transparent)]
    UnsupportedExtension(#[from] UnsupportedExtensionError),
    /// An invalid metadata key suffix.
    #[error(transparent)]
    InvalidMetadataKeySuffix(#[from] MetadataKeySuffixError),
}

/// Array errors.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// A store error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// A codec error.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// An invalid selection.
    #[error(transparent)]
    IndexerError(#[from] IndexerError),
    /// Chunk grid indices outside of the chunk grid.
    #[error("chunk grid indices {_0:?} are not within chunk grid shape {_1:?}")]
    InvalidChunkGridIndices(ArrayIndices, ArrayShape),
    /// An unexpected bytes input size.
    #[error("got bytes with size {_0:?}, expected {_1:?}")]
    InvalidBytesInputSize(usize, u64),
    /// Incompatible element size.
    #[error("got element size {_0}, expected {_1}")]
    IncompatibleElementSize(usize, usize),
    /// A selection too large to be held in memory.
    #[error("selection with {_0} elements exceeds the addressable memory")]
    SelectionTooLarge(u64),
    /// An unexpected ndarray input shape.
    #[cfg(feature = "ndarray")]
    #[error("got input with shape {_0:?}, expected {_1:?}")]
    InvalidNdarrayInputShape(Vec<usize>, ArrayShape),
    /// An ndarray shape error.
    #[cfg(feature = "ndarray")]
    #[error(transparent)]
    NdarrayShapeError(#[from] ndarray::ShapeError),
}
