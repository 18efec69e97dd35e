//! Selection indexing.
//!
//! An [`ArraySelection`] selects elements of an array with one [`DimensionSelection`] per dimension:
//!  - [`DimensionSelection::Index`] selects a single element and drops the dimension from the output,
//!  - [`DimensionSelection::Slice`] selects a strided range of elements, and
//!  - [`DimensionSelection::Full`] selects every element.
//!
//! A [`BasicIndexer`] decomposes a selection of an array into the chunks it touches.
//! Each [`ChunkProjection`] maps the selected elements of one chunk to their position in the output.
//!
//! ```rust
//! # use zarrs_core::indexer::{ArraySelection, BasicIndexer, DimensionSelection, SliceSelection};
//! // Select [1:3, 2] of a 4x4 array with 2x2 chunks
//! let selection = ArraySelection::new(vec![
//!     DimensionSelection::Slice(SliceSelection::range(1, 3)),
//!     DimensionSelection::Index(2),
//! ]);
//! let indexer = BasicIndexer::new(&selection, &[4, 4], &[2, 2])?;
//! assert_eq!(indexer.output_shape(), &[2]);
//! let chunks: Vec<_> = indexer.projections().iter().map(|p| p.chunk_indices().to_vec()).collect();
//! assert_eq!(chunks, vec![vec![0, 1], vec![1, 1]]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod chunk_projection;
mod dim_indexer;

pub use chunk_projection::{ChunkDimProjection, ChunkProjection};

use derive_more::From;
use itertools::Itertools;
use thiserror::Error;

use crate::array::ArrayShape;

use dim_indexer::DimIndexer;

/// A slice of a dimension.
///
/// Bounds follow the clamped rule: a negative bound counts from the end of the dimension, then bounds are clamped to the dimension.
/// The step defaults to 1 and must be positive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SliceSelection {
    /// The start (inclusive), defaulting to the start of the dimension.
    pub start: Option<i64>,
    /// The stop (exclusive), defaulting to the end of the dimension.
    pub stop: Option<i64>,
    /// The step, defaulting to 1.
    pub step: Option<i64>,
}

impl SliceSelection {
    /// Create a new slice.
    #[must_use]
    pub const fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Create a slice of the range `start..stop` with a unit step.
    #[must_use]
    pub const fn range(start: i64, stop: i64) -> Self {
        Self::new(Some(start), Some(stop), None)
    }
}

/// The selection of one array dimension.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DimensionSelection {
    /// A single element. Negative indices count from the end of the dimension.
    Index(i64),
    /// A strided range of elements.
    Slice(SliceSelection),
    /// Every element.
    Full,
}

impl From<i64> for DimensionSelection {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<SliceSelection> for DimensionSelection {
    fn from(slice: SliceSelection) -> Self {
        Self::Slice(slice)
    }
}

/// An array selection.
///
/// A selection with fewer dimensions than an array is padded with [`DimensionSelection::Full`].
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, From)]
pub struct ArraySelection(Vec<DimensionSelection>);

impl ArraySelection {
    /// Create a new array selection.
    #[must_use]
    pub fn new(dims: Vec<DimensionSelection>) -> Self {
        Self(dims)
    }

    /// A selection of every element of an array of any dimensionality.
    #[must_use]
    pub fn full() -> Self {
        Self(Vec::new())
    }

    /// The dimension selections.
    #[must_use]
    pub fn dims(&self) -> &[DimensionSelection] {
        &self.0
    }
}

/// An indexer error.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// The selection has more dimensions than the array.
    #[error("selection has {selection} dimensions, but the array has {array}")]
    TooManyDimensions {
        /// The dimensionality of the selection.
        selection: usize,
        /// The dimensionality of the array.
        array: usize,
    },
    /// An index is out of bounds.
    #[error("index {index} is out of bounds for dimension of length {len}")]
    IndexOutOfBounds {
        /// The index.
        index: i64,
        /// The length of the dimension.
        len: u64,
    },
    /// A slice step is zero or negative.
    #[error("slice step {0} is not positive")]
    InvalidStep(i64),
    /// The chunk shape is incompatible with the array shape.
    #[error("chunk shape {_1:?} is incompatible with array shape {_0:?}")]
    IncompatibleChunkShape(ArrayShape, ArrayShape),
}

/// Compute the C (row-major) order strides of `shape`, in elements.
///
/// `c_order_strides(shape)[d]` is the product of `shape[d+1..]`.
#[must_use]
pub fn c_order_strides(shape: &[u64]) -> Vec<u64> {
    let mut strides = vec![1; shape.len()];
    for dim in (0..shape.len().saturating_sub(1)).rev() {
        strides[dim] = strides[dim + 1] * shape[dim + 1];
    }
    strides
}

/// Decomposes a selection of an array into the chunks it touches.
#[derive(Clone, Debug)]
pub struct BasicIndexer {
    output_shape: ArrayShape,
    projections: Vec<ChunkProjection>,
}

impl BasicIndexer {
    /// Create a new indexer for `selection` of an array with `shape` and `chunk_shape`.
    ///
    /// Chunk projections are in C (row-major) order of chunk grid coordinates.
    ///
    /// # Errors
    /// Returns [`IndexerError`] if
    ///  - the selection has more dimensions than the array,
    ///  - an index is out of bounds,
    ///  - a slice step is not positive, or
    ///  - `chunk_shape` does not match the dimensionality of `shape` or has a zero length.
    pub fn new(
        selection: &ArraySelection,
        shape: &[u64],
        chunk_shape: &[u64],
    ) -> Result<Self, IndexerError> {
        if chunk_shape.len() != shape.len() || chunk_shape.contains(&0) {
            return Err(IndexerError::IncompatibleChunkShape(
                shape.to_vec(),
                chunk_shape.to_vec(),
            ));
        }
        if selection.dims().len() > shape.len() {
            return Err(IndexerError::TooManyDimensions {
                selection: selection.dims().len(),
                array: shape.len(),
            });
        }

        let dim_indexers = selection
            .dims()
            .iter()
            .chain(std::iter::repeat(&DimensionSelection::Full))
            .zip(shape.iter().zip(chunk_shape))
            .map(|(selection, (&len, &chunk_len))| DimIndexer::new(selection, len, chunk_len))
            .collect::<Result<Vec<_>, _>>()?;

        let output_shape = dim_indexers
            .iter()
            .filter_map(|dim_indexer| dim_indexer.output_len)
            .collect();

        let projections = if dim_indexers.is_empty() {
            vec![ChunkProjection::new(vec![], vec![])]
        } else {
            dim_indexers
                .iter()
                .map(|dim_indexer| dim_indexer.projections.iter())
                .multi_cartesian_product()
                .map(|dims| {
                    let (chunk_indices, dims) = dims.into_iter().copied().unzip();
                    ChunkProjection::new(chunk_indices, dims)
                })
                .collect()
        };

        Ok(Self {
            output_shape,
            projections,
        })
    }

    /// The shape of the output. An empty shape indicates a scalar.
    #[must_use]
    pub fn output_shape(&self) -> &[u64] {
        &self.output_shape
    }

    /// The number of elements in the output.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.output_shape.iter().product()
    }

    /// The projection of the selection onto each touched chunk.
    #[must_use]
    pub fn projections(&self) -> &[ChunkProjection] {
        &self.projections
    }

    /// Consume the indexer and return the chunk projections.
    #[must_use]
    pub fn into_projections(self) -> Vec<ChunkProjection> {
        self.projections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides() {
        assert_eq!(c_order_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(c_order_strides(&[5]), vec![1]);
        assert!(c_order_strides(&[]).is_empty());
    }

    #[test]
    fn indexer_slice_index() {
        let selection = ArraySelection::new(vec![
            SliceSelection::range(1, 3).into(),
            DimensionSelection::Index(2),
        ]);
        let indexer = BasicIndexer::new(&selection, &[4, 4], &[2, 2]).unwrap();
        assert_eq!(indexer.output_shape(), &[2]);
        assert_eq!(
            indexer.projections(),
            &[
                ChunkProjection::new(
                    vec![0, 1],
                    vec![
                        ChunkDimProjection::Slice { chunk_start: 1, chunk_stop: 2, chunk_step: 1, output_start: 0, output_stop: 1 },
                        ChunkDimProjection::Index { chunk_local: 0 },
                    ]
                ),
                ChunkProjection::new(
                    vec![1, 1],
                    vec![
                        ChunkDimProjection::Slice { chunk_start: 0, chunk_stop: 1, chunk_step: 1, output_start: 1, output_stop: 2 },
                        ChunkDimProjection::Index { chunk_local: 0 },
                    ]
                ),
            ]
        );
    }

    #[test]
    fn indexer_full_coverage() {
        let shape = [7, 5, 3];
        let chunk_shape = [3, 2, 3];
        let indexer = BasicIndexer::new(&ArraySelection::full(), &shape, &chunk_shape).unwrap();
        assert_eq!(indexer.output_shape(), &shape);
        assert_eq!(indexer.projections().len(), 3 * 3);

        let mut covered = vec![0u8; shape.iter().product::<u64>() as usize];
        for projection in indexer.projections() {
            projection.for_each_run(&chunk_shape, &shape, |_, output, len| {
                for i in output..output + len {
                    covered[i as usize] += 1;
                }
            });
        }
        assert!(covered.iter().all(|count| *count == 1));
    }

    #[test]
    fn indexer_row_major_order() {
        let indexer = BasicIndexer::new(&ArraySelection::full(), &[4, 6], &[2, 3]).unwrap();
        let chunks: Vec<Vec<u64>> = indexer
            .projections()
            .iter()
            .map(|projection| projection.chunk_indices().to_vec())
            .collect();
        assert_eq!(chunks, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
    }

    #[test]
    fn indexer_padding_and_scalar() {
        let selection = ArraySelection::new(vec![DimensionSelection::Index(-1)]);
        let indexer = BasicIndexer::new(&selection, &[4, 6], &[2, 3]).unwrap();
        assert_eq!(indexer.output_shape(), &[6]);
        assert_eq!(indexer.projections().len(), 2);

        let selection = ArraySelection::new(vec![DimensionSelection::Index(3), DimensionSelection::Index(5)]);
        let indexer = BasicIndexer::new(&selection, &[4, 6], &[2, 3]).unwrap();
        assert!(indexer.output_shape().is_empty());
        assert_eq!(indexer.num_elements(), 1);
        assert_eq!(indexer.projections()[0].chunk_indices(), &[1, 1]);
    }

    #[test]
    fn indexer_errors() {
        let selection = ArraySelection::new(vec![DimensionSelection::Full; 3]);
        assert!(matches!(
            BasicIndexer::new(&selection, &[4, 6], &[2, 3]),
            Err(IndexerError::TooManyDimensions { selection: 3, array: 2 })
        ));
        let selection = ArraySelection::new(vec![DimensionSelection::Index(4)]);
        assert!(matches!(
            BasicIndexer::new(&selection, &[4, 6], &[2, 3]),
            Err(IndexerError::IndexOutOfBounds { index: 4, len: 4 })
        ));
        assert!(matches!(
            BasicIndexer::new(&ArraySelection::full(), &[4, 6], &[2]),
            Err(IndexerError::IncompatibleChunkShape(..))
        ));
        assert!(matches!(
            BasicIndexer::new(&ArraySelection::full(), &[4, 6], &[2, 0]),
            Err(IndexerError::IncompatibleChunkShape(..))
        ));
    }

    #[test]
    fn indexer_empty_selection() {
        let selection = ArraySelection::new(vec![SliceSelection::range(2, 2).into()]);
        let indexer = BasicIndexer::new(&selection, &[4, 6], &[2, 3]).unwrap();
        assert_eq!(indexer.output_shape(), &[0, 6]);
        assert_eq!(indexer.num_elements(), 0);
        assert!(indexer.projections().iter().all(ChunkProjection::is_empty));
    }
}
