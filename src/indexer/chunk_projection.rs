use super::c_order_strides;

/// The projection of a selection of one array dimension onto one chunk.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ChunkDimProjection {
    /// A single element of the chunk. The dimension is dropped from the output.
    Index {
        /// The chunk-local index.
        chunk_local: u64,
    },
    /// A strided range of elements of the chunk, mapped to a contiguous range of the output.
    Slice {
        /// The chunk-local start (inclusive).
        chunk_start: u64,
        /// The chunk-local stop (exclusive).
        chunk_stop: u64,
        /// The chunk-local step.
        chunk_step: u64,
        /// The output start (inclusive).
        output_start: u64,
        /// The output stop (exclusive).
        output_stop: u64,
    },
}

impl ChunkDimProjection {
    /// The number of selected elements.
    #[must_use]
    pub const fn len(&self) -> u64 {
        match self {
            Self::Index { .. } => 1,
            Self::Slice {
                output_start,
                output_stop,
                ..
            } => *output_stop - *output_start,
        }
    }

    /// Returns true if no elements are selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every element of a chunk dimension of length `chunk_len` is selected.
    #[must_use]
    pub const fn is_full(&self, chunk_len: u64) -> bool {
        match self {
            Self::Index { .. } => chunk_len == 1,
            Self::Slice {
                chunk_start,
                chunk_stop,
                chunk_step,
                ..
            } => *chunk_start == 0 && *chunk_stop == chunk_len && *chunk_step == 1,
        }
    }
}

/// The projection of a selection onto one chunk.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ChunkProjection {
    chunk_indices: Vec<u64>,
    dims: Vec<ChunkDimProjection>,
}

impl ChunkProjection {
    /// Create a new chunk projection.
    #[must_use]
    pub fn new(chunk_indices: Vec<u64>, dims: Vec<ChunkDimProjection>) -> Self {
        Self {
            chunk_indices,
            dims,
        }
    }

    /// The chunk grid coordinates of the chunk.
    #[must_use]
    pub fn chunk_indices(&self) -> &[u64] {
        &self.chunk_indices
    }

    /// The projection of each array dimension.
    #[must_use]
    pub fn dims(&self) -> &[ChunkDimProjection] {
        &self.dims
    }

    /// The number of selected elements in the chunk.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.dims.iter().map(ChunkDimProjection::len).product()
    }

    /// Returns true if no elements of the chunk are selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(ChunkDimProjection::is_empty)
    }

    /// Returns true if every element of a chunk with `chunk_shape` is selected.
    #[must_use]
    pub fn is_full_chunk(&self, chunk_shape: &[u64]) -> bool {
        self.dims.len() == chunk_shape.len()
            && std::iter::zip(&self.dims, chunk_shape).all(|(dim, len)| dim.is_full(*len))
    }

    /// Call `f(chunk_element_offset, output_element_offset, num_elements)` for every contiguous run of selected elements.
    ///
    /// The chunk has shape `chunk_shape` and the output has shape `output_shape`, both in C (row-major) order.
    /// Element offsets are linearised offsets, not byte offsets.
    /// Runs span at most the innermost dimension.
    pub fn for_each_run(
        &self,
        chunk_shape: &[u64],
        output_shape: &[u64],
        mut f: impl FnMut(u64, u64, u64),
    ) {
        if self.is_empty() {
            return;
        }
        let chunk_strides = c_order_strides(chunk_shape);
        let output_strides = c_order_strides(output_shape);

        // (chunk offset, chunk step, output offset, output step, length) of each dimension
        let mut output_dim = 0;
        let dims: Vec<(u64, u64, u64, u64, u64)> = std::iter::zip(&self.dims, &chunk_strides)
            .map(|(dim, chunk_stride)| match dim {
                ChunkDimProjection::Index { chunk_local } => {
                    (chunk_local * chunk_stride, 0, 0, 0, 1)
                }
                ChunkDimProjection::Slice {
                    chunk_start,
                    chunk_step,
                    output_start,
                    output_stop,
                    ..
                } => {
                    let output_stride = output_strides[output_dim];
                    output_dim += 1;
                    (
                        chunk_start * chunk_stride,
                        chunk_step * chunk_stride,
                        output_start * output_stride,
                        output_stride,
                        output_stop - output_start,
                    )
                }
            })
            .collect();

        let Some((&inner, outer)) = dims.split_last() else {
            f(0, 0, 1);
            return;
        };
        let (inner_chunk, inner_chunk_step, inner_output, inner_output_step, inner_len) = inner;
        let contiguous = inner_len == 1 || (inner_chunk_step == 1 && inner_output_step == 1);

        let mut counter = vec![0u64; outer.len()];
        loop {
            let (chunk_offset, output_offset) = std::iter::zip(outer, &counter).fold(
                (inner_chunk, inner_output),
                |(chunk_offset, output_offset), (&(c, cs, o, os, _), &i)| {
                    (chunk_offset + c + i * cs, output_offset + o + i * os)
                },
            );
            if contiguous {
                f(chunk_offset, output_offset, inner_len);
            } else {
                for i in 0..inner_len {
                    f(
                        chunk_offset + i * inner_chunk_step,
                        output_offset + i * inner_output_step,
                        1,
                    );
                }
            }

            // Advance the outer dimensions in C order
            let mut dim = outer.len();
            loop {
                if dim == 0 {
                    return;
                }
                dim -= 1;
                counter[dim] += 1;
                if counter[dim] < outer[dim].4 {
                    break;
                }
                counter[dim] = 0;
            }
        }
    }
}
