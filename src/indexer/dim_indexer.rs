use super::{ChunkDimProjection, DimensionSelection, IndexerError, SliceSelection};

/// The projections of a selection of one array dimension onto the chunks of that dimension.
#[derive(Clone, Debug)]
pub(super) struct DimIndexer {
    /// The number of output elements, or [`None`] if the dimension is dropped from the output.
    pub output_len: Option<u64>,
    /// The chunk index and projection of each touched chunk, in ascending chunk order.
    pub projections: Vec<(u64, ChunkDimProjection)>,
}

/// A slice normalised against a dimension length.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct NormalisedSlice {
    start: u64,
    step: u64,
    count: u64,
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn normalise_index(index: i64, len: u64) -> Result<u64, IndexerError> {
    let len_i = len as i64;
    let normalised = if index < 0 { index + len_i } else { index };
    if (0..len_i).contains(&normalised) {
        Ok(normalised as u64)
    } else {
        Err(IndexerError::IndexOutOfBounds { index, len })
    }
}

/// Normalise a slice bound with the clamped rule: negative bounds count from the end, then the bound is clamped to `[0, len]`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn normalise_bound(bound: i64, len: u64) -> u64 {
    let len_i = len as i64;
    if bound < 0 {
        (bound + len_i).max(0) as u64
    } else {
        (bound as u64).min(len)
    }
}

#[allow(clippy::cast_sign_loss)]
fn normalise_slice(slice: &SliceSelection, len: u64) -> Result<NormalisedSlice, IndexerError> {
    let step = slice.step.unwrap_or(1);
    if step <= 0 {
        return Err(IndexerError::InvalidStep(step));
    }
    let step = step as u64;
    let start = slice.start.map_or(0, |start| normalise_bound(start, len));
    let stop = slice.stop.map_or(len, |stop| normalise_bound(stop, len));
    let count = stop.saturating_sub(start).div_ceil(step);
    Ok(NormalisedSlice { start, step, count })
}

impl DimIndexer {
    pub(super) fn new(
        selection: &DimensionSelection,
        len: u64,
        chunk_len: u64,
    ) -> Result<Self, IndexerError> {
        match selection {
            DimensionSelection::Index(index) => {
                let index = normalise_index(*index, len)?;
                Ok(Self {
                    output_len: None,
                    projections: vec![(
                        index / chunk_len,
                        ChunkDimProjection::Index {
                            chunk_local: index % chunk_len,
                        },
                    )],
                })
            }
            DimensionSelection::Slice(slice) => {
                let slice = normalise_slice(slice, len)?;
                Ok(Self::new_slice(slice, len, chunk_len))
            }
            DimensionSelection::Full => Ok(Self::new_slice(
                NormalisedSlice {
                    start: 0,
                    step: 1,
                    count: len,
                },
                len,
                chunk_len,
            )),
        }
    }

    fn new_slice(slice: NormalisedSlice, len: u64, chunk_len: u64) -> Self {
        let NormalisedSlice { start, step, count } = slice;
        if count == 0 {
            // A zero-length selection touches the chunk holding `start`, clamped into the grid
            let num_chunks = len.div_ceil(chunk_len);
            let chunk = (start / chunk_len).min(num_chunks.saturating_sub(1));
            let chunk_local = start.saturating_sub(chunk * chunk_len).min(chunk_len);
            return Self {
                output_len: Some(0),
                projections: vec![(
                    chunk,
                    ChunkDimProjection::Slice {
                        chunk_start: chunk_local,
                        chunk_stop: chunk_local,
                        chunk_step: step,
                        output_start: 0,
                        output_stop: 0,
                    },
                )],
            };
        }

        let last = start + (count - 1) * step;
        let projections = (start / chunk_len..=last / chunk_len)
            .filter_map(|chunk| {
                let chunk_offset = chunk * chunk_len;
                let chunk_end = (chunk_offset + chunk_len).min(len);
                // The first and last output positions whose elements lie in this chunk
                let output_first = chunk_offset.saturating_sub(start).div_ceil(step);
                let output_last = ((chunk_end - 1 - start) / step).min(count - 1);
                let first = start + output_first * step;
                if first >= chunk_end || output_first > output_last {
                    return None;
                }
                let last = start + output_last * step;
                Some((
                    chunk,
                    ChunkDimProjection::Slice {
                        chunk_start: first - chunk_offset,
                        chunk_stop: last - chunk_offset + 1,
                        chunk_step: step,
                        output_start: output_first,
                        output_stop: output_last + 1,
                    },
                ))
            })
            .collect();
        Self {
            output_len: Some(count),
            projections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> DimensionSelection {
        DimensionSelection::Slice(SliceSelection { start, stop, step })
    }

    #[test]
    fn dim_indexer_index() {
        let indexer = DimIndexer::new(&DimensionSelection::Index(7), 10, 3).unwrap();
        assert_eq!(indexer.output_len, None);
        assert_eq!(
            indexer.projections,
            vec![(2, ChunkDimProjection::Index { chunk_local: 1 })]
        );
        let indexer = DimIndexer::new(&DimensionSelection::Index(-1), 10, 3).unwrap();
        assert_eq!(
            indexer.projections,
            vec![(3, ChunkDimProjection::Index { chunk_local: 0 })]
        );
        assert!(DimIndexer::new(&DimensionSelection::Index(10), 10, 3).is_err());
        assert!(DimIndexer::new(&DimensionSelection::Index(-11), 10, 3).is_err());
    }

    #[test]
    fn dim_indexer_slice() {
        let indexer = DimIndexer::new(&slice(Some(2), Some(8), None), 10, 3).unwrap();
        assert_eq!(indexer.output_len, Some(6));
        assert_eq!(
            indexer.projections,
            vec![
                (0, ChunkDimProjection::Slice { chunk_start: 2, chunk_stop: 3, chunk_step: 1, output_start: 0, output_stop: 1 }),
                (1, ChunkDimProjection::Slice { chunk_start: 0, chunk_stop: 3, chunk_step: 1, output_start: 1, output_stop: 4 }),
                (2, ChunkDimProjection::Slice { chunk_start: 0, chunk_stop: 2, chunk_step: 1, output_start: 4, output_stop: 6 }),
            ]
        );
    }

    #[test]
    fn dim_indexer_slice_step() {
        // Elements 1, 5, 9 with chunks [0..4) [4..8) [8..10)
        let indexer = DimIndexer::new(&slice(Some(1), None, Some(4)), 10, 4).unwrap();
        assert_eq!(indexer.output_len, Some(3));
        assert_eq!(
            indexer.projections,
            vec![
                (0, ChunkDimProjection::Slice { chunk_start: 1, chunk_stop: 2, chunk_step: 4, output_start: 0, output_stop: 1 }),
                (1, ChunkDimProjection::Slice { chunk_start: 1, chunk_stop: 2, chunk_step: 4, output_start: 1, output_stop: 2 }),
                (2, ChunkDimProjection::Slice { chunk_start: 1, chunk_stop: 2, chunk_step: 4, output_start: 2, output_stop: 3 }),
            ]
        );

        // Elements 0, 5 with chunks of 2: chunks 1 and 3 hold no selected elements
        let indexer = DimIndexer::new(&slice(None, Some(6), Some(5)), 10, 2).unwrap();
        assert_eq!(indexer.output_len, Some(2));
        assert_eq!(
            indexer.projections.iter().map(|(chunk, _)| *chunk).collect::<Vec<_>>(),
            vec![0, 2]
        );
    }

    #[test]
    fn dim_indexer_slice_clamped() {
        let indexer = DimIndexer::new(&slice(Some(-3), Some(100), None), 10, 3).unwrap();
        assert_eq!(indexer.output_len, Some(3));
        assert_eq!(indexer.projections.len(), 2);
        let indexer = DimIndexer::new(&slice(Some(-100), Some(-8), None), 10, 3).unwrap();
        assert_eq!(indexer.output_len, Some(2));
    }

    #[test]
    fn dim_indexer_slice_empty() {
        let indexer = DimIndexer::new(&slice(Some(5), Some(5), None), 10, 3).unwrap();
        assert_eq!(indexer.output_len, Some(0));
        assert_eq!(
            indexer.projections,
            vec![(1, ChunkDimProjection::Slice { chunk_start: 2, chunk_stop: 2, chunk_step: 1, output_start: 0, output_stop: 0 })]
        );
        let indexer = DimIndexer::new(&slice(Some(20), None, None), 10, 3).unwrap();
        assert_eq!(indexer.output_len, Some(0));
        assert_eq!(indexer.projections[0].0, 3);
        let indexer = DimIndexer::new(&slice(Some(7), Some(2), None), 10, 3).unwrap();
        assert_eq!(indexer.output_len, Some(0));
    }

    #[test]
    fn dim_indexer_slice_invalid_step() {
        assert!(matches!(
            DimIndexer::new(&slice(None, None, Some(0)), 10, 3),
            Err(IndexerError::InvalidStep(0))
        ));
        assert!(matches!(
            DimIndexer::new(&slice(None, None, Some(-1)), 10, 3),
            Err(IndexerError::InvalidStep(-1))
        ));
    }
}
