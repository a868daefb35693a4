//! Sketching many reads into one shared buffer.

use log::debug;

use super::minimizer::sketch_read;
use super::{Minimizer, SketchError, SketchParams, SketchResult};
use crate::exec::Execution;
use crate::reads::ReadSource;
use crate::types::{ArrayBlock, ReadId};

/// Minimizers of a contiguous range of reads. `blocks[i]` locates the
/// elements of read `first_read_id + i` inside `elements`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SketchBatch {
    pub first_read_id: ReadId,
    pub elements: Vec<Minimizer>,
    pub blocks: Vec<ArrayBlock>,
}

impl SketchBatch {
    /// Sketch reads `[first_read_id, past_last_read_id)` of `reads`. Reads are
    /// independent units of work.
    pub fn generate<R: ReadSource + ?Sized>(
        reads: &R,
        first_read_id: ReadId,
        past_last_read_id: ReadId,
        params: &SketchParams,
        execution: Execution,
    ) -> SketchResult<Self> {
        params.validate()?;
        check_read_range(reads, first_read_id, past_last_read_id)?;

        let read_ids: Vec<ReadId> = (first_read_id..past_last_read_id).collect();
        let per_read = execution.map(&read_ids, |&read_id| {
            let sequence = reads.read_sequence(read_id).unwrap_or_default();
            sketch_read(sequence, read_id, params)
        });

        let total: usize = per_read.iter().map(Vec::len).sum();
        let mut elements = Vec::with_capacity(total);
        let mut blocks = Vec::with_capacity(per_read.len());
        for minimizers in per_read {
            blocks.push(ArrayBlock {
                first_element: elements.len(),
                block_size: minimizers.len() as u32,
            });
            elements.extend(minimizers);
        }

        debug!(
            "Sketched reads [{}, {}): {} minimizers",
            first_read_id,
            past_last_read_id,
            elements.len()
        );

        Ok(Self {
            first_read_id,
            elements,
            blocks,
        })
    }

    pub fn number_of_reads(&self) -> usize {
        self.blocks.len()
    }

    /// Minimizers of one read, empty when the read is outside the batch
    pub fn read_elements(&self, read_id: ReadId) -> &[Minimizer] {
        read_id
            .checked_sub(self.first_read_id)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.blocks.get(i))
            .map(|block| &self.elements[block.range()])
            .unwrap_or(&[])
    }

    pub fn into_elements(self) -> Vec<Minimizer> {
        self.elements
    }
}

pub(crate) fn check_read_range<R: ReadSource + ?Sized>(
    reads: &R,
    first_read_id: ReadId,
    past_last_read_id: ReadId,
) -> SketchResult<()> {
    let number_of_reads = reads.number_of_reads();
    if first_read_id > past_last_read_id || past_last_read_id > number_of_reads as ReadId {
        return Err(SketchError::InvalidReadRange {
            first: first_read_id,
            past_last: past_last_read_id,
            number_of_reads,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reads::ReadSet;

    fn reads() -> ReadSet {
        vec![("r0", "CATCAAG"), ("r1", "AAGCTA"), ("r2", "AC")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_blocks_locate_reads() {
        let batch = SketchBatch::generate(
            &reads(),
            0,
            3,
            &SketchParams::new(3, 2, false),
            Execution::Sequential,
        )
        .unwrap();

        assert_eq!(batch.elements.len(), 7);
        assert_eq!(
            batch.blocks,
            vec![
                ArrayBlock { first_element: 0, block_size: 4 },
                ArrayBlock { first_element: 4, block_size: 3 },
                ArrayBlock { first_element: 7, block_size: 0 },
            ]
        );
        assert_eq!(batch.read_elements(1).len(), 3);
        assert!(batch.read_elements(1).iter().all(|m| m.read_id == 1));
        assert!(batch.read_elements(2).is_empty());
        assert!(batch.read_elements(7).is_empty());
    }

    #[test]
    fn test_offset_range_keeps_global_ids() {
        let batch = SketchBatch::generate(
            &reads(),
            1,
            2,
            &SketchParams::new(3, 2, false),
            Execution::Parallel,
        )
        .unwrap();
        assert_eq!(batch.number_of_reads(), 1);
        assert!(batch.elements.iter().all(|m| m.read_id == 1));
        assert!(batch.read_elements(0).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let params = SketchParams::new(3, 2, true);
        let seq = SketchBatch::generate(&reads(), 0, 3, &params, Execution::Sequential).unwrap();
        let par = SketchBatch::generate(&reads(), 0, 3, &params, Execution::Parallel).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_invalid_range() {
        let err = SketchBatch::generate(
            &reads(),
            2,
            5,
            &SketchParams::default(),
            Execution::Sequential,
        )
        .unwrap_err();
        assert!(matches!(err, SketchError::InvalidReadRange { .. }));
    }
}
