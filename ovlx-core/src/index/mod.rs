//! Minimizer index
//!
//! An inverted index over the minimizers of a contiguous range of reads.
//! Occurrences are stored as parallel arrays sorted by representation, plus
//! a summary of the distinct representations and the offset at which each
//! run of equal representations starts.

use std::ops::Range;

use crate::exec::Execution;
use crate::reads::ReadSource;
use crate::sketch::{SketchParams, SketchResult};
use crate::types::{Position, ReadId, Representation, Strand};

pub mod minimizer_index;

pub use minimizer_index::{find_first_occurrences, MinimizerIndex};

/// Read-only view of a built index. Built indices are immutable and may be
/// shared across threads.
pub trait Index: Send + Sync {
    /// Representation of every occurrence, ascending
    fn representations(&self) -> &[Representation];

    fn read_ids(&self) -> &[ReadId];

    fn positions_in_reads(&self) -> &[Position];

    fn directions(&self) -> &[Strand];

    /// Distinct representations, strictly ascending
    fn unique_representations(&self) -> &[Representation];

    /// Start offset of each run of `unique_representations`, followed by a
    /// sentinel equal to the number of occurrences
    fn first_occurrence_of_representations(&self) -> &[usize];

    fn first_read_id(&self) -> ReadId;

    fn past_last_read_id(&self) -> ReadId;

    fn read_name(&self, read_id: ReadId) -> Option<&str>;

    fn read_length(&self, read_id: ReadId) -> Option<Position>;

    fn minimizer_size(&self) -> u32;

    fn window_size(&self) -> u32;

    fn hash_representations(&self) -> bool;

    fn number_of_reads(&self) -> usize {
        (self.past_last_read_id() - self.first_read_id()) as usize
    }

    fn number_of_occurrences(&self) -> usize {
        self.representations().len()
    }

    fn number_of_basepairs(&self) -> u64 {
        (self.first_read_id()..self.past_last_read_id())
            .filter_map(|id| self.read_length(id))
            .map(u64::from)
            .sum()
    }

    fn is_empty(&self) -> bool {
        self.representations().is_empty()
    }

    /// Occurrence slice of one representation, empty when absent
    fn occurrences_of(&self, representation: Representation) -> Range<usize> {
        let first_occurrence = self.first_occurrence_of_representations();
        match self.unique_representations().binary_search(&representation) {
            Ok(j) => first_occurrence[j]..first_occurrence[j + 1],
            Err(_) => 0..0,
        }
    }

    /// Occurrence slice of the `j`-th distinct representation
    fn run(&self, j: usize) -> Range<usize> {
        let first_occurrence = self.first_occurrence_of_representations();
        first_occurrence[j]..first_occurrence[j + 1]
    }
}

/// Factory for building indices
pub struct IndexFactory;

impl IndexFactory {
    /// Build an index over reads `[first_read_id, past_last_read_id)`.
    /// Invalid sketch parameters are rejected before any work is done.
    pub fn create<R: ReadSource + ?Sized>(
        reads: &R,
        first_read_id: ReadId,
        past_last_read_id: ReadId,
        params: &SketchParams,
        execution: Execution,
    ) -> SketchResult<Box<dyn Index>> {
        let index =
            MinimizerIndex::build(reads, first_read_id, past_last_read_id, params, execution)?;
        Ok(Box::new(index))
    }
}
