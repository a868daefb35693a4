use log::debug;
use rayon::prelude::*;

use super::Index;
use crate::exec::Execution;
use crate::reads::ReadSource;
use crate::sketch::batch::check_read_range;
use crate::sketch::{SketchBatch, SketchElement, SketchParams, SketchResult};
use crate::types::{Position, ReadId, Representation, Strand};

/// Index held in host memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinimizerIndex {
    params: SketchParams,
    first_read_id: ReadId,
    past_last_read_id: ReadId,
    representations: Vec<Representation>,
    read_ids: Vec<ReadId>,
    positions_in_reads: Vec<Position>,
    directions: Vec<Strand>,
    unique_representations: Vec<Representation>,
    first_occurrence_of_representations: Vec<usize>,
    read_names: Vec<String>,
    read_lengths: Vec<Position>,
}

impl MinimizerIndex {
    pub fn build<R: ReadSource + ?Sized>(
        reads: &R,
        first_read_id: ReadId,
        past_last_read_id: ReadId,
        params: &SketchParams,
        execution: Execution,
    ) -> SketchResult<Self> {
        params.validate()?;
        check_read_range(reads, first_read_id, past_last_read_id)?;

        let batch =
            SketchBatch::generate(reads, first_read_id, past_last_read_id, params, execution)?;
        let (representations, read_ids, positions_in_reads, directions) =
            occurrence_arrays(batch.into_elements(), execution);

        let (unique_representations, first_occurrence_of_representations) =
            find_first_occurrences(&representations, execution);

        let read_names = (first_read_id..past_last_read_id)
            .map(|id| reads.read_name(id).unwrap_or_default().to_string())
            .collect();
        let read_lengths = (first_read_id..past_last_read_id)
            .map(|id| reads.read_length(id).unwrap_or(0))
            .collect();

        debug!(
            "Built index for reads [{}, {}): {} occurrences, {} distinct representations",
            first_read_id,
            past_last_read_id,
            representations.len(),
            unique_representations.len()
        );

        Ok(Self {
            params: *params,
            first_read_id,
            past_last_read_id,
            representations,
            read_ids,
            positions_in_reads,
            directions,
            unique_representations,
            first_occurrence_of_representations,
            read_names,
            read_lengths,
        })
    }

    pub fn params(&self) -> &SketchParams {
        &self.params
    }

    fn local(&self, read_id: ReadId) -> Option<usize> {
        if read_id < self.first_read_id || read_id >= self.past_last_read_id {
            return None;
        }
        usize::try_from(read_id - self.first_read_id).ok()
    }
}

type OccurrenceArrays = (Vec<Representation>, Vec<ReadId>, Vec<Position>, Vec<Strand>);

/// Sort sketch elements into index order and split them into parallel arrays
fn occurrence_arrays<E: SketchElement + Send>(
    mut elements: Vec<E>,
    execution: Execution,
) -> OccurrenceArrays {
    execution.sort_by_key(&mut elements, E::index_key);

    let mut arrays: OccurrenceArrays = (
        Vec::with_capacity(elements.len()),
        Vec::with_capacity(elements.len()),
        Vec::with_capacity(elements.len()),
        Vec::with_capacity(elements.len()),
    );
    for element in &elements {
        arrays.0.push(element.representation());
        arrays.1.push(element.read_id());
        arrays.2.push(element.position_in_read());
        arrays.3.push(element.direction());
    }
    arrays
}

/// Distinct values of a sorted slice and the offset at which each run
/// starts, followed by `sorted.len()` as a sentinel. A run starts wherever
/// the value differs from its predecessor, so boundaries can be found
/// independently per element.
pub fn find_first_occurrences(
    sorted: &[Representation],
    execution: Execution,
) -> (Vec<Representation>, Vec<usize>) {
    let is_run_start = |&i: &usize| i == 0 || sorted[i] != sorted[i - 1];

    let mut first_occurrences: Vec<usize> = match execution {
        Execution::Sequential => (0..sorted.len()).filter(is_run_start).collect(),
        Execution::Parallel => (0..sorted.len())
            .into_par_iter()
            .filter(is_run_start)
            .collect(),
    };
    let unique = first_occurrences.iter().map(|&i| sorted[i]).collect();
    first_occurrences.push(sorted.len());

    (unique, first_occurrences)
}

impl Index for MinimizerIndex {
    fn representations(&self) -> &[Representation] {
        &self.representations
    }

    fn read_ids(&self) -> &[ReadId] {
        &self.read_ids
    }

    fn positions_in_reads(&self) -> &[Position] {
        &self.positions_in_reads
    }

    fn directions(&self) -> &[Strand] {
        &self.directions
    }

    fn unique_representations(&self) -> &[Representation] {
        &self.unique_representations
    }

    fn first_occurrence_of_representations(&self) -> &[usize] {
        &self.first_occurrence_of_representations
    }

    fn first_read_id(&self) -> ReadId {
        self.first_read_id
    }

    fn past_last_read_id(&self) -> ReadId {
        self.past_last_read_id
    }

    fn read_name(&self, read_id: ReadId) -> Option<&str> {
        self.local(read_id).map(|i| self.read_names[i].as_str())
    }

    fn read_length(&self, read_id: ReadId) -> Option<Position> {
        self.local(read_id).map(|i| self.read_lengths[i])
    }

    fn minimizer_size(&self) -> u32 {
        self.params.k
    }

    fn window_size(&self) -> u32 {
        self.params.w
    }

    fn hash_representations(&self) -> bool {
        self.params.hash_representations
    }
}
