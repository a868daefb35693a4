//! One query batch against one target batch: sketch, index, match, detect,
//! filter and fuse. Choosing batches and retrying on capacity errors is up to
//! the caller.

use std::ops::{AddAssign, Range};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exec::Execution;
use crate::index::{Index, IndexFactory};
use crate::matcher::{MatchError, Matcher, MatcherFactory};
use crate::overlapper::{
    filter_overlaps, fuse_overlaps, FilterParams, Overlapper, OverlapperFactory, TriggerParams,
};
use crate::reads::ReadSource;
use crate::sketch::{SketchError, SketchParams};
use crate::types::{Overlap, ReadId};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Sketch(#[from] SketchError),
    #[error(transparent)]
    Match(#[from] MatchError),
}

impl PipelineError {
    /// Whether a smaller target batch could succeed
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, PipelineError::Match(MatchError::CapacityExceeded { .. }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineParams {
    pub sketch: SketchParams,
    pub trigger: TriggerParams,
    pub filter: FilterParams,
    /// Largest number of anchors one batch pair may produce
    pub max_anchors: Option<usize>,
    pub execution: Execution,
}

/// Counters for one or more batch pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub batch_pairs: u64,
    pub query_reads: u64,
    pub target_reads: u64,
    pub query_occurrences: u64,
    pub target_occurrences: u64,
    pub anchors: u64,
    pub candidate_overlaps: u64,
    pub filtered_overlaps: u64,
    pub overlaps: u64,
}

impl AddAssign<&PipelineStats> for PipelineStats {
    fn add_assign(&mut self, other: &PipelineStats) {
        self.batch_pairs += other.batch_pairs;
        self.query_reads += other.query_reads;
        self.target_reads += other.target_reads;
        self.query_occurrences += other.query_occurrences;
        self.target_occurrences += other.target_occurrences;
        self.anchors += other.anchors;
        self.candidate_overlaps += other.candidate_overlaps;
        self.filtered_overlaps += other.filtered_overlaps;
        self.overlaps += other.overlaps;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    pub overlaps: Vec<Overlap>,
    pub stats: PipelineStats,
}

pub struct OverlapPipeline {
    params: PipelineParams,
    matcher: Box<dyn Matcher>,
    overlapper: Box<dyn Overlapper>,
}

impl OverlapPipeline {
    pub fn new(params: PipelineParams) -> PipelineResult<Self> {
        params.sketch.validate()?;
        let matcher = MatcherFactory::create(params.execution, params.max_anchors);
        let overlapper = OverlapperFactory::create(params.trigger, params.execution);
        debug!(
            "Pipeline uses matcher '{}' and overlapper '{}'",
            matcher.name(),
            overlapper.name()
        );
        Ok(Self {
            params,
            matcher,
            overlapper,
        })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Same pipeline with a different anchor bound
    pub fn with_max_anchors(mut self, max_anchors: Option<usize>) -> Self {
        self.params.max_anchors = max_anchors;
        self.matcher = MatcherFactory::create(self.params.execution, max_anchors);
        self
    }

    pub fn build_index<R: ReadSource + ?Sized>(
        &self,
        reads: &R,
        read_range: Range<ReadId>,
    ) -> PipelineResult<Box<dyn Index>> {
        let index = IndexFactory::create(
            reads,
            read_range.start,
            read_range.end,
            &self.params.sketch,
            self.params.execution,
        )?;
        Ok(index)
    }

    /// Overlaps between two built indices. `self_comparison` is set when
    /// both were built from the same read source.
    pub fn overlap_indices(
        &self,
        query_index: &dyn Index,
        target_index: &dyn Index,
        self_comparison: bool,
    ) -> PipelineResult<BatchOutput> {
        let anchors = self
            .matcher
            .find_anchors(query_index, target_index, self_comparison)?;
        let candidates = self.overlapper.get_overlaps(&anchors, query_index, target_index);
        let candidate_count = candidates.len();
        let filtered = filter_overlaps(candidates, &self.params.filter);
        let filtered_count = filtered.len();
        let overlaps = fuse_overlaps(filtered);

        let stats = PipelineStats {
            batch_pairs: 1,
            query_reads: query_index.number_of_reads() as u64,
            target_reads: target_index.number_of_reads() as u64,
            query_occurrences: query_index.number_of_occurrences() as u64,
            target_occurrences: target_index.number_of_occurrences() as u64,
            anchors: anchors.len() as u64,
            candidate_overlaps: candidate_count as u64,
            filtered_overlaps: filtered_count as u64,
            overlaps: overlaps.len() as u64,
        };

        debug!(
            "Reads [{}, {}) vs [{}, {}): {} anchors, {} candidates, {} after filter, {} fused",
            query_index.first_read_id(),
            query_index.past_last_read_id(),
            target_index.first_read_id(),
            target_index.past_last_read_id(),
            stats.anchors,
            stats.candidate_overlaps,
            stats.filtered_overlaps,
            stats.overlaps
        );

        Ok(BatchOutput { overlaps, stats })
    }

    /// Build indices over two separate read sources and overlap them
    pub fn run<Q, T>(
        &self,
        query_reads: &Q,
        query_range: Range<ReadId>,
        target_reads: &T,
        target_range: Range<ReadId>,
    ) -> PipelineResult<BatchOutput>
    where
        Q: ReadSource + ?Sized,
        T: ReadSource + ?Sized,
    {
        let query_index = self.build_index(query_reads, query_range)?;
        let target_index = self.build_index(target_reads, target_range)?;
        self.overlap_indices(query_index.as_ref(), target_index.as_ref(), false)
    }

    /// Two read ranges of the same source against each other
    pub fn run_within<R: ReadSource + ?Sized>(
        &self,
        reads: &R,
        query_range: Range<ReadId>,
        target_range: Range<ReadId>,
    ) -> PipelineResult<BatchOutput> {
        let query_index = self.build_index(reads, query_range)?;
        let target_index = self.build_index(reads, target_range)?;
        self.overlap_indices(query_index.as_ref(), target_index.as_ref(), true)
    }

    /// Every read of `reads` against every other read, in one batch pair
    pub fn all_vs_all<R: ReadSource + ?Sized>(&self, reads: &R) -> PipelineResult<BatchOutput> {
        let range = 0..reads.number_of_reads() as ReadId;
        info!("Overlapping {} reads all-vs-all", range.end);
        let index = self.build_index(reads, range)?;
        self.overlap_indices(index.as_ref(), index.as_ref(), true)
    }
}
