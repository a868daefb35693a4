use std::cmp::Ordering;

use log::debug;

use super::{check_compatible, MatchError, MatchResult, Matcher};
use crate::exec::Execution;
use crate::index::Index;
use crate::types::Anchor;

/// Pair of run numbers, one per index, with equal representation
type SharedRun = (usize, usize);

/// Sort-merge join over the distinct representations of two indices
pub struct MergeJoinMatcher {
    execution: Execution,
    max_anchors: Option<usize>,
}

impl MergeJoinMatcher {
    pub fn new(execution: Execution, max_anchors: Option<usize>) -> Self {
        Self {
            execution,
            max_anchors,
        }
    }

    /// Runs of representations present in both indices
    fn shared_runs(query_index: &dyn Index, target_index: &dyn Index) -> Vec<SharedRun> {
        let query = query_index.unique_representations();
        let target = target_index.unique_representations();
        let mut shared = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < query.len() && j < target.len() {
            match query[i].cmp(&target[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    shared.push((i, j));
                    i += 1;
                    j += 1;
                }
            }
        }

        shared
    }

    /// Number of anchors one shared run produces
    fn count_run(
        query_index: &dyn Index,
        target_index: &dyn Index,
        (qj, tj): SharedRun,
        check_self: bool,
    ) -> usize {
        let query_run = query_index.run(qj);
        let target_run = target_index.run(tj);
        let pairs = query_run.len() * target_run.len();
        if !check_self {
            return pairs;
        }

        // both runs are sorted by (read id, position), so identical
        // occurrences are found by a merge
        let key = |index: &dyn Index, i: usize| (index.read_ids()[i], index.positions_in_reads()[i]);
        let (mut q, mut t) = (query_run.start, target_run.start);
        let mut identical = 0;
        while q < query_run.end && t < target_run.end {
            match key(query_index, q).cmp(&key(target_index, t)) {
                Ordering::Less => q += 1,
                Ordering::Greater => t += 1,
                Ordering::Equal => {
                    identical += 1;
                    q += 1;
                    t += 1;
                }
            }
        }

        pairs - identical
    }

    fn anchors_for_runs(
        query_index: &dyn Index,
        target_index: &dyn Index,
        runs: &[SharedRun],
        check_self: bool,
    ) -> Vec<Anchor> {
        let query_read_ids = query_index.read_ids();
        let query_positions = query_index.positions_in_reads();
        let target_read_ids = target_index.read_ids();
        let target_positions = target_index.positions_in_reads();

        let mut anchors = Vec::new();
        for &(qj, tj) in runs {
            for q in query_index.run(qj) {
                for t in target_index.run(tj) {
                    if check_self
                        && query_read_ids[q] == target_read_ids[t]
                        && query_positions[q] == target_positions[t]
                    {
                        continue;
                    }
                    anchors.push(Anchor::new(
                        query_read_ids[q],
                        target_read_ids[t],
                        query_positions[q],
                        target_positions[t],
                    ));
                }
            }
        }

        anchors
    }
}

/// Whether two indices over the same read source cover at least one common
/// read
fn read_ranges_intersect(query_index: &dyn Index, target_index: &dyn Index) -> bool {
    query_index.first_read_id() < target_index.past_last_read_id()
        && target_index.first_read_id() < query_index.past_last_read_id()
}

impl Matcher for MergeJoinMatcher {
    fn find_anchors(
        &self,
        query_index: &dyn Index,
        target_index: &dyn Index,
        self_comparison: bool,
    ) -> MatchResult<Vec<Anchor>> {
        check_compatible(query_index, target_index)?;

        let shared = Self::shared_runs(query_index, target_index);
        let check_self = self_comparison && read_ranges_intersect(query_index, target_index);

        let counts = self.execution.map(&shared, |&run| {
            Self::count_run(query_index, target_index, run, check_self)
        });
        let required: usize = counts.iter().sum();

        if let Some(capacity) = self.max_anchors {
            if required > capacity {
                return Err(MatchError::CapacityExceeded { required, capacity });
            }
        }

        // split the shared runs into chunks of roughly equal anchor counts
        let partitions = self.execution.partitions(shared.len());
        let per_partition = required / partitions + 1;
        let mut chunks: Vec<&[SharedRun]> = Vec::with_capacity(partitions);
        let (mut start, mut acc) = (0, 0);
        for (i, &count) in counts.iter().enumerate() {
            acc += count;
            if acc >= per_partition {
                chunks.push(&shared[start..=i]);
                start = i + 1;
                acc = 0;
            }
        }
        if start < shared.len() {
            chunks.push(&shared[start..]);
        }

        let mut anchors = self.execution.flat_map(&chunks, |runs| {
            Self::anchors_for_runs(query_index, target_index, runs, check_self)
        });
        self.execution.sort(&mut anchors);

        debug!(
            "Matched reads [{}, {}) against [{}, {}): {} shared representations, {} anchors",
            query_index.first_read_id(),
            query_index.past_last_read_id(),
            target_index.first_read_id(),
            target_index.past_last_read_id(),
            shared.len(),
            anchors.len()
        );

        Ok(anchors)
    }

    fn name(&self) -> &'static str {
        "merge-join"
    }
}
