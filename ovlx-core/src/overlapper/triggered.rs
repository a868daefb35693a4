use std::borrow::Cow;

use log::debug;

use super::{Overlapper, TriggerParams};
use crate::exec::Execution;
use crate::index::Index;
use crate::types::{Anchor, Overlap, Strand};

/// Scan state of one chain of collinear anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// Too few anchors so far; the chain is dropped if it breaks now
    Untriggered,
    /// Enough anchors; the chain is reported when it breaks
    Triggered,
}

/// Run of collinear anchors within one read pair
#[derive(Debug, Clone)]
struct Chain {
    overlap: Overlap,
    last: Anchor,
    /// Fixed by the first step of the chain
    direction: Option<Strand>,
}

impl Chain {
    fn start(anchor: &Anchor) -> Self {
        Self {
            overlap: Overlap::open(anchor),
            last: *anchor,
            direction: None,
        }
    }

    /// Direction of the step to `anchor` if it continues this chain
    fn step(&self, anchor: &Anchor, max_gap: u32) -> Option<Strand> {
        let dq = i64::from(anchor.query_position_in_read) - i64::from(self.last.query_position_in_read);
        let dt = i64::from(anchor.target_position_in_read) - i64::from(self.last.target_position_in_read);
        let max_gap = i64::from(max_gap);

        if dq <= 0 || dt == 0 || dq > max_gap || dt.abs() > max_gap {
            return None;
        }
        let direction = Strand::from(dt > 0);
        match self.direction {
            Some(d) if d != direction => None,
            _ => Some(direction),
        }
    }

    fn extend(&mut self, anchor: &Anchor, direction: Strand) {
        self.overlap.extend(anchor);
        self.last = *anchor;
        self.direction = Some(direction);
    }

    fn state(&self, min_trigger_anchors: u32) -> TriggerState {
        if self.overlap.num_residues >= min_trigger_anchors {
            TriggerState::Triggered
        } else {
            TriggerState::Untriggered
        }
    }
}

/// Opens an overlap once enough collinear anchors accumulate and closes it
/// on the first anchor that breaks the chain.
pub struct TriggerOverlapper {
    params: TriggerParams,
    execution: Execution,
}

impl TriggerOverlapper {
    pub fn new(params: TriggerParams, execution: Execution) -> Self {
        Self { params, execution }
    }

    pub fn params(&self) -> &TriggerParams {
        &self.params
    }

    /// Scan the anchors of one read pair, sorted by query then target position.
    ///
    /// An anchor at the same query position as the chain's last anchor is a
    /// second hit of the same query minimizer and is skipped instead of
    /// breaking the chain.
    fn scan_group(&self, anchors: &[Anchor]) -> Vec<Overlap> {
        let mut overlaps = Vec::new();
        let Some((first, rest)) = anchors.split_first() else {
            return overlaps;
        };

        let mut chain = Chain::start(first);
        for anchor in rest {
            match chain.step(anchor, self.params.max_anchor_gap) {
                Some(direction) => chain.extend(anchor, direction),
                None if anchor.query_position_in_read == chain.last.query_position_in_read => {}
                None => {
                    let finished = std::mem::replace(&mut chain, Chain::start(anchor));
                    overlaps.extend(self.close(finished));
                }
            }
        }
        overlaps.extend(self.close(chain));

        overlaps
    }

    fn close(&self, chain: Chain) -> Option<Overlap> {
        match chain.state(self.params.min_trigger_anchors) {
            TriggerState::Untriggered => None,
            TriggerState::Triggered => {
                let mut overlap = chain.overlap;
                overlap.normalize_target_range();
                overlap.overlap_complete = true;
                Some(overlap)
            }
        }
    }
}

/// Consecutive anchors sharing a read pair
fn read_pair_groups(anchors: &[Anchor]) -> Vec<&[Anchor]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=anchors.len() {
        if i == anchors.len() || anchors[i].read_pair() != anchors[start].read_pair() {
            groups.push(&anchors[start..i]);
            start = i;
        }
    }
    groups
}

impl Overlapper for TriggerOverlapper {
    fn get_overlaps(
        &self,
        anchors: &[Anchor],
        query_index: &dyn Index,
        target_index: &dyn Index,
    ) -> Vec<Overlap> {
        let anchors: Cow<[Anchor]> = if anchors.windows(2).all(|p| p[0] <= p[1]) {
            Cow::Borrowed(anchors)
        } else {
            let mut sorted = anchors.to_vec();
            self.execution.sort(&mut sorted);
            Cow::Owned(sorted)
        };

        let groups = read_pair_groups(&anchors);
        let mut overlaps = self.execution.flat_map(&groups, |group| self.scan_group(group));

        for overlap in &mut overlaps {
            overlap.query_length = query_index.read_length(overlap.query_read_id).unwrap_or(0);
            overlap.target_length = target_index.read_length(overlap.target_read_id).unwrap_or(0);
        }

        debug!(
            "Found {} overlaps in {} read pairs from {} anchors",
            overlaps.len(),
            groups.len(),
            anchors.len()
        );

        overlaps
    }

    fn name(&self) -> &'static str {
        "triggered"
    }
}
