//! Overlap detection for OvlX
//!
//! Turns anchors into overlaps between read pairs: anchors of one
//! (query read, target read) pair are chained while they stay collinear and
//! dense, weak chains are filtered out and chains of the same pair split by
//! anchor gaps are fused back together.

use serde::{Deserialize, Serialize};

use crate::exec::Execution;
use crate::index::Index;
use crate::types::{Anchor, Overlap, Position, Strand};

pub mod triggered;

pub use triggered::TriggerOverlapper;

/// Parameters for the trigger scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerParams {
    /// Collinear anchors needed before an overlap opens
    pub min_trigger_anchors: u32,
    /// Largest query or target distance between consecutive chained anchors
    pub max_anchor_gap: u32,
}

impl Default for TriggerParams {
    fn default() -> Self {
        Self {
            min_trigger_anchors: 3,
            max_anchor_gap: 1000,
        }
    }
}

/// Thresholds for dropping weak overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    pub min_residues: u32,
    pub min_overlap_len: u32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_residues: 5,
            min_overlap_len: 0,
        }
    }
}

/// Trait for overlap detectors
pub trait Overlapper: Send + Sync {
    /// Overlaps supported by `anchors`. Query and target lengths are taken from
    /// the indices the anchors were matched from.
    fn get_overlaps(
        &self,
        anchors: &[Anchor],
        query_index: &dyn Index,
        target_index: &dyn Index,
    ) -> Vec<Overlap>;

    /// Get the name/identifier of this overlapper
    fn name(&self) -> &'static str;
}

/// Factory for creating overlappers
pub struct OverlapperFactory;

impl OverlapperFactory {
    pub fn create(params: TriggerParams, execution: Execution) -> Box<dyn Overlapper> {
        Box::new(TriggerOverlapper::new(params, execution))
    }
}

/// Keep overlaps with at least `min_residues` anchors and a query span longer
/// than `min_overlap_len`. Order is preserved.
pub fn filter_overlaps(overlaps: Vec<Overlap>, params: &FilterParams) -> Vec<Overlap> {
    overlaps
        .into_iter()
        .filter(|o| o.num_residues >= params.min_residues && o.query_span() > params.min_overlap_len)
        .collect()
}

/// Merge overlaps of the same read pair into one.
///
/// Overlaps are first sorted by query read, target read and query start;
/// each run sharing a read pair then becomes a single overlap spanning from
/// the first start to the last end with the summed residue count. Target
/// coordinates are taken in the direction of each overlap's strand, and a
/// merged target range that runs backwards is swapped and marked
/// reverse-strand. Fusing an already fused list returns it unchanged.
pub fn fuse_overlaps(mut overlaps: Vec<Overlap>) -> Vec<Overlap> {
    overlaps.sort_by_key(|o| (o.query_read_id, o.target_read_id, o.query_start_position_in_read));

    let mut fused: Vec<Overlap> = Vec::with_capacity(overlaps.len());
    let mut overlaps = overlaps.into_iter();
    let Some(mut current) = overlaps.next() else {
        return fused;
    };
    let (mut target_start, mut target_end) = oriented_target_range(&current);

    for next in overlaps {
        if next.read_pair() == current.read_pair() {
            current.query_end_position_in_read = current
                .query_end_position_in_read
                .max(next.query_end_position_in_read);
            target_end = oriented_target_range(&next).1;
            current.num_residues += next.num_residues;
            current.overlap_complete &= next.overlap_complete;
            current.cigar = None;
        } else {
            close_fused(&mut current, target_start, target_end);
            (target_start, target_end) = oriented_target_range(&next);
            fused.push(std::mem::replace(&mut current, next));
        }
    }
    close_fused(&mut current, target_start, target_end);
    fused.push(current);

    fused
}

/// Target start and end in the order the overlap walks the target
fn oriented_target_range(overlap: &Overlap) -> (Position, Position) {
    match overlap.relative_strand {
        Strand::Forward => (
            overlap.target_start_position_in_read,
            overlap.target_end_position_in_read,
        ),
        Strand::Reverse => (
            overlap.target_end_position_in_read,
            overlap.target_start_position_in_read,
        ),
    }
}

fn close_fused(overlap: &mut Overlap, target_start: Position, target_end: Position) {
    overlap.target_start_position_in_read = target_start;
    overlap.target_end_position_in_read = target_end;
    // a zero-length target range carries no direction of its own
    if target_start != target_end {
        overlap.relative_strand = Strand::Forward;
    }
    overlap.normalize_target_range();
}
