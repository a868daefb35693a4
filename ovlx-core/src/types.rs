use serde::{Deserialize, Serialize};

pub type ReadId = u64;
pub type Position = u32;
pub type Representation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl From<bool> for Strand {
    fn from(forward: bool) -> Self {
        if forward {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl From<Strand> for bool {
    fn from(strand: Strand) -> Self {
        matches!(strand, Strand::Forward)
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// Location of one read's elements inside a buffer shared by many reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArrayBlock {
    pub first_element: usize,
    pub block_size: u32,
}

impl ArrayBlock {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.first_element..self.first_element + self.block_size as usize
    }
}

/// A pair of occurrences of the same fingerprint, one in a query read and
/// one in a target read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub query_read_id: ReadId,
    pub target_read_id: ReadId,
    pub query_position_in_read: Position,
    pub target_position_in_read: Position,
}

impl Anchor {
    pub fn new(
        query_read_id: ReadId,
        target_read_id: ReadId,
        query_position_in_read: Position,
        target_position_in_read: Position,
    ) -> Self {
        Self {
            query_read_id,
            target_read_id,
            query_position_in_read,
            target_position_in_read,
        }
    }

    /// Grouping key for overlap detection
    pub fn read_pair(&self) -> (ReadId, ReadId) {
        (self.query_read_id, self.target_read_id)
    }
}

/// A claimed overlapping region between a query read and a target read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    pub query_read_id: ReadId,
    pub target_read_id: ReadId,
    pub query_start_position_in_read: Position,
    pub query_end_position_in_read: Position,
    pub target_start_position_in_read: Position,
    pub target_end_position_in_read: Position,
    pub relative_strand: Strand,
    pub num_residues: u32,
    pub query_length: Position,
    pub target_length: Position,
    pub cigar: Option<String>,
    pub overlap_complete: bool,
}

impl Overlap {
    /// Open an overlap on a single anchor. End positions equal start positions
    /// until the overlap is extended.
    pub fn open(anchor: &Anchor) -> Self {
        Self {
            query_read_id: anchor.query_read_id,
            target_read_id: anchor.target_read_id,
            query_start_position_in_read: anchor.query_position_in_read,
            query_end_position_in_read: anchor.query_position_in_read,
            target_start_position_in_read: anchor.target_position_in_read,
            target_end_position_in_read: anchor.target_position_in_read,
            relative_strand: Strand::Forward,
            num_residues: 1,
            query_length: 0,
            target_length: 0,
            cigar: None,
            overlap_complete: false,
        }
    }

    pub fn extend(&mut self, anchor: &Anchor) {
        self.query_end_position_in_read = anchor.query_position_in_read;
        self.target_end_position_in_read = anchor.target_position_in_read;
        self.num_residues += 1;
    }

    /// Swap target coordinates when they run backwards, marking the overlap
    /// as reverse-strand.
    pub fn normalize_target_range(&mut self) {
        if self.target_start_position_in_read > self.target_end_position_in_read {
            std::mem::swap(
                &mut self.target_start_position_in_read,
                &mut self.target_end_position_in_read,
            );
            self.relative_strand = Strand::Reverse;
        }
    }

    pub fn read_pair(&self) -> (ReadId, ReadId) {
        (self.query_read_id, self.target_read_id)
    }

    pub fn query_span(&self) -> Position {
        self.query_end_position_in_read - self.query_start_position_in_read
    }

    pub fn target_span(&self) -> Position {
        self.target_end_position_in_read
            .abs_diff(self.target_start_position_in_read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_conversions() {
        assert_eq!(Strand::from(true), Strand::Forward);
        assert!(!bool::from(Strand::Reverse));
        assert_eq!(char::from(Strand::Reverse), '-');
    }

    #[test]
    fn test_array_block_range() {
        let block = ArrayBlock { first_element: 4, block_size: 3 };
        assert_eq!(block.range(), 4..7);
    }

    #[test]
    fn test_overlap_open_and_extend() {
        let mut overlap = Overlap::open(&Anchor::new(1, 2, 10, 500));
        overlap.extend(&Anchor::new(1, 2, 40, 470));
        assert_eq!(overlap.num_residues, 2);
        assert_eq!(overlap.query_span(), 30);
        assert_eq!(overlap.target_span(), 30);

        overlap.normalize_target_range();
        assert_eq!(overlap.relative_strand, Strand::Reverse);
        assert_eq!(overlap.target_start_position_in_read, 470);
        assert_eq!(overlap.target_end_position_in_read, 500);
    }

    #[test]
    fn test_normalize_keeps_ordered_range() {
        let mut overlap = Overlap::open(&Anchor::new(1, 2, 10, 100));
        overlap.extend(&Anchor::new(1, 2, 20, 110));
        overlap.normalize_target_range();
        assert_eq!(overlap.relative_strand, Strand::Forward);
        assert_eq!(overlap.target_start_position_in_read, 100);
    }
}
