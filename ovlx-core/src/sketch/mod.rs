//! Minimizer sketching for OvlX
//!
//! Reads are reduced to ordered sequences of sketch elements: canonical
//! k-mers chosen as window minima. Sketches are the input to index
//! construction and the basis of all downstream anchor matching.

use serde::{Deserialize, Serialize};

pub use crate::types::{Position, ReadId, Representation, Strand};

pub mod batch;
pub mod minimizer;
pub mod utils;

pub use batch::SketchBatch;
pub use minimizer::generate_sketch_elements;

/// Largest k whose 2-bit packing fits in a `Representation`
pub const MAX_KMER_SIZE: u32 = Representation::BITS / 2;

/// Parameters for minimizer sketching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchParams {
    /// K-mer length
    pub k: u32,
    /// Number of consecutive k-mers per window
    pub w: u32,
    /// Pass canonical packings through an integer hash before selection
    pub hash_representations: bool,
}

impl Default for SketchParams {
    fn default() -> Self {
        Self {
            k: 15,
            w: 10,
            hash_representations: false,
        }
    }
}

impl SketchParams {
    pub fn new(k: u32, w: u32, hash_representations: bool) -> Self {
        Self {
            k,
            w,
            hash_representations,
        }
    }

    pub fn validate(&self) -> SketchResult<()> {
        if self.k == 0 || self.k > MAX_KMER_SIZE {
            return Err(SketchError::InvalidParams(format!(
                "k-mer size must be between 1 and {}, got {}",
                MAX_KMER_SIZE, self.k
            )));
        }
        if self.w == 0 {
            return Err(SketchError::InvalidParams(
                "window size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result type for sketching operations
pub type SketchResult<T> = Result<T, SketchError>;

/// Errors that can occur during sketching
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid read range [{first}, {past_last}) for {number_of_reads} reads")]
    InvalidReadRange {
        first: ReadId,
        past_last: ReadId,
        number_of_reads: usize,
    },
}

/// One fingerprint occurrence in a read
pub trait SketchElement {
    fn representation(&self) -> Representation;

    /// Leftmost base of the k-mer, 0-based
    fn position_in_read(&self) -> Position;

    fn direction(&self) -> Strand;

    fn read_id(&self) -> ReadId;

    /// Ordering used when building an index. Ties past the representation are
    /// broken only to keep the output deterministic.
    fn index_key(&self) -> (Representation, ReadId, Position, Strand) {
        (
            self.representation(),
            self.read_id(),
            self.position_in_read(),
            self.direction(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Minimizer {
    pub representation: Representation,
    pub position_in_read: Position,
    pub direction: Strand,
    pub read_id: ReadId,
}

impl Minimizer {
    pub fn new(
        representation: Representation,
        position_in_read: Position,
        direction: Strand,
        read_id: ReadId,
    ) -> Self {
        Self {
            representation,
            position_in_read,
            direction,
            read_id,
        }
    }
}

impl SketchElement for Minimizer {
    fn representation(&self) -> Representation {
        self.representation
    }

    fn position_in_read(&self) -> Position {
        self.position_in_read
    }

    fn direction(&self) -> Strand {
        self.direction
    }

    fn read_id(&self) -> ReadId {
        self.read_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(SketchParams::default().validate().is_ok());
        assert!(SketchParams::new(32, 1, true).validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        assert!(matches!(
            SketchParams::new(0, 5, false).validate(),
            Err(SketchError::InvalidParams(_))
        ));
        assert!(matches!(
            SketchParams::new(33, 5, false).validate(),
            Err(SketchError::InvalidParams(_))
        ));
        let err = SketchParams::new(15, 0, false).validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameters: window size must be at least 1");
    }

    #[test]
    fn test_index_key_orders_by_representation_first() {
        let a = Minimizer::new(1, 50, Strand::Reverse, 9);
        let b = Minimizer::new(2, 0, Strand::Forward, 0);
        assert!(a.index_key() < b.index_key());
    }
}
