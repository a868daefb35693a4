//! Sequence input for OvlX

#[cfg(feature = "io-fasta")]
pub mod fasta;

#[cfg(feature = "io-fasta")]
pub use fasta::{FastaError, FastaParser, FastaResult, ReadStatistics};
