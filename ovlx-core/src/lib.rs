//! OvlX Core Library
//!
//! Minimizer sketching, minimizer indices, anchor matching and overlap
//! detection for long-read overlap discovery, plus FASTA input and PAF output.

pub mod exec;
pub mod index;
pub mod io;
pub mod matcher;
pub mod overlapper;
pub mod paf;
pub mod pipeline;
pub mod reads;
pub mod sketch;
pub mod types;

// Re-export commonly used types and functions
pub use exec::Execution;
pub use index::{Index, IndexFactory, MinimizerIndex};
pub use matcher::{MatchError, MatchResult, Matcher, MatcherFactory};
pub use overlapper::{
    filter_overlaps, fuse_overlaps, FilterParams, Overlapper, OverlapperFactory, TriggerOverlapper,
    TriggerParams,
};
pub use paf::{PafError, PafRecord, PafWriter};
pub use pipeline::{BatchOutput, OverlapPipeline, PipelineError, PipelineParams, PipelineStats};
pub use reads::{Read, ReadSet, ReadSource};
pub use sketch::{
    generate_sketch_elements, Minimizer, SketchBatch, SketchElement, SketchError, SketchParams,
    SketchResult,
};
pub use types::{Anchor, ArrayBlock, Overlap, Position, ReadId, Representation, Strand};

#[cfg(feature = "io-fasta")]
pub use io::{FastaError, FastaParser, ReadStatistics};

/// Version information for the OvlX core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
