//! Anchor matching
//!
//! Joins a query index and a target index on equal representations. Every
//! pair of occurrences sharing a representation becomes an anchor, so the
//! output size is the sum over shared representations of the product of
//! their occurrence counts.

use crate::exec::Execution;
use crate::index::Index;
use crate::types::Anchor;

pub mod merge_join;

pub use merge_join::MergeJoinMatcher;

/// Result type for matching operations
pub type MatchResult<T> = Result<T, MatchError>;

/// Errors that can occur during matching
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Anchor capacity exceeded: {required} anchors required, capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    #[error("Incompatible indices: {0}")]
    IncompatibleIndices(String),
}

/// Trait for anchor matchers
pub trait Matcher: Send + Sync {
    /// Anchors between two indices, sorted by query read, target read, query
    /// position and target position.
    ///
    /// `self_comparison` states that both indices were built from the same
    /// read source, so equal read ids name the same read. Occurrence pairs
    /// that are then the same position of the same read are not reported.
    fn find_anchors(
        &self,
        query_index: &dyn Index,
        target_index: &dyn Index,
        self_comparison: bool,
    ) -> MatchResult<Vec<Anchor>>;

    /// Get the name/identifier of this matcher
    fn name(&self) -> &'static str;
}

/// Factory for creating matchers
pub struct MatcherFactory;

impl MatcherFactory {
    /// `max_anchors` bounds the number of anchors a single call may produce.
    pub fn create(execution: Execution, max_anchors: Option<usize>) -> Box<dyn Matcher> {
        Box::new(MergeJoinMatcher::new(execution, max_anchors))
    }
}

/// Representations are only comparable between indices sketched with the
/// same k-mer size and hashing mode. Window sizes may differ.
pub(crate) fn check_compatible(query_index: &dyn Index, target_index: &dyn Index) -> MatchResult<()> {
    let query = (query_index.minimizer_size(), query_index.hash_representations());
    let target = (target_index.minimizer_size(), target_index.hash_representations());
    if query != target {
        return Err(MatchError::IncompatibleIndices(format!(
            "query (k, hash) = {:?}, target (k, hash) = {:?}",
            query, target
        )));
    }
    Ok(())
}
