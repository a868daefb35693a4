//! Work distribution over independent units (reads, representation ranges,
//! read-pair groups). `Parallel` runs on rayon's global pool; the thread
//! count is decided by whoever builds that pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
    Sequential,
    #[default]
    Parallel,
}

impl Execution {
    /// Apply `f` to every unit, preserving input order in the output.
    pub fn map<T, R, F>(self, units: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match self {
            Execution::Sequential => units.iter().map(f).collect(),
            Execution::Parallel => units.par_iter().map(f).collect(),
        }
    }

    /// Order-preserving flat map
    pub fn flat_map<T, R, F>(self, units: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Vec<R> + Sync + Send,
    {
        self.map(units, f).into_iter().flatten().collect()
    }

    pub fn sort<T: Ord + Send>(self, items: &mut [T]) {
        match self {
            Execution::Sequential => items.sort(),
            Execution::Parallel => items.par_sort(),
        }
    }

    pub fn sort_by_key<T, K, F>(self, items: &mut [T], f: F)
    where
        T: Send,
        K: Ord,
        F: Fn(&T) -> K + Sync,
    {
        match self {
            Execution::Sequential => items.sort_by_key(f),
            Execution::Parallel => items.par_sort_by_key(f),
        }
    }

    /// Number of chunks to split `len` units into
    pub fn partitions(self, len: usize) -> usize {
        match self {
            Execution::Sequential => 1,
            Execution::Parallel => rayon::current_num_threads().max(1).min(len.max(1)),
        }
    }
}
