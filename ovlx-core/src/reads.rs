//! Read collections consumed by index construction.
//!
//! Read ids are dense and stable: the id of a read is its position in the
//! collection. Index shards address reads by these global ids.

use serde::{Deserialize, Serialize};

use crate::types::{Position, ReadId};

/// Source of reads for sketching and PAF naming.
pub trait ReadSource: Sync {
    fn number_of_reads(&self) -> usize;

    fn read_name(&self, read_id: ReadId) -> Option<&str>;

    fn read_sequence(&self, read_id: ReadId) -> Option<&[u8]>;

    fn read_length(&self, read_id: ReadId) -> Option<Position> {
        self.read_sequence(read_id).map(|seq| seq.len() as Position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Read {
    pub name: String,
    pub sequence: Vec<u8>,
}

impl Read {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    pub fn length(&self) -> Position {
        self.sequence.len() as Position
    }
}

/// In-memory read collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadSet {
    reads: Vec<Read>,
}

impl ReadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a read and return its id
    pub fn push(&mut self, read: Read) -> ReadId {
        self.reads.push(read);
        (self.reads.len() - 1) as ReadId
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Read> {
        self.reads.iter()
    }

    pub fn total_bases(&self) -> u64 {
        self.reads.iter().map(|r| r.sequence.len() as u64).sum()
    }

    fn get(&self, read_id: ReadId) -> Option<&Read> {
        usize::try_from(read_id).ok().and_then(|i| self.reads.get(i))
    }
}

impl FromIterator<Read> for ReadSet {
    fn from_iter<I: IntoIterator<Item = Read>>(iter: I) -> Self {
        Self {
            reads: iter.into_iter().collect(),
        }
    }
}

impl<N: Into<String>, S: Into<Vec<u8>>> FromIterator<(N, S)> for ReadSet {
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        iter.into_iter().map(|(name, seq)| Read::new(name, seq)).collect()
    }
}

impl ReadSource for ReadSet {
    fn number_of_reads(&self) -> usize {
        self.reads.len()
    }

    fn read_name(&self, read_id: ReadId) -> Option<&str> {
        self.get(read_id).map(|r| r.name.as_str())
    }

    fn read_sequence(&self, read_id: ReadId) -> Option<&[u8]> {
        self.get(read_id).map(|r| r.sequence.as_slice())
    }
}
