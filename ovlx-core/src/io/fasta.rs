//! FASTA/FASTQ read loading
//!
//! Reads are parsed with needletail; gzipped input is decompressed with
//! flate2 first. The read name is the header up to the first whitespace.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use needletail::{parse_fastx_file, parse_fastx_reader};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reads::{Read, ReadSet};
use crate::types::Position;

pub type FastaResult<T> = Result<T, FastaError>;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty file or no sequences found")]
    EmptyFile,
}

/// FASTA/FASTQ parser producing a read set
pub struct FastaParser;

impl FastaParser {
    /// Parse a FASTA/FASTQ file, gzipped when the name ends in `.gz`
    pub fn parse_file<P: AsRef<Path>>(path: P) -> FastaResult<ReadSet> {
        if path.as_ref().to_string_lossy().ends_with(".gz") {
            let decoder = GzDecoder::new(File::open(&path)?);
            return Self::parse_reader(BufReader::new(decoder));
        }

        let mut reader = parse_fastx_file(&path).map_err(|e| FastaError::Parse(e.to_string()))?;
        let mut reads = ReadSet::new();
        while let Some(record) = reader.next() {
            let record = record.map_err(|e| FastaError::Parse(e.to_string()))?;
            reads.push(Self::record_to_read(&record));
        }
        Self::non_empty(reads)
    }

    /// Parse FASTA/FASTQ data from any readable source
    pub fn parse_reader<R: std::io::Read + Send>(reader: R) -> FastaResult<ReadSet> {
        let mut fastx_reader =
            parse_fastx_reader(reader).map_err(|e| FastaError::Parse(e.to_string()))?;
        let mut reads = ReadSet::new();
        while let Some(record) = fastx_reader.next() {
            let record = record.map_err(|e| FastaError::Parse(e.to_string()))?;
            reads.push(Self::record_to_read(&record));
        }
        Self::non_empty(reads)
    }

    fn record_to_read(record: &needletail::parser::SequenceRecord) -> Read {
        let header = String::from_utf8_lossy(record.id());
        let name = header.split_whitespace().next().unwrap_or_default();
        Read::new(name, record.seq().into_owned())
    }

    fn non_empty(reads: ReadSet) -> FastaResult<ReadSet> {
        if reads.is_empty() {
            Err(FastaError::EmptyFile)
        } else {
            Ok(reads)
        }
    }
}

/// Length summary of a read set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadStatistics {
    pub total_reads: usize,
    pub total_bases: u64,
    pub min_length: Position,
    pub max_length: Position,
    pub mean_length: f64,
    pub n50: Position,
    /// Percentage of G/C among unambiguous bases
    pub gc_content: f64,
}

impl ReadStatistics {
    pub fn from_reads(reads: &ReadSet) -> Self {
        let mut lengths: Vec<Position> = reads.iter().map(Read::length).collect();
        if lengths.is_empty() {
            return Self::default();
        }

        let total_bases = reads.total_bases();
        let (mut gc, mut at) = (0u64, 0u64);
        for read in reads.iter() {
            for &base in &read.sequence {
                match base.to_ascii_uppercase() {
                    b'G' | b'C' => gc += 1,
                    b'A' | b'T' => at += 1,
                    _ => {}
                }
            }
        }

        lengths.sort_unstable_by(|a, b| b.cmp(a));
        let half = total_bases.div_ceil(2);
        let mut cumulative = 0u64;
        let mut n50 = 0;
        for &length in &lengths {
            cumulative += u64::from(length);
            if cumulative >= half {
                n50 = length;
                break;
            }
        }

        Self {
            total_reads: lengths.len(),
            total_bases,
            min_length: lengths.last().copied().unwrap_or(0),
            max_length: lengths[0],
            mean_length: total_bases as f64 / lengths.len() as f64,
            n50,
            gc_content: if gc + at > 0 {
                gc as f64 / (gc + at) as f64 * 100.0
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reads::ReadSource;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_fasta_reader() {
        let fasta_data = ">read1 description of read 1\n\
                          ATCGATCGATCG\n\
                          >read2\n\
                          GCTAGCTAGCTA\n";

        let reads = FastaParser::parse_reader(Cursor::new(fasta_data)).unwrap();

        assert_eq!(reads.len(), 2);
        assert_eq!(reads.read_name(0), Some("read1"));
        assert_eq!(reads.read_sequence(0), Some(&b"ATCGATCGATCG"[..]));
        assert_eq!(reads.read_length(0), Some(12));
        assert_eq!(reads.read_name(1), Some("read2"));
    }

    #[test]
    fn test_parse_fastq_reader() {
        let fastq_data = "@read1 description\n\
                          ATCGATCG\n\
                          +\n\
                          IIIIIIII\n\
                          @read2\n\
                          GCTAGCTA\n\
                          +\n\
                          HHHHHHHH\n";

        let reads = FastaParser::parse_reader(Cursor::new(fastq_data)).unwrap();

        assert_eq!(reads.len(), 2);
        assert_eq!(reads.read_name(0), Some("read1"));
        assert_eq!(reads.read_sequence(1), Some(&b"GCTAGCTA"[..]));
    }

    #[test]
    fn test_multiline_fasta() {
        let fasta_data = ">read1\n\
                          ATCGATCG\n\
                          ATCGATCG\n\
                          GCTAGCTA\n";

        let reads = FastaParser::parse_reader(Cursor::new(fasta_data)).unwrap();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads.read_sequence(0), Some(&b"ATCGATCGATCGATCGGCTAGCTA"[..]));
    }

    #[test]
    fn test_empty_input() {
        assert!(FastaParser::parse_reader(Cursor::new("")).is_err());
    }

    #[test]
    fn test_parse_file_and_gzip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">r0\nACGTACGT\n>r1\nTTTT").unwrap();
        file.flush().unwrap();
        let reads = FastaParser::parse_file(file.path()).unwrap();
        assert_eq!(reads.len(), 2);

        let gz = tempfile::Builder::new().suffix(".fa.gz").tempfile().unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(gz.reopen().unwrap(), flate2::Compression::default());
        encoder.write_all(b">r0\nACGTACGT\n>r1\nTTTT\n").unwrap();
        encoder.finish().unwrap();
        let gz_reads = FastaParser::parse_file(gz.path()).unwrap();
        assert_eq!(gz_reads, reads);
    }

    #[test]
    fn test_read_statistics() {
        let fasta_data = ">r1\n\
                          ATCGATCGATCG\n\
                          >r2\n\
                          GCGCGCGCGCGCGCGC\n\
                          >r3\n\
                          ATGC\n";
        let reads = FastaParser::parse_reader(Cursor::new(fasta_data)).unwrap();
        let stats = ReadStatistics::from_reads(&reads);

        assert_eq!(stats.total_reads, 3);
        assert_eq!(stats.total_bases, 32);
        assert_eq!(stats.min_length, 4);
        assert_eq!(stats.max_length, 16);
        assert_eq!(stats.mean_length, 32.0 / 3.0);
        assert_eq!(stats.n50, 16);
        assert_eq!(stats.gc_content, 24.0 / 32.0 * 100.0);
    }

    #[test]
    fn test_statistics_of_empty_set() {
        assert_eq!(ReadStatistics::from_reads(&ReadSet::new()), ReadStatistics::default());
    }
}
