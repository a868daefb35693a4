use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reads::ReadSource;
use crate::types::{Overlap, Position, ReadId, Strand};

/// Block length column, not computed for overlaps
pub const BLOCK_LENGTH_PLACEHOLDER: u32 = 0;
/// Mapping quality column, 255 meaning unavailable
pub const MAPPING_QUALITY_PLACEHOLDER: u8 = 255;

pub type PafResult<T> = Result<T, PafError>;

#[derive(Debug, Error)]
pub enum PafError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Read {0} is not in the read set")]
    UnknownRead(ReadId),
    #[error("Invalid PAF line: {0}")]
    InvalidLine(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PafRecord {
    pub query_name: String,
    pub query_len: Position,
    pub query_start: Position,
    pub query_end: Position,
    pub strand: Strand,
    pub target_name: String,
    pub target_len: Position,
    pub target_start: Position,
    pub target_end: Position,
    pub num_residues: u32,
    pub block_len: u32,
    pub mapping_quality: u8,
    pub cigar: Option<String>,
}

impl PafRecord {
    /// Name the reads of an overlap. Query and target reads may come from the
    /// same source.
    pub fn from_overlap<Q, T>(overlap: &Overlap, query_reads: &Q, target_reads: &T) -> PafResult<Self>
    where
        Q: ReadSource + ?Sized,
        T: ReadSource + ?Sized,
    {
        let query_name = query_reads
            .read_name(overlap.query_read_id)
            .ok_or(PafError::UnknownRead(overlap.query_read_id))?;
        let target_name = target_reads
            .read_name(overlap.target_read_id)
            .ok_or(PafError::UnknownRead(overlap.target_read_id))?;

        Ok(Self {
            query_name: query_name.to_string(),
            query_len: overlap.query_length,
            query_start: overlap.query_start_position_in_read,
            query_end: overlap.query_end_position_in_read,
            strand: overlap.relative_strand,
            target_name: target_name.to_string(),
            target_len: overlap.target_length,
            target_start: overlap.target_start_position_in_read,
            target_end: overlap.target_end_position_in_read,
            num_residues: overlap.num_residues,
            block_len: BLOCK_LENGTH_PLACEHOLDER,
            mapping_quality: MAPPING_QUALITY_PLACEHOLDER,
            cigar: overlap.cigar.clone(),
        })
    }

    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PafRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query_name,
            self.query_len,
            self.query_start,
            self.query_end,
            char::from(self.strand),
            self.target_name,
            self.target_len,
            self.target_start,
            self.target_end,
            self.num_residues,
            self.block_len,
            self.mapping_quality
        )?;
        if let Some(cigar) = &self.cigar {
            write!(f, "\tcg:Z:{}", cigar)?;
        }
        Ok(())
    }
}

impl FromStr for PafRecord {
    type Err = PafError;

    fn from_str(line: &str) -> PafResult<Self> {
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        if fields.len() < 12 {
            return Err(PafError::InvalidLine(format!(
                "{} fields, expected at least 12",
                fields.len()
            )));
        }

        fn number<N: FromStr>(field: &str, what: &str) -> PafResult<N> {
            field
                .parse()
                .map_err(|_| PafError::InvalidLine(format!("invalid {}: {}", what, field)))
        }

        let strand = match fields[4] {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            other => {
                return Err(PafError::InvalidLine(format!(
                    "invalid strand '{}', expected '+' or '-'",
                    other
                )))
            }
        };
        let cigar = fields[12..]
            .iter()
            .find_map(|tag| tag.strip_prefix("cg:Z:"))
            .map(str::to_string);

        Ok(Self {
            query_name: fields[0].to_string(),
            query_len: number(fields[1], "query length")?,
            query_start: number(fields[2], "query start")?,
            query_end: number(fields[3], "query end")?,
            strand,
            target_name: fields[5].to_string(),
            target_len: number(fields[6], "target length")?,
            target_start: number(fields[7], "target start")?,
            target_end: number(fields[8], "target end")?,
            num_residues: number(fields[9], "residue count")?,
            block_len: number(fields[10], "block length")?,
            mapping_quality: number(fields[11], "mapping quality")?,
            cigar,
        })
    }
}

/// Reads PAF records back, skipping blank and `#` lines
pub struct PafReader {
    reader: BufReader<File>,
}

impl PafReader {
    pub fn new<P: AsRef<Path>>(path: P) -> PafResult<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(path)?),
        })
    }

    pub fn records(self) -> impl Iterator<Item = PafResult<PafRecord>> {
        self.reader.lines().filter_map(|line| match line {
            Err(e) => Some(Err(e.into())),
            Ok(line) if line.trim().is_empty() || line.starts_with('#') => None,
            Ok(line) => Some(line.parse()),
        })
    }
}

pub struct PafWriter<W: Write> {
    writer: W,
    records_written: u64,
}

impl PafWriter<std::io::BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> PafResult<Self> {
        Ok(Self::new(std::io::BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> PafWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records_written: 0,
        }
    }

    pub fn write_record(&mut self, record: &PafRecord) -> PafResult<()> {
        writeln!(self.writer, "{}", record)?;
        self.records_written += 1;
        Ok(())
    }

    /// Write one line per overlap, naming reads from the given sources
    pub fn write_overlaps<Q, T>(
        &mut self,
        overlaps: &[Overlap],
        query_reads: &Q,
        target_reads: &T,
    ) -> PafResult<()>
    where
        Q: ReadSource + ?Sized,
        T: ReadSource + ?Sized,
    {
        for overlap in overlaps {
            self.write_record(&PafRecord::from_overlap(overlap, query_reads, target_reads)?)?;
        }
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn flush(&mut self) -> PafResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reads::ReadSet;
    use crate::types::Anchor;
    use tempfile::NamedTempFile;

    fn reads() -> ReadSet {
        vec![("read_18", "A".repeat(2000)), ("read_42", "C".repeat(1800))]
            .into_iter()
            .collect()
    }

    fn overlap() -> Overlap {
        let mut overlap = Overlap::open(&Anchor::new(0, 1, 420, 783));
        overlap.query_end_position_in_read = 1200;
        overlap.target_end_position_in_read = 1500;
        overlap.num_residues = 35;
        overlap.query_length = 2000;
        overlap.target_length = 1800;
        overlap.overlap_complete = true;
        overlap
    }

    #[test]
    fn test_line_format() {
        let record = PafRecord::from_overlap(&overlap(), &reads(), &reads()).unwrap();
        assert_eq!(
            record.to_line(),
            "read_18\t2000\t420\t1200\t+\tread_42\t1800\t783\t1500\t35\t0\t255"
        );
    }

    #[test]
    fn test_cigar_tag() {
        let mut overlap = overlap();
        overlap.cigar = Some("780M".to_string());
        overlap.relative_strand = Strand::Reverse;
        let line = PafRecord::from_overlap(&overlap, &reads(), &reads())
            .unwrap()
            .to_line();
        assert!(line.ends_with("\t35\t0\t255\tcg:Z:780M"));
        assert!(line.contains("\t-\t"));
    }

    #[test]
    fn test_unknown_read() {
        let mut overlap = overlap();
        overlap.target_read_id = 7;
        let result = PafRecord::from_overlap(&overlap, &reads(), &reads());
        assert!(matches!(result, Err(PafError::UnknownRead(7))));
    }

    #[test]
    fn test_parse_line() {
        let record: PafRecord = "q\t100\t10\t90\t-\tt\t200\t20\t110\t12\t0\t255\tcg:Z:80M"
            .parse()
            .unwrap();
        assert_eq!(record.strand, Strand::Reverse);
        assert_eq!(record.target_end, 110);
        assert_eq!(record.cigar.as_deref(), Some("80M"));

        assert!("q\t100\t10".parse::<PafRecord>().is_err());
        assert!("q\t100\t10\t90\t*\tt\t200\t20\t110\t12\t0\t255"
            .parse::<PafRecord>()
            .is_err());
    }

    #[test]
    fn test_write_and_read_back() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = PafWriter::create(file.path()).unwrap();
        writer
            .write_overlaps(&[overlap(), overlap()], &reads(), &reads())
            .unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.records_written(), 2);

        let records: Vec<PafRecord> = PafReader::new(file.path())
            .unwrap()
            .records()
            .collect::<PafResult<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].query_name, "read_18");
        assert_eq!(records[0].num_residues, 35);
    }

    #[test]
    fn test_writer_over_vec() {
        let mut writer = PafWriter::new(Vec::new());
        writer.write_overlaps(&[overlap()], &reads(), &reads()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with('\n'));
    }
}
