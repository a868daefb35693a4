//! Command implementations for OvlX CLI

pub mod config;
pub mod overlap;
pub mod sketch;

use anyhow::Result;
use std::path::Path;

use ovlx_core::{FastaError, FastaParser, ReadSet};

use crate::error::CliError;

/// Load reads, reporting missing and empty files as CLI errors
pub fn load_reads(path: &Path) -> Result<ReadSet> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    match FastaParser::parse_file(path) {
        Ok(reads) => Ok(reads),
        Err(FastaError::EmptyFile) => Err(CliError::empty_input(path.to_path_buf()).into()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to parse FASTA/FASTQ file: {}", path.display()))),
    }
}
