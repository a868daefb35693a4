//! Sketch command implementation - minimizer statistics for a read set

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use ovlx_core::{
    Execution, Index, IndexFactory, ReadId, ReadStatistics, SketchError, SketchParams,
};

use crate::config::Config;
use crate::error::CliError;
use crate::SketchArgs;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SketchReport {
    pub input: PathBuf,
    pub params: SketchParams,
    pub reads: ReadStatistics,
    pub minimizers: usize,
    pub distinct_representations: usize,
    /// Minimizers per base
    pub density: f64,
    /// Occurrences of the most frequent representation
    pub max_occurrences: usize,
    /// Representations occurring exactly once
    pub singletons: usize,
}

impl SketchReport {
    fn from_index(input: PathBuf, params: SketchParams, reads: ReadStatistics, index: &dyn Index) -> Self {
        let run_lengths = (0..index.unique_representations().len()).map(|j| index.run(j).len());
        let (max_occurrences, singletons) = run_lengths.fold((0, 0), |(max, singles), len| {
            (max.max(len), singles + usize::from(len == 1))
        });
        let density = if reads.total_bases > 0 {
            index.number_of_occurrences() as f64 / reads.total_bases as f64
        } else {
            0.0
        };

        Self {
            input,
            params,
            reads,
            minimizers: index.number_of_occurrences(),
            distinct_representations: index.unique_representations().len(),
            density,
            max_occurrences,
            singletons,
        }
    }

    fn to_text(&self) -> String {
        format!(
            "Input:                     {}\n\
             Parameters:                k={} w={} hashed={}\n\
             Reads:                     {}\n\
             Bases:                     {}\n\
             Read length (min/max/N50): {}/{}/{}\n\
             GC content:                {:.2}%\n\
             Minimizers:                {}\n\
             Distinct representations:  {}\n\
             Density (per base):        {:.4}\n\
             Max occurrences:           {}\n\
             Singletons:                {}",
            self.input.display(),
            self.params.k,
            self.params.w,
            self.params.hash_representations,
            self.reads.total_reads,
            self.reads.total_bases,
            self.reads.min_length,
            self.reads.max_length,
            self.reads.n50,
            self.reads.gc_content,
            self.minimizers,
            self.distinct_representations,
            self.density,
            self.max_occurrences,
            self.singletons
        )
    }
}

pub fn execute(config: &Config, input: PathBuf, sketch: &SketchArgs, json: bool) -> Result<()> {
    let report = build_report(config, input, sketch)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize sketch report")?
        );
    } else {
        println!("{}", report.to_text());
    }

    Ok(())
}

fn build_report(config: &Config, input: PathBuf, sketch: &SketchArgs) -> Result<SketchReport> {
    let params = SketchParams::new(
        sketch.k.unwrap_or(config.sketch.k),
        sketch.w.unwrap_or(config.sketch.w),
        sketch.hash || config.sketch.hash_representations,
    );
    let execution = if config.general.threads > 1 {
        Execution::Parallel
    } else {
        Execution::Sequential
    };

    log::info!("Loading reads from {}", input.display());
    let reads = super::load_reads(&input)?;
    let statistics = ReadStatistics::from_reads(&reads);

    log::info!(
        "Sketching {} reads with k={}, w={}",
        reads.len(),
        params.k,
        params.w
    );
    let index = match IndexFactory::create(&reads, 0, reads.len() as ReadId, &params, execution) {
        Ok(index) => index,
        Err(SketchError::InvalidParams(message)) => {
            return Err(CliError::invalid_params(message).into())
        }
        Err(e) => return Err(e).context("Failed to build minimizer index"),
    };

    Ok(SketchReport::from_index(input, params, statistics, index.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_report() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">r0\nCATCAAG\n>r1\nAAGCTA").unwrap();
        file.flush().unwrap();

        let args = SketchArgs {
            k: Some(3),
            w: Some(2),
            hash: false,
        };
        let report = build_report(&Config::default(), file.path().to_path_buf(), &args).unwrap();

        assert_eq!(report.reads.total_reads, 2);
        assert_eq!(report.reads.total_bases, 13);
        assert_eq!(report.minimizers, 7);
        assert_eq!(report.distinct_representations, 6);
        assert_eq!(report.max_occurrences, 2);
        assert_eq!(report.singletons, 5);
        assert!(report.to_text().contains("Minimizers:                7"));
    }

    #[test]
    fn test_invalid_window() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">r0\nACGTACGT").unwrap();
        file.flush().unwrap();

        let args = SketchArgs {
            k: None,
            w: Some(0),
            hash: false,
        };
        let err = build_report(&Config::default(), file.path().to_path_buf(), &args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::InvalidParams { .. })
        ));
    }
}
