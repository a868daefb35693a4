//! Overlap command implementation - batched all-vs-all or query-vs-target overlap discovery

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ovlx_core::{
    BatchOutput, Execution, Index, MatchError, OverlapPipeline, PafWriter, PipelineError,
    PipelineParams, PipelineStats, ReadId, ReadSet, SketchError,
};

use crate::config::Config;
use crate::error::CliError;
use crate::OverlapArgs;

/// Run summary written with `--summary`
#[derive(Debug, Serialize)]
pub struct OverlapSummary {
    pub query: PathBuf,
    pub target: Option<PathBuf>,
    pub params: PipelineParams,
    pub stats: PipelineStats,
    pub target_batch_shrinks: u64,
    pub elapsed_seconds: f64,
}

pub fn execute(config: &Config, args: &OverlapArgs, quiet: bool) -> Result<()> {
    let started = Instant::now();
    log::info!("Starting overlap discovery");
    log::info!("Query: {}", args.query.display());
    if let Some(target) = &args.target {
        log::info!("Target: {}", target.display());
    }
    log::info!("Output: {}", args.out.display());

    let config = apply_overrides(config, args);
    let params = pipeline_params(&config);
    log::info!(
        "Sketch parameters: k={}, w={}, hashed={}",
        params.sketch.k,
        params.sketch.w,
        params.sketch.hash_representations
    );
    let pipeline = create_pipeline(params)?;

    log::info!("Loading query reads");
    let query_reads = super::load_reads(&args.query).context("Failed to load query reads")?;
    let target_reads = match &args.target {
        Some(path) => {
            log::info!("Loading target reads");
            Some(super::load_reads(path).context("Failed to load target reads")?)
        }
        None => None,
    };
    let targets = target_reads.as_ref().unwrap_or(&query_reads);
    log::info!(
        "Loaded {} query reads and {} target reads",
        query_reads.len(),
        targets.len()
    );

    let query_batches = batches(query_reads.len(), config.batch.query_batch_reads);
    let target_range = 0..targets.len() as ReadId;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(query_batches.len() as u64 * target_range.end)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} target reads")
            .context("Invalid progress bar template")?,
    );

    let file = File::create(&args.out)
        .with_context(|| format!("Failed to create output file: {}", args.out.display()))?;
    let mut writer = PafWriter::new(BufWriter::new(file));
    let mut stats = PipelineStats::default();
    let mut shrinks = 0;

    for query_batch in &query_batches {
        log::debug!("Indexing query reads [{}, {})", query_batch.start, query_batch.end);
        let query_index = pipeline.build_index(&query_reads, query_batch.clone())?;

        let mut runner = TargetBatchRunner {
            pipeline: &pipeline,
            target_reads: targets,
            self_comparison: target_reads.is_none(),
            batch_reads: config.batch.target_batch_reads,
            shrinks: 0,
        };
        let mut output = runner.run(query_index.as_ref(), target_range.clone(), &progress)?;
        shrinks += runner.shrinks;

        output.overlaps.sort_by_key(|o| {
            (o.query_read_id, o.target_read_id, o.query_start_position_in_read)
        });
        writer
            .write_overlaps(&output.overlaps, &query_reads, targets)
            .context("Failed to write PAF output")?;
        stats += &output.stats;
    }
    writer.flush().context("Failed to write PAF output")?;
    progress.finish_and_clear();

    log::info!(
        "Matched {} anchors into {} overlaps over {} batch pairs",
        stats.anchors,
        stats.overlaps,
        stats.batch_pairs
    );
    if shrinks > 0 {
        log::info!("Target batches were halved {} times to fit the anchor bound", shrinks);
    }

    if let Some(summary_path) = &args.summary {
        let summary = OverlapSummary {
            query: args.query.clone(),
            target: args.target.clone(),
            params,
            stats,
            target_batch_shrinks: shrinks,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        };
        write_summary(&summary, summary_path)?;
        log::info!("Summary written to {}", summary_path.display());
    }

    log::info!("Wrote {} overlaps to {}", writer.records_written(), args.out.display());
    Ok(())
}

/// Configuration with command-line values taking precedence
fn apply_overrides(config: &Config, args: &OverlapArgs) -> Config {
    let mut config = config.clone();
    if let Some(k) = args.sketch.k {
        config.sketch.k = k;
    }
    if let Some(w) = args.sketch.w {
        config.sketch.w = w;
    }
    if args.sketch.hash {
        config.sketch.hash_representations = true;
    }
    if let Some(v) = args.min_residues {
        config.overlap.min_residues = v;
    }
    if let Some(v) = args.min_overlap_len {
        config.overlap.min_overlap_len = v;
    }
    if let Some(v) = args.min_trigger_anchors {
        config.overlap.min_trigger_anchors = v;
    }
    if let Some(v) = args.max_anchor_gap {
        config.overlap.max_anchor_gap = v;
    }
    if let Some(v) = args.query_batch_reads {
        config.batch.query_batch_reads = v;
    }
    if let Some(v) = args.target_batch_reads {
        config.batch.target_batch_reads = v;
    }
    if args.max_anchors_per_batch.is_some() {
        config.batch.max_anchors_per_batch = args.max_anchors_per_batch;
    }
    config
}

fn pipeline_params(config: &Config) -> PipelineParams {
    PipelineParams {
        sketch: config.sketch.params(),
        trigger: config.overlap.trigger_params(),
        filter: config.overlap.filter_params(),
        max_anchors: config.batch.max_anchors_per_batch,
        execution: if config.general.threads > 1 {
            Execution::Parallel
        } else {
            Execution::Sequential
        },
    }
}

fn create_pipeline(params: PipelineParams) -> Result<OverlapPipeline> {
    match OverlapPipeline::new(params) {
        Ok(pipeline) => Ok(pipeline),
        Err(PipelineError::Sketch(SketchError::InvalidParams(message))) => {
            Err(CliError::invalid_params(message).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Consecutive read ranges of at most `batch_reads` reads
fn batches(number_of_reads: usize, batch_reads: usize) -> Vec<Range<ReadId>> {
    let total = number_of_reads as ReadId;
    let size = batch_reads.max(1) as ReadId;
    (0..total)
        .step_by(size as usize)
        .map(|start| start..(start + size).min(total))
        .collect()
}

/// Walks the target reads in batches for one query index, halving the batch
/// whenever a batch pair needs more anchors than the bound allows.
struct TargetBatchRunner<'a> {
    pipeline: &'a OverlapPipeline,
    target_reads: &'a ReadSet,
    /// Targets are the query reads themselves
    self_comparison: bool,
    batch_reads: usize,
    shrinks: u64,
}

impl TargetBatchRunner<'_> {
    fn run(
        &mut self,
        query_index: &dyn Index,
        target_range: Range<ReadId>,
        progress: &ProgressBar,
    ) -> Result<BatchOutput> {
        let mut output = BatchOutput::default();
        let mut size = self.batch_reads.max(1) as ReadId;
        let mut start = target_range.start;

        while start < target_range.end {
            let end = (start + size).min(target_range.end);
            let target_index = self.pipeline.build_index(self.target_reads, start..end)?;

            match self.pipeline.overlap_indices(
                query_index,
                target_index.as_ref(),
                self.self_comparison,
            ) {
                Ok(batch) => {
                    output.stats += &batch.stats;
                    output.overlaps.extend(batch.overlaps);
                    progress.inc(end - start);
                    start = end;
                }
                Err(PipelineError::Match(MatchError::CapacityExceeded { required, capacity })) => {
                    if end - start == 1 {
                        return Err(CliError::CapacityExceeded {
                            query_first: query_index.first_read_id(),
                            query_past_last: query_index.past_last_read_id(),
                            target: start,
                            required,
                            capacity,
                        }
                        .into());
                    }
                    size = (end - start) / 2;
                    self.shrinks += 1;
                    log::warn!(
                        "Target reads [{}, {}) need {} anchors (capacity {}), retrying with {} reads per batch",
                        start,
                        end,
                        required,
                        capacity,
                        size
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(output)
    }
}

fn write_summary(summary: &OverlapSummary, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .context("Failed to write summary")?;
    Ok(())
}
