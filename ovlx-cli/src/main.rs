use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "ovlx")]
#[command(about = "OvlX - minimizer-based overlap discovery for long reads")]
#[command(version)]
#[command(long_about = "
OvlX finds overlaps between long reads by sketching them into (w,k)-minimizers,
indexing the sketches, matching shared minimizers into anchors and chaining
collinear anchors into overlaps. Overlaps are written as PAF.

Examples:
  ovlx overlap --query reads.fa --out overlaps.paf
  ovlx overlap --query reads.fa --target contigs.fa.gz --out overlaps.paf -k 19 -w 10
  ovlx sketch --input reads.fa
  ovlx config --example > ovlx.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find overlaps between query reads and target reads (all-vs-all without --target)
    Overlap(OverlapArgs),

    /// Sketch reads and report minimizer statistics
    Sketch {
        /// Input sequence file (FASTA/FASTQ, optionally gzipped)
        #[arg(short, long, required = true)]
        input: PathBuf,

        #[command(flatten)]
        sketch: SketchArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or write configuration
    Config {
        /// Print an example configuration file
        #[arg(long)]
        example: bool,

        /// Write the effective configuration to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Sketch overrides shared by commands
#[derive(Args, Clone, Debug, Default)]
pub struct SketchArgs {
    /// K-mer size (1-32)
    #[arg(short, long)]
    pub k: Option<u32>,

    /// Window size in k-mers
    #[arg(short, long)]
    pub w: Option<u32>,

    /// Hash k-mers before picking minimizers
    #[arg(long)]
    pub hash: bool,
}

#[derive(Args, Clone, Debug)]
pub struct OverlapArgs {
    /// Query reads (FASTA/FASTQ, optionally gzipped)
    #[arg(long, required = true)]
    pub query: PathBuf,

    /// Target reads; the query reads are overlapped against themselves when absent
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// Output file (PAF format)
    #[arg(short, long, required = true)]
    pub out: PathBuf,

    #[command(flatten)]
    pub sketch: SketchArgs,

    /// Minimum anchors in a reported overlap
    #[arg(long)]
    pub min_residues: Option<u32>,

    /// Reported overlaps must span more query bases than this
    #[arg(long)]
    pub min_overlap_len: Option<u32>,

    /// Collinear anchors needed to open an overlap
    #[arg(long)]
    pub min_trigger_anchors: Option<u32>,

    /// Largest distance between consecutive anchors of one overlap
    #[arg(long)]
    pub max_anchor_gap: Option<u32>,

    /// Reads per query index
    #[arg(long)]
    pub query_batch_reads: Option<usize>,

    /// Reads per target index
    #[arg(long)]
    pub target_batch_reads: Option<usize>,

    /// Anchor bound for one query/target batch pair
    #[arg(long)]
    pub max_anchors_per_batch: Option<usize>,

    /// Write a JSON run summary to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;

    // Set global thread count
    if let Some(threads) = cli.threads {
        config.general.threads = threads;
    }
    if config.general.threads == 0 {
        return Err(CliError::config("thread count must be at least 1").into());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.general.threads)
        .build_global()
        .context("Failed to set thread count")?;

    // Execute the requested command
    match cli.command {
        Commands::Overlap(args) => {
            commands::overlap::execute(&config, &args, cli.quiet)?;
        }

        Commands::Sketch { input, sketch, json } => {
            commands::sketch::execute(&config, input, &sketch, json)?;
        }

        Commands::Config { example, output } => {
            commands::config::execute(&config, example, output)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose, cli.quiet) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        if let Some(cli_error) = e.downcast_ref::<CliError>() {
            print_error_and_exit(cli_error);
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
