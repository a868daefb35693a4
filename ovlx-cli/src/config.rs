//! Configuration handling for OvlX CLI
//!
//! Supports loading configuration from ovlx.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use ovlx_core::{FilterParams, SketchParams, TriggerParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sketch: SketchConfig,
    #[serde(default)]
    pub overlap: OverlapConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default number of threads to use
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchConfig {
    /// K-mer length, 1 to 32
    #[serde(default = "default_k")]
    pub k: u32,

    /// Number of consecutive k-mers per minimizer window
    #[serde(default = "default_w")]
    pub w: u32,

    /// Hash canonical k-mers before picking minimizers
    #[serde(default)]
    pub hash_representations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapConfig {
    /// Minimum number of anchors in a reported overlap
    #[serde(default = "default_min_residues")]
    pub min_residues: u32,

    /// Reported overlaps must span more query bases than this
    #[serde(default)]
    pub min_overlap_len: u32,

    /// Collinear anchors needed to open an overlap
    #[serde(default = "default_min_trigger_anchors")]
    pub min_trigger_anchors: u32,

    /// Largest distance between consecutive anchors of one overlap
    #[serde(default = "default_max_anchor_gap")]
    pub max_anchor_gap: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Reads per query index
    #[serde(default = "default_batch_reads")]
    pub query_batch_reads: usize,

    /// Reads per target index
    #[serde(default = "default_batch_reads")]
    pub target_batch_reads: usize,

    /// Anchor bound for one query/target batch pair, unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_anchors_per_batch: Option<usize>,
}

// Default value functions
fn default_threads() -> usize { num_cpus::get() }
fn default_k() -> u32 { SketchParams::default().k }
fn default_w() -> u32 { SketchParams::default().w }
fn default_min_residues() -> u32 { FilterParams::default().min_residues }
fn default_min_trigger_anchors() -> u32 { TriggerParams::default().min_trigger_anchors }
fn default_max_anchor_gap() -> u32 { TriggerParams::default().max_anchor_gap }
fn default_batch_reads() -> usize { 1000 }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            w: default_w(),
            hash_representations: false,
        }
    }
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            min_residues: default_min_residues(),
            min_overlap_len: 0,
            min_trigger_anchors: default_min_trigger_anchors(),
            max_anchor_gap: default_max_anchor_gap(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            query_batch_reads: default_batch_reads(),
            target_batch_reads: default_batch_reads(),
            max_anchors_per_batch: None,
        }
    }
}

impl SketchConfig {
    pub fn params(&self) -> SketchParams {
        SketchParams::new(self.k, self.w, self.hash_representations)
    }
}

impl OverlapConfig {
    pub fn trigger_params(&self) -> TriggerParams {
        TriggerParams {
            min_trigger_anchors: self.min_trigger_anchors,
            max_anchor_gap: self.max_anchor_gap,
        }
    }

    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            min_residues: self.min_residues,
            min_overlap_len: self.min_overlap_len,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find ovlx.toml in current directory
                let default_path = PathBuf::from("ovlx.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: ovlx.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }
}
