//! Configuration types for hognest

use crate::types::OutputFormat;
use crate::HognestError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Left bound given to the first root of the forest
    #[serde(default = "default_first_bound")]
    pub first_bound: u64,
    /// Node id given to the first root of the forest
    #[serde(default = "default_first_node_id")]
    pub first_node_id: u64,
    /// Depth guard; deeper trees are rejected as cyclic or malformed
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Separator of compound gene identifiers
    #[serde(default = "default_gene_delimiter")]
    pub gene_delimiter: String,
    /// Re-check every invariant on the produced records before returning them
    #[serde(default = "default_verify_invariants")]
    pub verify_invariants: bool,
    /// Encode top-level groups on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_warn_on_empty_subtrees")]
    pub warn_on_empty_subtrees: bool,
    /// Maximum number of resolution issues kept in the run report
    #[serde(default = "default_issue_sample_limit")]
    pub issue_sample_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_directory")]
    pub directory: String,
}

// Default value functions
fn default_first_bound() -> u64 { 1 }
fn default_first_node_id() -> u64 { 1 }
fn default_max_depth() -> usize { 10_000 }
fn default_gene_delimiter() -> String { "; ".to_string() }
fn default_verify_invariants() -> bool { true }
fn default_parallel() -> bool { false }
fn default_warn_on_empty_subtrees() -> bool { true }
fn default_issue_sample_limit() -> usize { 100 }
fn default_directory() -> String { ".".to_string() }

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            first_bound: default_first_bound(),
            first_node_id: default_first_node_id(),
            max_depth: default_max_depth(),
            gene_delimiter: default_gene_delimiter(),
            verify_invariants: default_verify_invariants(),
            parallel: default_parallel(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            warn_on_empty_subtrees: default_warn_on_empty_subtrees(),
            issue_sample_limit: default_issue_sample_limit(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: default_directory(),
        }
    }
}

impl Config {
    /// Reject settings the encoder cannot work with
    pub fn validate(&self) -> Result<(), HognestError> {
        if self.encoding.gene_delimiter.is_empty() {
            return Err(HognestError::Configuration(
                "encoding.gene_delimiter must not be empty".to_string(),
            ));
        }
        if self.encoding.first_bound == 0 || self.encoding.first_node_id == 0 {
            return Err(HognestError::Configuration(
                "encoding.first_bound and encoding.first_node_id start at 1".to_string(),
            ));
        }
        if self.encoding.max_depth == 0 {
            return Err(HognestError::Configuration(
                "encoding.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, HognestError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| HognestError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    tracing::debug!("Loaded configuration from {:?}", path.as_ref());
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), HognestError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| HognestError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
