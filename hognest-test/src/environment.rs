//! Test environment management
//!
//! Provides isolated input/output directories with automatic cleanup using RAII.

use anyhow::{Context, Result};
use hognest_bio::formats::write_forest_json;
use hognest_bio::HogForest;
use hognest_core::{save_config, Config};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Configuration for test environment
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Keep the directory after the test (for debugging)
    pub preserve: bool,
    /// Custom prefix for the temporary directory
    pub prefix: Option<String>,
}

/// Isolated test environment with automatic cleanup
pub struct TestEnvironment {
    temp_dir: Option<TempDir>,
    root_path: PathBuf,
    config: TestConfig,
}

impl TestEnvironment {
    /// Create a new test environment with default config
    pub fn new() -> Result<Self> {
        Self::with_config(TestConfig::default())
    }

    /// Create a new test environment with custom config
    pub fn with_config(config: TestConfig) -> Result<Self> {
        let prefix = config.prefix.as_deref().unwrap_or("hognest-test");
        let temp_dir =
            TempDir::with_prefix(prefix).context("Failed to create temporary directory")?;
        let root_path = temp_dir.path().to_path_buf();

        std::fs::create_dir_all(root_path.join("input"))?;
        std::fs::create_dir_all(root_path.join("output"))?;

        Ok(Self {
            temp_dir: Some(temp_dir),
            root_path,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root_path.join("input")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root_path.join("output")
    }

    /// Write a file under the input directory and return its path
    pub fn write_input(&self, name: impl AsRef<Path>, content: &[u8]) -> Result<PathBuf> {
        let path = self.input_dir().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn write_forest(&self, name: &str, forest: &HogForest) -> Result<PathBuf> {
        let path = self.input_dir().join(name);
        write_forest_json(forest, &path)?;
        Ok(path)
    }

    /// Write one gene id per line
    pub fn write_catalog(&self, name: &str, genes: &[&str]) -> Result<PathBuf> {
        let mut content = String::from("# gene_id\n");
        for gene in genes {
            content.push_str(gene);
            content.push('\n');
        }
        self.write_input(name, content.as_bytes())
    }

    /// Write `reference_taxon_id<TAB>prefix` rows
    pub fn write_sharing(&self, name: &str, rows: &[(u32, &str)]) -> Result<PathBuf> {
        let content: String = rows
            .iter()
            .map(|(taxon, prefix)| format!("{}\t{}\n", taxon, prefix))
            .collect();
        self.write_input(name, content.as_bytes())
    }

    pub fn write_config(&self, name: &str, config: &Config) -> Result<PathBuf> {
        let path = self.input_dir().join(name);
        save_config(&path, config)?;
        Ok(path)
    }

    pub fn read_output(&self, name: impl AsRef<Path>) -> Result<String> {
        let path = self.output_dir().join(name);
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Keep the directory on disk after the environment is dropped
    pub fn preserve(&mut self) {
        if let Some(temp_dir) = self.temp_dir.take() {
            let path = temp_dir.keep();
            println!("Test environment preserved at: {}", path.display());
        }
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if self.config.preserve {
            self.preserve();
        }
        // Otherwise, temp_dir is automatically cleaned up when dropped
    }
}
