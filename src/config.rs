//! Named filename patterns loaded from TOML.
//!
//! ```toml
//! [patterns.report]
//! stem = "report_"
//! extension = "*.csv"
//!
//! [patterns.notes]
//! stem = "notes-"
//! stamp_pattern = '\d{4}-\d{2}-\d{2}'
//! ```

use crate::patterns::FilenamePattern;
use crate::scanner::DirectoryScanner;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A set of named filename patterns
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub patterns: BTreeMap<String, FilenamePattern>,
}

impl ScanConfig {
    /// Parse TOML content, compiling every pattern so bad regexes are caught up front
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ScanConfig =
            toml::from_str(content).context("Failed to parse filename pattern TOML")?;

        for (name, pattern) in &config.patterns {
            pattern
                .compile()
                .with_context(|| format!("Invalid pattern '{}'", name))?;
        }

        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&FilenamePattern> {
        self.patterns.get(name)
    }

    /// Scanner for the named pattern over `directory`
    pub fn scanner(&self, name: &str, directory: impl Into<PathBuf>) -> Result<DirectoryScanner> {
        let pattern = self
            .get(name)
            .with_context(|| format!("Unknown pattern '{}'", name))?;
        Ok(DirectoryScanner::new(directory, pattern.clone())?)
    }
}
