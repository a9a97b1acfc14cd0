//! Run configuration for a preprocessing pass.
//!
//! Configuration is plain serde data. It can be built in code or read
//! from TOML, either as top-level keys or under a `[preprocess]` table:
//!
//! ```toml
//! [preprocess]
//! map_headers = true
//! header_suffix = ".h"
//! report_parse_failures = false
//!
//! [preprocess.parallel]
//! enabled = true
//! max_concurrency = 4
//! ```

mod loader;
mod parallel;

pub use parallel::ParallelConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PreprocessError, Result};

fn default_header_suffix() -> String {
    ".h".to_string()
}

/// Settings that control a single preprocessing pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreprocessConfig {
    /// Record a header mapping for every regular compilation unit.
    ///
    /// When false, regular compilation units are not even read.
    #[serde(default)]
    pub map_headers: bool,

    /// Appended to a generation unit's output path to form the header path.
    #[serde(default = "default_header_suffix")]
    pub header_suffix: String,

    /// Send a diagnostic for files the parser rejects.
    ///
    /// Off by default: parsers usually report their own syntax errors.
    #[serde(default)]
    pub report_parse_failures: bool,

    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            map_headers: false,
            header_suffix: default_header_suffix(),
            report_parse_failures: false,
            parallel: ParallelConfig::default(),
        }
    }
}

impl PreprocessConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        loader::parse_and_validate_config(contents)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        loader::load_config_from_path(path.as_ref())
    }

    /// Enable or disable header mapping.
    pub fn with_map_headers(mut self, enabled: bool) -> Self {
        self.map_headers = enabled;
        self
    }

    /// Use sequential extraction.
    pub fn sequential(mut self) -> Self {
        self.parallel = ParallelConfig::sequential();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.header_suffix.is_empty() {
            return Err(PreprocessError::config("header_suffix must not be empty"));
        }
        if self.parallel.max_concurrency == Some(0) {
            return Err(PreprocessError::config(
                "parallel.max_concurrency must be at least 1",
            ));
        }
        Ok(())
    }
}
