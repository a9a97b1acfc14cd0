//! Parallelism configuration for the extraction phase of a batch.
//!
//! Only reading and parsing run in parallel. Table updates are always
//! applied afterwards on the calling thread, in batch order.

use serde::{Deserialize, Serialize};

/// Default value for parallel processing enabled
fn default_enabled() -> bool {
    true
}

/// Configuration for parallel file extraction.
///
/// When enabled, files are read and parsed concurrently using rayon's
/// thread pool. Results are still applied to the mapping tables in
/// batch order, so enabling parallelism never changes which prefix
/// wins a conflict.
///
/// # Example
///
/// ```rust
/// use headermap::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     enabled: true,
///     max_concurrency: Some(4),
/// };
/// assert_eq!(config.effective_concurrency(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Enable parallel extraction (default: true)
    ///
    /// When disabled, files are processed sequentially on the
    /// calling thread. Useful for debugging.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum worker threads (default: number of CPUs)
    ///
    /// Each batch runs on a dedicated rayon pool of
    /// [`effective_concurrency`](Self::effective_concurrency) threads,
    /// never more than the batch has files.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_concurrency: None,
        }
    }
}

impl ParallelConfig {
    /// Create a config with parallel processing disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Get the effective concurrency level.
    ///
    /// Returns the configured max_concurrency, or the number of
    /// available CPU cores if not specified.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(num_cpus::get)
    }
}
