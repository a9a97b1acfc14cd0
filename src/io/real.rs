//! Production implementation of [`SourceReader`].

use std::fs;

use crate::core::InputFile;
use crate::errors::PreprocessError;
use crate::io::traits::SourceReader;

/// Reads input files from their physical path.
///
/// Stateless and thread-safe; one instance can serve every worker.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSourceReader;

impl RealSourceReader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for RealSourceReader {
    fn read_source(&self, file: &InputFile) -> Result<String, PreprocessError> {
        fs::read_to_string(file.path()).map_err(|e| PreprocessError::io(file.path(), e))
    }
}
