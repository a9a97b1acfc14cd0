//! I/O trait definitions for preprocessing.

use crate::core::InputFile;
use crate::errors::PreprocessError;

/// Reads the text of an input file.
///
/// # Implementation Notes
///
/// Implementations should be thread-safe (`Send + Sync`) to support
/// parallel extraction across multiple files.
pub trait SourceReader: Send + Sync {
    /// Read a file's contents as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns `PreprocessError::Io` if:
    /// - The file doesn't exist
    /// - Permission is denied
    /// - The file isn't valid UTF-8
    fn read_source(&self, file: &InputFile) -> Result<String, PreprocessError>;
}

impl<R: SourceReader + ?Sized> SourceReader for &R {
    fn read_source(&self, file: &InputFile) -> Result<String, PreprocessError> {
        (**self).read_source(file)
    }
}
