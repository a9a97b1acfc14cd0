//! In-memory source reader.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::core::InputFile;
use crate::errors::PreprocessError;
use crate::io::SourceReader;

/// Source files keyed by physical path.
///
/// Clones share the same files, so a test can keep a handle and edit
/// sources between two passes.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceReader {
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl MemorySourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the mock file system.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add or replace a file.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .write()
            .expect("Lock poisoned")
            .insert(path.into(), content.into());
    }

    /// Remove a file so later reads fail.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files
            .write()
            .expect("Lock poisoned")
            .remove(path.as_ref());
    }
}

impl SourceReader for MemorySourceReader {
    fn read_source(&self, file: &InputFile) -> Result<String, PreprocessError> {
        self.files
            .read()
            .expect("Lock poisoned")
            .get(file.path())
            .cloned()
            .ok_or_else(|| {
                PreprocessError::io(
                    file.path(),
                    io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_between_clones() {
        let reader = MemorySourceReader::new().with_file("A.java", "class A {}");
        let handle = reader.clone();
        let file = InputFile::new("A.java", "A.java");

        assert_eq!(reader.read_source(&file).unwrap(), "class A {}");
        handle.remove_file("A.java");
        assert!(reader.read_source(&file).unwrap_err().is_io());
    }
}
