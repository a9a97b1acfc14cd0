//! Batch model: input files grouped into generation units.

use std::path::{Path, PathBuf};

/// One source compilation unit handed to the translator.
///
/// The unit name is the logical name (`com/acme/Foo.java`) used for
/// classification and as the parser key. The path is where the text is
/// read from and is what diagnostics mention.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputFile {
    unit_name: String,
    path: PathBuf,
}

impl InputFile {
    pub fn new(unit_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            unit_name: unit_name.into(),
            path: path.into(),
        }
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A group of input files that share one output destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationUnit {
    name: String,
    output_path: String,
    input_files: Vec<InputFile>,
}

impl GenerationUnit {
    /// Create an empty unit whose generated files start with `output_path`.
    pub fn new(name: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_path: output_path.into(),
            input_files: Vec::new(),
        }
    }

    /// Add a file to this unit.
    pub fn with_file(mut self, file: InputFile) -> Self {
        self.input_files.push(file);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output path stem, without any suffix.
    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn input_files(&self) -> &[InputFile] {
        &self.input_files
    }
}

/// An ordered collection of generation units processed in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationBatch {
    units: Vec<GenerationUnit>,
}

impl GenerationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: GenerationUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Every file paired with its owning unit, in batch order.
    ///
    /// Batch order is unit order first, then file order within the unit.
    pub fn files(&self) -> impl Iterator<Item = (&GenerationUnit, &InputFile)> + '_ {
        self.units
            .iter()
            .flat_map(|unit| unit.input_files.iter().map(move |file| (unit, file)))
    }

    pub fn file_count(&self) -> usize {
        self.units.iter().map(|unit| unit.input_files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}

impl FromIterator<GenerationUnit> for GenerationBatch {
    fn from_iter<I: IntoIterator<Item = GenerationUnit>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_follow_batch_order() {
        let batch = GenerationBatch::new()
            .with_unit(
                GenerationUnit::new("first", "out/First")
                    .with_file(InputFile::new("a/A.java", "src/a/A.java"))
                    .with_file(InputFile::new("a/B.java", "src/a/B.java")),
            )
            .with_unit(
                GenerationUnit::new("second", "out/Second")
                    .with_file(InputFile::new("b/C.java", "src/b/C.java")),
            );

        let order: Vec<(&str, &str)> = batch
            .files()
            .map(|(unit, file)| (unit.name(), file.unit_name()))
            .collect();

        assert_eq!(
            order,
            vec![
                ("first", "a/A.java"),
                ("first", "a/B.java"),
                ("second", "b/C.java"),
            ]
        );
        assert_eq!(batch.file_count(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let batch: GenerationBatch = vec![GenerationUnit::new("empty", "out/Empty")]
            .into_iter()
            .collect();
        assert!(batch.is_empty());
        assert_eq!(batch.files().count(), 0);
    }
}
