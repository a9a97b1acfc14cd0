//! Input-file preprocessing.
//!
//! [`InputFilePreprocessor::process_batch`] visits every file of a
//! [`GenerationBatch`] and fills a [`MappingStore`]:
//!
//! - regular compilation units get a header mapping (when enabled), from
//!   a cheap syntax-only parse;
//! - `package-info.java` files are parsed with bindings and scanned for
//!   the `ObjectiveCName` package annotation.
//!
//! Each file goes through two steps. [`extract`](InputFilePreprocessor::extract)
//! reads and parses the file and returns what it found as a [`FileResult`].
//! It never touches shared state, so it can run on a rayon pool.
//! The results are then applied to the store and the diagnostics sink one
//! by one, in batch order, on the calling thread. Batch order therefore
//! decides every prefix conflict, whether or not extraction ran in
//! parallel.
//!
//! # Example
//!
//! ```rust,no_run
//! use headermap::config::PreprocessConfig;
//! use headermap::core::{GenerationBatch, GenerationUnit, InputFile};
//! use headermap::diagnostics::Diagnostics;
//! use headermap::io::RealSourceReader;
//! use headermap::mapping::MappingStore;
//! use headermap::preprocess::InputFilePreprocessor;
//! use headermap::syntax::TreeSitterJavaParser;
//!
//! # fn main() -> anyhow::Result<()> {
//! let batch = GenerationBatch::new().with_unit(
//!     GenerationUnit::new("Foo", "out/Foo")
//!         .with_file(InputFile::new("com/acme/Foo.java", "src/com/acme/Foo.java")),
//! );
//!
//! let config = PreprocessConfig::default().with_map_headers(true);
//! let preprocessor =
//!     InputFilePreprocessor::new(TreeSitterJavaParser::new()?, RealSourceReader::new(), config);
//!
//! let mut store = MappingStore::new();
//! let mut diagnostics = Diagnostics::new();
//! preprocessor.process_batch(&batch, &mut store, &mut diagnostics);
//! # Ok(())
//! # }
//! ```

pub mod header;
pub mod package_info;

pub use header::HeaderEntry;
pub use package_info::{PackageInfoFacts, PrefixDeclaration};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::PreprocessConfig;
use crate::core::{FileKind, GenerationBatch, GenerationUnit, InputFile};
use crate::diagnostics::DiagnosticsSink;
use crate::errors::PreprocessError;
use crate::io::SourceReader;
use crate::mapping::MappingStore;
use crate::syntax::SourceParser;

/// What a single file contributes, before it is applied to the store.
#[derive(Debug)]
pub enum FileFacts {
    /// Nothing to do for this file under the current configuration
    Skipped,
    HeaderMapping(HeaderEntry),
    PackageInfo(PackageInfoFacts),
}

/// Why a single file contributed nothing.
#[derive(Debug)]
pub enum FileFailure {
    /// The file could not be read
    Io(PreprocessError),
    /// The parser produced no tree
    Parse,
}

pub type FileResult = Result<FileFacts, FileFailure>;

/// Counters for one pass over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files: usize,
    pub skipped: usize,
    pub header_mappings: usize,
    /// Package-info files without a prefix annotation
    pub no_annotation: usize,
    pub prefixes_registered: usize,
    /// Re-declarations of an already registered, identical prefix
    pub prefixes_unchanged: usize,
    pub conflicts: usize,
    pub invalid_prefixes: usize,
    pub io_failures: usize,
    pub parse_failures: usize,
}

impl BatchSummary {
    /// Number of messages this pass sent to the diagnostics sink.
    pub fn reported_errors(&self, config: &PreprocessConfig) -> usize {
        let parse = if config.report_parse_failures {
            self.parse_failures
        } else {
            0
        };
        self.conflicts + self.invalid_prefixes + self.io_failures + parse
    }
}

/// Runs the preprocessing pass over generation batches.
pub struct InputFilePreprocessor<P, R> {
    parser: P,
    reader: R,
    config: PreprocessConfig,
}

impl<P: SourceParser, R: SourceReader> InputFilePreprocessor<P, R> {
    pub fn new(parser: P, reader: R, config: PreprocessConfig) -> Self {
        Self {
            parser,
            reader,
            config,
        }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Preprocess every file in `batch`, in batch order.
    ///
    /// Per-file failures are reported to `sink` and never stop the pass.
    /// `store` is only complete once this returns.
    pub fn process_batch(
        &self,
        batch: &GenerationBatch,
        store: &mut MappingStore,
        sink: &mut dyn DiagnosticsSink,
    ) -> BatchSummary {
        let files: Vec<(&GenerationUnit, &InputFile)> = batch.files().collect();
        let results = self.extract_all(&files);

        let mut summary = BatchSummary::default();
        for (&(_, file), result) in files.iter().zip(results) {
            self.apply(file, result, store, sink, &mut summary);
        }

        log::info!(
            "Preprocessed {} files: {} header mappings, {} prefixes, {} conflicts, \
             {} unreadable, {} unparsable",
            summary.files,
            summary.header_mappings,
            summary.prefixes_registered,
            summary.conflicts,
            summary.io_failures,
            summary.parse_failures
        );
        summary
    }

    /// Read, parse and extract one file without touching shared state.
    pub fn extract(&self, unit: &GenerationUnit, file: &InputFile) -> FileResult {
        match FileKind::classify(file.unit_name()) {
            FileKind::PackageInfo => {
                package_info::extract_package_prefixes(&self.parser, &self.reader, file)
            }
            FileKind::Source => {
                header::extract_header_mapping(&self.parser, &self.reader, &self.config, unit, file)
            }
        }
    }

    fn extract_all(&self, files: &[(&GenerationUnit, &InputFile)]) -> Vec<FileResult> {
        if !self.config.parallel.enabled || files.len() < 2 {
            return files
                .iter()
                .map(|&(unit, file)| self.extract(unit, file))
                .collect();
        }

        // Indexed collection keeps results in input order.
        let run = || -> Vec<FileResult> {
            files
                .par_iter()
                .map(|&(unit, file)| self.extract(unit, file))
                .collect()
        };

        let threads = self.config.parallel.effective_concurrency().min(files.len());
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => {
                log::debug!("Extracting {} files on {} threads", files.len(), threads);
                pool.install(run)
            }
            Err(e) => {
                log::warn!(
                    "Failed to build a {}-thread pool, using the global pool: {}",
                    threads,
                    e
                );
                run()
            }
        }
    }

    fn apply(
        &self,
        file: &InputFile,
        result: FileResult,
        store: &mut MappingStore,
        sink: &mut dyn DiagnosticsSink,
        summary: &mut BatchSummary,
    ) {
        summary.files += 1;

        match result {
            Ok(FileFacts::Skipped) => summary.skipped += 1,
            Ok(FileFacts::HeaderMapping(entry)) => {
                header::apply_header_mapping(entry, store);
                summary.header_mappings += 1;
            }
            Ok(FileFacts::PackageInfo(facts)) => {
                package_info::apply_package_info(facts, file, store, sink, summary);
            }
            Err(FileFailure::Io(e)) => {
                log::warn!("Skipping {}: {}", file.unit_name(), e);
                summary.io_failures += 1;
                sink.error(e.to_string());
            }
            Err(FileFailure::Parse) => {
                log::debug!("No syntax tree for {}, skipping", file.unit_name());
                summary.parse_failures += 1;
                if self.config.report_parse_failures {
                    sink.error(format!("Failed to parse {}", file.path().display()));
                }
            }
        }
    }
}
