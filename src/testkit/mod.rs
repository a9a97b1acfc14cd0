//! Testing infrastructure for preprocessing.
//!
//! - **[`MemorySourceReader`]**: in-memory [`SourceReader`](crate::io::SourceReader)
//!   where missing files fail like unreadable ones
//! - **[`ScriptedParser`]**: a [`SourceParser`](crate::syntax::SourceParser)
//!   that hands out prepared trees and counts how often each parse mode
//!   and binding resolution is used
//!
//! # Quick Start
//!
//! ```rust
//! use headermap::config::PreprocessConfig;
//! use headermap::core::{GenerationBatch, GenerationUnit, InputFile};
//! use headermap::diagnostics::Diagnostics;
//! use headermap::mapping::MappingStore;
//! use headermap::preprocess::InputFilePreprocessor;
//! use headermap::testkit::{package_info_unit, MemorySourceReader, ScriptedParser};
//!
//! let batch = GenerationBatch::new().with_unit(
//!     GenerationUnit::new("acme", "out/acme")
//!         .with_file(InputFile::new("com/acme/package-info.java", "package-info.java")),
//! );
//! let parser = ScriptedParser::new()
//!     .with_unit("com/acme/package-info.java", package_info_unit("com.acme", "ACME"));
//! let reader = MemorySourceReader::new().with_file("package-info.java", "");
//!
//! let preprocessor = InputFilePreprocessor::new(parser, reader, PreprocessConfig::default());
//! let mut store = MappingStore::new();
//! let mut diagnostics = Diagnostics::new();
//! preprocessor.process_batch(&batch, &mut store, &mut diagnostics);
//!
//! assert_eq!(store.package_prefix("com.acme"), Some("ACME"));
//! ```

mod mock_reader;
mod scripted_parser;

pub use mock_reader::MemorySourceReader;
pub use scripted_parser::{ParseCounters, ScriptedParser};

use crate::syntax::{
    Annotation, CompilationUnit, Expression, PackageDeclaration, OBJECTIVE_C_NAME_ANNOTATION,
};

/// A package-info tree carrying a fully-qualified prefix annotation.
pub fn package_info_unit(package: &str, prefix: &str) -> CompilationUnit {
    CompilationUnit::new(Some(PackageDeclaration::new(package).with_annotation(
        Annotation::single(OBJECTIVE_C_NAME_ANNOTATION, Expression::string(prefix)),
    )))
}
