//! Input-file preprocessing for a Java source translator.
//!
//! Before any file of a batch is translated, the translator needs two
//! cross-file tables:
//!
//! - **header mappings**: which generated header each type lands in, so
//!   one unit's output can include another's;
//! - **package prefixes**: the output-name override a package declares
//!   with `@ObjectiveCName` in its `package-info.java`.
//!
//! [`InputFilePreprocessor`] builds both into a caller-owned
//! [`MappingStore`] in one pass over a [`GenerationBatch`], choosing a
//! syntax-only or binding-resolving parse per file and reporting
//! problems to a [`DiagnosticsSink`] without stopping.

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod errors;
pub mod io;
pub mod mapping;
pub mod preprocess;
pub mod syntax;
pub mod testkit;

// Re-export commonly used types
pub use crate::config::{ParallelConfig, PreprocessConfig};
pub use crate::core::{FileKind, GenerationBatch, GenerationUnit, InputFile};
pub use crate::diagnostics::{Diagnostics, DiagnosticsSink};
pub use crate::errors::{PreprocessError, Result};
pub use crate::io::{RealSourceReader, SourceReader};
pub use crate::mapping::{MappingStore, PrefixRegistration};
pub use crate::preprocess::{BatchSummary, InputFilePreprocessor};
pub use crate::syntax::{SourceParser, TreeSitterJavaParser};
