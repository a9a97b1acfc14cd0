//! Core batch types and file classification.

pub mod batch;
pub mod classify;

pub use batch::{GenerationBatch, GenerationUnit, InputFile};
pub use classify::{type_name_from_unit_name, FileKind, PACKAGE_INFO_SUFFIX};
