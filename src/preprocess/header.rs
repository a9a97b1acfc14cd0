//! Header mappings for regular compilation units.

use crate::config::PreprocessConfig;
use crate::core::{type_name_from_unit_name, GenerationUnit, InputFile};
use crate::io::SourceReader;
use crate::mapping::MappingStore;
use crate::syntax::{CompilationUnit, SourceParser};

use super::{FileFacts, FileFailure, FileResult};

/// Where one type's header will be generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub qualified_name: String,
    pub header_path: String,
}

/// Qualified name of the type a compilation unit declares.
///
/// The simple name comes from the unit name, the package from the
/// parsed tree. Units in the default package map to the bare name.
pub fn qualified_type_name(unit_name: &str, unit: &CompilationUnit) -> String {
    let type_name = type_name_from_unit_name(unit_name);
    match unit.package_name() {
        Some(package) => format!("{}.{}", package, type_name),
        None => type_name.to_string(),
    }
}

pub(crate) fn extract_header_mapping<P: SourceParser, R: SourceReader>(
    parser: &P,
    reader: &R,
    config: &PreprocessConfig,
    generation_unit: &GenerationUnit,
    file: &InputFile,
) -> FileResult {
    if !config.map_headers {
        return Ok(FileFacts::Skipped);
    }

    let source = reader.read_source(file).map_err(FileFailure::Io)?;
    // Only the package declaration is needed, so skip binding resolution.
    let unit = parser
        .parse_syntax_only(file.unit_name(), &source)
        .ok_or(FileFailure::Parse)?;

    Ok(FileFacts::HeaderMapping(HeaderEntry {
        qualified_name: qualified_type_name(file.unit_name(), &unit),
        header_path: format!("{}{}", generation_unit.output_path(), config.header_suffix),
    }))
}

pub(crate) fn apply_header_mapping(entry: HeaderEntry, store: &mut MappingStore) {
    log::debug!("{} -> {}", entry.qualified_name, entry.header_path);
    if let Some(previous) = store.add_header_mapping(&entry.qualified_name, &entry.header_path) {
        if previous != entry.header_path {
            log::debug!(
                "{} remapped from {} to {}",
                entry.qualified_name,
                previous,
                entry.header_path
            );
        }
    }
}
