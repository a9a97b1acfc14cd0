//! File classification by unit name.

/// Unit-name suffix that marks a package metadata file.
///
/// Upstream batch producers rely on this exact literal.
pub const PACKAGE_INFO_SUFFIX: &str = "package-info.java";

/// How an input file is preprocessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `package-info.java`: scanned for the package prefix annotation
    PackageInfo,
    /// Any other compilation unit: contributes a header mapping
    Source,
}

impl FileKind {
    /// Classify a file by its logical unit name. The physical path is
    /// never consulted.
    pub fn classify(unit_name: &str) -> Self {
        if unit_name.ends_with(PACKAGE_INFO_SUFFIX) {
            Self::PackageInfo
        } else {
            Self::Source
        }
    }
}

/// Derive the simple type name a compilation unit declares from its unit
/// name: the last path segment without its extension.
///
/// `com/acme/Foo.java` yields `Foo`.
pub fn type_name_from_unit_name(unit_name: &str) -> &str {
    let file_name = unit_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(unit_name);
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}
