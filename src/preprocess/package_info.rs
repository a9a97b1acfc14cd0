//! Package prefixes declared in `package-info.java`.
//!
//! A package may rename its generated types by annotating its package
//! declaration:
//!
//! ```java
//! @ObjectiveCName("ACME")
//! package com.acme;
//!
//! import com.google.j2objc.annotations.ObjectiveCName;
//! ```
//!
//! Resolving annotation bindings is the expensive part, so only
//! annotations whose written simple name is `ObjectiveCName` are resolved
//! at all. The qualified type check then rejects unrelated annotations
//! that happen to share the name.

use crate::core::InputFile;
use crate::diagnostics::DiagnosticsSink;
use crate::io::SourceReader;
use crate::mapping::{prefix_conflict_message, MappingStore, PrefixRegistration};
use crate::syntax::{
    Annotation, BindingResolver, ConstantValue, ResolvedUnit, SourceParser,
    OBJECTIVE_C_NAME_ANNOTATION, OBJECTIVE_C_NAME_SIMPLE,
};

use super::{BatchSummary, FileFacts, FileFailure, FileResult};

/// A prefix annotation found on a package declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixDeclaration {
    /// The argument folded to this string
    Constant(String),
    /// The argument is missing or not a constant string
    Invalid,
}

/// Prefix annotations found in one package-info file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfoFacts {
    /// `None` when the file has no package declaration
    pub package: Option<String>,
    pub declarations: Vec<PrefixDeclaration>,
}

/// Collect the prefix declarations of a resolved package-info unit.
pub fn scan_package_annotations(resolved: &ResolvedUnit) -> PackageInfoFacts {
    let Some(package) = &resolved.unit().package else {
        return PackageInfoFacts::default();
    };
    let resolver = resolved.resolver();

    let declarations = package
        .annotations
        .iter()
        .filter(|annotation| annotation.simple_name() == OBJECTIVE_C_NAME_SIMPLE)
        .filter(|annotation| is_prefix_annotation(resolver, annotation))
        .map(|annotation| declared_prefix(resolver, annotation))
        .collect();

    PackageInfoFacts {
        package: Some(package.name.clone()),
        declarations,
    }
}

fn is_prefix_annotation(resolver: &dyn BindingResolver, annotation: &Annotation) -> bool {
    resolver.resolve_annotation_type(annotation).as_deref() == Some(OBJECTIVE_C_NAME_ANNOTATION)
}

fn declared_prefix(resolver: &dyn BindingResolver, annotation: &Annotation) -> PrefixDeclaration {
    annotation
        .single_value()
        .and_then(|value| resolver.resolve_constant(value))
        .and_then(ConstantValue::into_string)
        .map_or(PrefixDeclaration::Invalid, PrefixDeclaration::Constant)
}

pub(crate) fn extract_package_prefixes<P: SourceParser, R: SourceReader>(
    parser: &P,
    reader: &R,
    file: &InputFile,
) -> FileResult {
    let source = reader.read_source(file).map_err(FileFailure::Io)?;
    let resolved = parser
        .parse_with_bindings(file.unit_name(), &source)
        .ok_or(FileFailure::Parse)?;
    Ok(FileFacts::PackageInfo(scan_package_annotations(&resolved)))
}

pub(crate) fn apply_package_info(
    facts: PackageInfoFacts,
    file: &InputFile,
    store: &mut MappingStore,
    sink: &mut dyn DiagnosticsSink,
    summary: &mut BatchSummary,
) {
    let package = match facts.package {
        Some(package) if !facts.declarations.is_empty() => package,
        _ => {
            log::debug!("{}: no package prefix", file.unit_name());
            summary.no_annotation += 1;
            return;
        }
    };
    let location = file.path().display().to_string();

    for declaration in facts.declarations {
        let prefix = match declaration {
            PrefixDeclaration::Constant(prefix) => prefix,
            PrefixDeclaration::Invalid => {
                summary.invalid_prefixes += 1;
                sink.error(format!(
                    "Package {} has an invalid {} value in file {}",
                    package, OBJECTIVE_C_NAME_SIMPLE, location
                ));
                continue;
            }
        };

        match store.add_package_prefix(&package, &prefix) {
            PrefixRegistration::Registered => {
                log::debug!("Package {} is named {}", package, prefix);
                summary.prefixes_registered += 1;
            }
            PrefixRegistration::Unchanged => summary.prefixes_unchanged += 1,
            PrefixRegistration::Conflict { existing } => {
                summary.conflicts += 1;
                sink.error(prefix_conflict_message(&package, &prefix, &location, &existing));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::syntax::{AnnotationArguments, CompilationUnit, Expression, PackageDeclaration};
    use crate::testkit::{package_info_unit, MemorySourceReader, ScriptedParser};

    fn scan(parser: &ScriptedParser, unit_name: &str) -> PackageInfoFacts {
        let resolved = parser.parse_with_bindings(unit_name, "").unwrap();
        scan_package_annotations(&resolved)
    }

    #[test]
    fn test_scan_finds_prefix() {
        let parser = ScriptedParser::new()
            .with_unit("a/package-info.java", package_info_unit("com.acme", "ACMEFoo"));
        assert_eq!(
            scan(&parser, "a/package-info.java"),
            PackageInfoFacts {
                package: Some("com.acme".to_string()),
                declarations: vec![PrefixDeclaration::Constant("ACMEFoo".to_string())],
            }
        );
    }

    #[test]
    fn test_bindings_resolved_only_for_matching_names() {
        let package = PackageDeclaration::new("com.acme")
            .with_annotation(Annotation::new("Deprecated", AnnotationArguments::None))
            .with_annotation(Annotation::single("Generated", Expression::string("x")))
            .with_annotation(Annotation::single("ObjectiveCName", Expression::string("ACME")));
        let parser = ScriptedParser::new()
            .with_unit("a/package-info.java", CompilationUnit::new(Some(package)))
            .with_type("ObjectiveCName", OBJECTIVE_C_NAME_ANNOTATION);
        let counters = parser.counters();

        let facts = scan(&parser, "a/package-info.java");

        assert_eq!(
            facts.declarations,
            vec![PrefixDeclaration::Constant("ACME".to_string())]
        );
        assert_eq!(counters.type_resolutions(), 1);
    }

    #[test]
    fn test_same_named_unrelated_annotation_is_ignored() {
        let package = PackageDeclaration::new("com.acme").with_annotation(Annotation::single(
            "ObjectiveCName",
            Expression::string("Impostor"),
        ));
        let parser = ScriptedParser::new()
            .with_unit("a/package-info.java", CompilationUnit::new(Some(package)))
            .with_type("ObjectiveCName", "org.other.ObjectiveCName");

        let facts = scan(&parser, "a/package-info.java");
        assert_eq!(facts.package.as_deref(), Some("com.acme"));
        assert!(facts.declarations.is_empty());
    }

    #[test]
    fn test_non_constant_value_is_invalid() {
        let package = PackageDeclaration::new("com.acme").with_annotation(Annotation::single(
            OBJECTIVE_C_NAME_ANNOTATION,
            Expression::Name("Names.ACME".to_string()),
        ));
        let parser = ScriptedParser::new()
            .with_unit("a/package-info.java", CompilationUnit::new(Some(package)));

        let facts = scan(&parser, "a/package-info.java");
        assert_eq!(facts.declarations, vec![PrefixDeclaration::Invalid]);
    }

    #[test]
    fn test_no_package_declaration() {
        let parser = ScriptedParser::new()
            .with_unit("package-info.java", CompilationUnit::default());
        assert_eq!(scan(&parser, "package-info.java"), PackageInfoFacts::default());
    }

    #[test]
    fn test_apply_states() {
        let mut store = MappingStore::new();
        let mut diagnostics = Diagnostics::new();
        let mut summary = BatchSummary::default();
        let first = InputFile::new("a/package-info.java", "a/package-info.java");
        let second = InputFile::new("b/package-info.java", "b/package-info.java");
        let facts = |prefix: &str| PackageInfoFacts {
            package: Some("com.acme".to_string()),
            declarations: vec![PrefixDeclaration::Constant(prefix.to_string())],
        };

        apply_package_info(facts("ACMEFoo"), &first, &mut store, &mut diagnostics, &mut summary);
        apply_package_info(facts("ACMEFoo"), &first, &mut store, &mut diagnostics, &mut summary);
        apply_package_info(facts("ACMEBar"), &second, &mut store, &mut diagnostics, &mut summary);
        apply_package_info(
            PackageInfoFacts::default(),
            &second,
            &mut store,
            &mut diagnostics,
            &mut summary,
        );

        assert_eq!(store.package_prefix("com.acme"), Some("ACMEFoo"));
        assert_eq!(summary.prefixes_registered, 1);
        assert_eq!(summary.prefixes_unchanged, 1);
        assert_eq!(summary.conflicts, 1);
        assert_eq!(summary.no_annotation, 1);
        assert_eq!(
            diagnostics.errors(),
            ["Package com.acme has name ACMEBar defined in file b/package-info.java, \
              but is already named ACMEFoo"]
        );
    }

    #[test]
    fn test_apply_invalid_value() {
        let mut store = MappingStore::new();
        let mut diagnostics = Diagnostics::new();
        let mut summary = BatchSummary::default();
        let file = InputFile::new("a/package-info.java", "src/a/package-info.java");

        apply_package_info(
            PackageInfoFacts {
                package: Some("com.acme".to_string()),
                declarations: vec![PrefixDeclaration::Invalid],
            },
            &file,
            &mut store,
            &mut diagnostics,
            &mut summary,
        );

        assert!(store.package_prefixes().is_empty());
        assert_eq!(summary.invalid_prefixes, 1);
        assert_eq!(
            diagnostics.errors(),
            ["Package com.acme has an invalid ObjectiveCName value in file src/a/package-info.java"]
        );
    }

    #[test]
    fn test_extract_reads_and_parses_with_bindings() {
        let file = InputFile::new("com/acme/package-info.java", "src/package-info.java");
        let parser = ScriptedParser::new()
            .with_unit("com/acme/package-info.java", package_info_unit("com.acme", "X"));
        let counters = parser.counters();
        let reader = MemorySourceReader::new().with_file("src/package-info.java", "");

        let result = extract_package_prefixes(&parser, &reader, &file);
        assert!(matches!(result, Ok(FileFacts::PackageInfo(_))));
        assert_eq!(counters.binding_parses(), 1);
        assert_eq!(counters.syntax_only_parses(), 0);
    }
}
