//! The two cross-file lookup tables built during preprocessing.
//!
//! The store is owned by the caller and passed into the preprocessor by
//! mutable reference. It is only complete once a whole batch has been
//! processed; later translation stages read it afterwards.

pub mod properties;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fully-qualified type name to generated header path.
pub type HeaderMappings = BTreeMap<String, String>;

/// Package name to declared output-name prefix.
pub type PackagePrefixes = BTreeMap<String, String>;

/// Outcome of offering a package prefix to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixRegistration {
    /// First value for this package; it is now recorded.
    Registered,
    /// The package already has exactly this value.
    Unchanged,
    /// The package already has a different value, which is kept.
    Conflict { existing: String },
}

/// Header mappings and package prefixes for one translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingStore {
    header_mappings: HeaderMappings,
    package_prefixes: PackagePrefixes,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where a type's header is generated. Returns the previous
    /// path, if the type was already mapped.
    pub fn add_header_mapping(
        &mut self,
        qualified_name: impl Into<String>,
        header_path: impl Into<String>,
    ) -> Option<String> {
        self.header_mappings
            .insert(qualified_name.into(), header_path.into())
    }

    pub fn header_mapping(&self, qualified_name: &str) -> Option<&str> {
        self.header_mappings.get(qualified_name).map(String::as_str)
    }

    pub fn header_mappings(&self) -> &HeaderMappings {
        &self.header_mappings
    }

    /// Offer a prefix for a package. The first value registered for a
    /// package is never replaced.
    pub fn add_package_prefix(&mut self, package: &str, prefix: &str) -> PrefixRegistration {
        match self.package_prefixes.get(package) {
            None => {
                self.package_prefixes
                    .insert(package.to_string(), prefix.to_string());
                PrefixRegistration::Registered
            }
            Some(existing) if existing == prefix => PrefixRegistration::Unchanged,
            Some(existing) => PrefixRegistration::Conflict {
                existing: existing.clone(),
            },
        }
    }

    pub fn package_prefix(&self, package: &str) -> Option<&str> {
        self.package_prefixes.get(package).map(String::as_str)
    }

    pub fn package_prefixes(&self) -> &PackagePrefixes {
        &self.package_prefixes
    }

    pub fn is_empty(&self) -> bool {
        self.header_mappings.is_empty() && self.package_prefixes.is_empty()
    }
}

/// Diagnostic text for a rejected prefix declaration.
pub fn prefix_conflict_message(
    package: &str,
    prefix: &str,
    location: &str,
    existing: &str,
) -> String {
    format!(
        "Package {} has name {} defined in file {}, but is already named {}",
        package, prefix, location, existing
    )
}
