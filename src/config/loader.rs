use std::fs;
use std::path::Path;

use super::PreprocessConfig;
use crate::errors::{PreprocessError, Result};

/// Pure function to parse and validate config from a TOML string.
///
/// Settings may sit under a `[preprocess]` table or at the top level.
pub(crate) fn parse_and_validate_config(contents: &str) -> Result<PreprocessConfig> {
    let mut table = toml::from_str::<toml::Table>(contents)
        .map_err(|e| PreprocessError::config(format!("Failed to parse config: {}", e)))?;

    let section = match table.remove("preprocess") {
        Some(section) => section,
        None => toml::Value::Table(table),
    };
    let config: PreprocessConfig = section
        .try_into()
        .map_err(|e| PreprocessError::config(format!("Invalid preprocess settings: {}", e)))?;

    config.validate()?;
    Ok(config)
}

/// Read and parse a config file from disk
pub(crate) fn load_config_from_path(path: &Path) -> Result<PreprocessConfig> {
    let contents = fs::read_to_string(path).map_err(|e| PreprocessError::io(path, e))?;
    let config = parse_and_validate_config(&contents)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    #[test]
    fn test_parse_sectioned_config() {
        let config = parse_and_validate_config(indoc! {r#"
            [preprocess]
            map_headers = true
            header_suffix = ".hpp"

            [preprocess.parallel]
            enabled = false
        "#})
        .unwrap();

        assert!(config.map_headers);
        assert_eq!(config.header_suffix, ".hpp");
        assert!(!config.parallel.enabled);
    }

    #[test]
    fn test_parse_flat_config() {
        let config = parse_and_validate_config("map_headers = true\n").unwrap();
        assert!(config.map_headers);
        assert_eq!(config.header_suffix, ".h");
        assert!(!config.report_parse_failures);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_and_validate_config("").unwrap();
        assert_eq!(config, PreprocessConfig::default());
    }

    #[test]
    fn test_wrong_type_in_section_is_rejected() {
        let err = parse_and_validate_config("[preprocess]\nmap_headers = \"yes\"\n").unwrap_err();
        assert!(matches!(err, PreprocessError::Config(_)));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_and_validate_config("map_headers = ").unwrap_err();
        assert!(matches!(err, PreprocessError::Config(_)));
    }

    #[test]
    fn test_validation_rejects_empty_suffix() {
        let err = parse_and_validate_config("header_suffix = \"\"").unwrap_err();
        assert!(err.to_string().contains("header_suffix"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from_path(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "report_parse_failures = true").unwrap();
        let config = load_config_from_path(file.path()).unwrap();
        assert!(config.report_parse_failures);
    }
}
