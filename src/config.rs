//! Harness configuration
//!
//! Runtime settings loaded from a JSON file so fixture location, case
//! filtering and diagnostic verbosity can change without recompiling. CLI
//! flags override whatever the file provides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fixtures::DEFAULT_FIXTURE_PATH;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "conformance.json";

/// Complete harness configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Fixture document to replay
    pub fixtures_path: PathBuf,
    /// Only run cases whose name contains this substring
    pub filter: Option<String>,
    /// Maximum diff lines kept per failing case
    pub max_diagnostics: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fixtures_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
            filter: None,
            max_diagnostics: 32,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults when the file is missing or
    /// its JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load `conformance.json` from the working directory.
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert!(config.fixtures_path.ends_with("fixtures/conformance_tests.json"));
        assert_eq!(config.filter, None);
        assert_eq!(config.max_diagnostics, 32);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"filter\": \"widget\"}}").unwrap();
        let config = HarnessConfig::load_from_file(file.path());
        assert_eq!(config.filter.as_deref(), Some("widget"));
        assert_eq!(config.max_diagnostics, 32);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_eq!(
            HarnessConfig::load_from_file(file.path()),
            HarnessConfig::default()
        );
        assert_eq!(
            HarnessConfig::load_from_file("/missing/conformance.json"),
            HarnessConfig::default()
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let config = HarnessConfig {
            fixtures_path: PathBuf::from("tests.json"),
            filter: Some("mirror".into()),
            max_diagnostics: 4,
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: HarnessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
