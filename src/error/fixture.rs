// Fixture-file error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Fixture error code constants
///
/// Error code range: 4001-4003
pub struct FixtureErrorCodes {}

impl FixtureErrorCodes {
    /// Fixture file could not be read
    pub const IO: i32 = 4001;

    /// Fixture file is not valid JSON
    pub const PARSE: i32 = 4002;

    /// Fixture JSON lacks the required top-level structure
    pub const STRUCTURE: i32 = 4003;
}

/// Log a fixture error with structured context
pub fn log_fixture_error(err: &FixtureError, context: &str) {
    error!(
        "Fixture error in {}: code={}, component=FixtureLoader, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors fatal to a whole run
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureError {
    /// Reading the fixture file failed
    Io { path: String, details: String },

    /// Fixture contents are not valid JSON
    Parse { details: String },

    /// Valid JSON without the expected shape
    Structure { reason: String },
}

impl ErrorCode for FixtureError {
    fn code(&self) -> i32 {
        match self {
            FixtureError::Io { .. } => FixtureErrorCodes::IO,
            FixtureError::Parse { .. } => FixtureErrorCodes::PARSE,
            FixtureError::Structure { .. } => FixtureErrorCodes::STRUCTURE,
        }
    }

    fn message(&self) -> String {
        match self {
            FixtureError::Io { path, details } => {
                format!("failed to read fixture file {}: {}", path, details)
            }
            FixtureError::Parse { details } => {
                format!("failed to parse fixture JSON: {}", details)
            }
            FixtureError::Structure { reason } => format!("malformed fixture document: {}", reason),
        }
    }
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message(), self.code())
    }
}

impl std::error::Error for FixtureError {}

impl From<serde_json::Error> for FixtureError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => FixtureError::Structure {
                reason: err.to_string(),
            },
            _ => FixtureError::Parse {
                details: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_errors_are_classified() {
        let syntax = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert_eq!(FixtureError::from(syntax).code(), FixtureErrorCodes::PARSE);

        let data = serde_json::from_str::<Vec<String>>("{\"tests\": 1}").unwrap_err();
        assert_eq!(FixtureError::from(data).code(), FixtureErrorCodes::STRUCTURE);
    }
}
