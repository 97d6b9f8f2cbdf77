//! Fixture documents describing conformance test cases.
//!
//! A fixture file is `{"tests": [...]}` where each case names a method, its
//! request arguments in fixture order, and optionally the expected response
//! payload or expected error. Unknown keys are ignored at every level. The
//! document is parsed once per run and never mutated afterwards.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FixtureError;

/// Default fixture location bundled with the crate sources.
pub const DEFAULT_FIXTURE_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/conformance_tests.json");

/// One named conformance case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(rename = "test")]
    pub name: String,
    pub method: String,
    /// Raw arguments keyed by fixture parameter name, in fixture order.
    #[serde(default)]
    pub request: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// What a case asserts about the call result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expectation<'a> {
    Response(&'a Value),
    Error(&'a Value),
    /// Nothing stated: the call must succeed with an empty value.
    Empty,
}

impl TestCase {
    pub fn expectation(&self) -> Expectation<'_> {
        match (&self.response, &self.error) {
            (_, Some(error)) => Expectation::Error(error),
            (Some(response), None) => Expectation::Response(response),
            (None, None) => Expectation::Empty,
        }
    }

    fn validate(&self, index: usize) -> Result<(), FixtureError> {
        if self.name.trim().is_empty() {
            return Err(structure_error(format!("test #{index} has an empty name")));
        }
        if self.method.trim().is_empty() {
            return Err(structure_error(format!(
                "test {} has an empty method name",
                self.name
            )));
        }
        if self.response.is_some() && self.error.is_some() {
            return Err(structure_error(format!(
                "test {} declares both a response and an error",
                self.name
            )));
        }
        Ok(())
    }
}

/// Ordered sequence of test cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDocument {
    pub tests: Vec<TestCase>,
}

impl FixtureDocument {
    /// Read and validate a fixture file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| FixtureError::Io {
            path: path.display().to_string(),
            details: err.to_string(),
        })?;
        let document = Self::from_json(&contents)?;
        log::info!(
            "[Fixtures] Loaded {} tests from {:?}",
            document.tests.len(),
            path
        );
        Ok(document)
    }

    /// Parse fixture contents from JSON and validate invariants.
    pub fn from_json(data: &str) -> Result<Self, FixtureError> {
        let document: FixtureDocument = serde_json::from_str(data)?;
        for (index, case) in document.tests.iter().enumerate() {
            case.validate(index)?;
        }
        Ok(document)
    }

    /// Cases whose name contains `needle`; all cases when `needle` is `None`.
    pub fn filtered(&self, needle: Option<&str>) -> Vec<&TestCase> {
        self.tests
            .iter()
            .filter(|case| needle.map_or(true, |needle| case.name.contains(needle)))
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&TestCase> {
        self.tests.iter().find(|case| case.name == name)
    }
}

fn structure_error(reason: impl Into<String>) -> FixtureError {
    FixtureError::Structure {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, FixtureErrorCodes};

    fn sample_json() -> String {
        serde_json::json!({
            "generator": "ignored",
            "tests": [
                {"test": "t1", "method": "GetWidget", "request": {"id": "abc"}},
                {
                    "test": "t2",
                    "method": "getWidget",
                    "request": {"zeta": 1, "alpha": 2},
                    "response": {"widget": {"id": "1"}}
                },
                {"test": "t3", "method": "deleteWidget", "error": {"code": "NotFound"}}
            ]
        })
        .to_string()
    }

    #[test]
    fn parses_cases_and_expectations() {
        let document = FixtureDocument::from_json(&sample_json()).unwrap();
        assert_eq!(document.tests.len(), 3);
        assert_eq!(document.tests[0].expectation(), Expectation::Empty);
        assert!(matches!(
            document.tests[1].expectation(),
            Expectation::Response(_)
        ));
        assert!(matches!(document.tests[2].expectation(), Expectation::Error(_)));
        assert!(document.tests[2].request.is_empty());
    }

    #[test]
    fn request_keeps_fixture_order() {
        let document = FixtureDocument::from_json(&sample_json()).unwrap();
        let keys: Vec<_> = document.tests[1].request.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn rejects_missing_tests_array() {
        let err = FixtureDocument::from_json("{\"cases\": []}").unwrap_err();
        assert_eq!(err.code(), FixtureErrorCodes::STRUCTURE);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = FixtureDocument::from_json("{\"tests\": [").unwrap_err();
        assert_eq!(err.code(), FixtureErrorCodes::PARSE);
    }

    #[test]
    fn rejects_cases_with_both_expectations() {
        let json = serde_json::json!({
            "tests": [{
                "test": "both",
                "method": "getWidget",
                "request": {},
                "response": {},
                "error": {"code": "NotFound"}
            }]
        })
        .to_string();
        let err = FixtureDocument::from_json(&json).unwrap_err();
        match err {
            FixtureError::Structure { reason } => assert!(reason.contains("both")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn filter_matches_substrings() {
        let document = FixtureDocument::from_json(&sample_json()).unwrap();
        assert_eq!(document.filtered(None).len(), 3);
        assert_eq!(document.filtered(Some("t2")).len(), 1);
        assert!(document.filtered(Some("nope")).is_empty());
        assert_eq!(document.find("t3").unwrap().method, "deleteWidget");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = FixtureDocument::load("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.code(), FixtureErrorCodes::IO);
    }
}
