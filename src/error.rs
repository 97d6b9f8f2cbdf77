// Error types for the conformance harness
//
// This module defines the per-case error taxonomy recovered at the test-case
// boundary and the run-fatal fixture errors, both carrying numeric codes for
// structured reporting.

mod conformance;
mod fixture;

pub use conformance::{log_conformance_error, ConformanceError, ConformanceErrorCodes};
pub use fixture::{log_fixture_error, FixtureError, FixtureErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting in logs and in
/// the JSON run report.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
