// Per-case conformance error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Conformance error code constants
///
/// Error code range: 3001-3008
pub struct ConformanceErrorCodes {}

impl ConformanceErrorCodes {
    /// No descriptor is registered under the requested name
    pub const UNKNOWN_TYPE: i32 = 3001;

    /// Raw JSON value does not match the declared descriptor
    pub const COERCION: i32 = 3002;

    /// Raw string is not a symbol of the declared enumeration
    pub const UNKNOWN_ENUM_SYMBOL: i32 = 3003;

    /// Fixture method name does not resolve to a client member
    pub const METHOD_NOT_FOUND: i32 = 3004;

    /// Fixture request key does not resolve to a declared parameter
    pub const UNKNOWN_PARAMETER: i32 = 3005;

    /// The client call itself raised a fault
    pub const CALL_FAILURE: i32 = 3006;

    /// Returned value differs from the fixture expectation
    pub const ASSERTION_MISMATCH: i32 = 3007;

    /// Descriptor set violates a registry invariant
    pub const INVALID_DESCRIPTOR: i32 = 3008;
}

/// Log a conformance error with structured context
///
/// Logs the error code, the component that raised it and the human-readable
/// message. `context` is usually the test case name.
pub fn log_conformance_error(err: &ConformanceError, context: &str) {
    error!(
        "Conformance error in {}: code={}, component={}, message={}",
        context,
        err.code(),
        err.component(),
        err.message()
    );
}

/// Errors that fail a single test case
///
/// Every variant is recovered at the per-case boundary; none of them aborts
/// the run.
#[derive(Debug, Clone, PartialEq)]
pub enum ConformanceError {
    /// Registry miss
    UnknownType { name: String },

    /// Raw value shape does not match the declared descriptor
    Coercion {
        path: String,
        descriptor: String,
        reason: String,
    },

    /// String value is not one of the enum's wire names
    UnknownEnumSymbol {
        path: String,
        enum_name: String,
        symbol: String,
    },

    /// No invocable member matches the fixture method
    MethodNotFound { method: String, tried: Vec<String> },

    /// Fixture request names a parameter the method does not declare
    UnknownParameter { method: String, parameter: String },

    /// The invocation raised a fault instead of returning a result
    CallFailure { method: String, details: String },

    /// Whole-value inequality after a successful call
    AssertionMismatch { expected: String, actual: String },

    /// Descriptor set rejected at registration
    InvalidDescriptor { name: String, reason: String },
}

impl ConformanceError {
    /// Component that raised the error, used in structured logs.
    pub fn component(&self) -> &'static str {
        match self {
            ConformanceError::UnknownType { .. } | ConformanceError::InvalidDescriptor { .. } => {
                "TypeRegistry"
            }
            ConformanceError::Coercion { .. } | ConformanceError::UnknownEnumSymbol { .. } => {
                "Coercer"
            }
            ConformanceError::MethodNotFound { .. } | ConformanceError::UnknownParameter { .. } => {
                "MethodResolver"
            }
            ConformanceError::CallFailure { .. } => "ServiceClient",
            ConformanceError::AssertionMismatch { .. } => "Comparator",
        }
    }

    pub(crate) fn coercion(
        path: &str,
        descriptor: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConformanceError::Coercion {
            path: path.to_string(),
            descriptor: descriptor.into(),
            reason: reason.into(),
        }
    }
}

impl ErrorCode for ConformanceError {
    fn code(&self) -> i32 {
        match self {
            ConformanceError::UnknownType { .. } => ConformanceErrorCodes::UNKNOWN_TYPE,
            ConformanceError::Coercion { .. } => ConformanceErrorCodes::COERCION,
            ConformanceError::UnknownEnumSymbol { .. } => {
                ConformanceErrorCodes::UNKNOWN_ENUM_SYMBOL
            }
            ConformanceError::MethodNotFound { .. } => ConformanceErrorCodes::METHOD_NOT_FOUND,
            ConformanceError::UnknownParameter { .. } => ConformanceErrorCodes::UNKNOWN_PARAMETER,
            ConformanceError::CallFailure { .. } => ConformanceErrorCodes::CALL_FAILURE,
            ConformanceError::AssertionMismatch { .. } => {
                ConformanceErrorCodes::ASSERTION_MISMATCH
            }
            ConformanceError::InvalidDescriptor { .. } => {
                ConformanceErrorCodes::INVALID_DESCRIPTOR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ConformanceError::UnknownType { name } => {
                format!("no type descriptor registered as \"{}\"", name)
            }
            ConformanceError::Coercion {
                path,
                descriptor,
                reason,
            } => format!("cannot coerce {} to {}: {}", path, descriptor, reason),
            ConformanceError::UnknownEnumSymbol {
                path,
                enum_name,
                symbol,
            } => format!("{}: \"{}\" is not a symbol of enum {}", path, symbol, enum_name),
            ConformanceError::MethodNotFound { method, tried } => {
                format!("method not found: \"{}\" (tried {})", method, tried.join(", "))
            }
            ConformanceError::UnknownParameter { method, parameter } => format!(
                "method \"{}\" does not expect parameter: \"{}\"",
                method, parameter
            ),
            ConformanceError::CallFailure { method, details } => {
                format!("method \"{}\" call failed: {}", method, details)
            }
            ConformanceError::AssertionMismatch { expected, actual } => {
                format!("expected {} but got {}", expected, actual)
            }
            ConformanceError::InvalidDescriptor { name, reason } => {
                format!("invalid descriptor {}: {}", name, reason)
            }
        }
    }
}

impl fmt::Display for ConformanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message(), self.code())
    }
}

impl std::error::Error for ConformanceError {}
