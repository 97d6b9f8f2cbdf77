// Facility Conformance - API conformance engine
// Replays JSON fixture cases against a generated client and reports verdicts

// Module declarations
pub mod client;
pub mod coerce;
pub mod compare;
pub mod config;
pub mod demo;
pub mod error;
pub mod fixtures;
pub mod naming;
pub mod report;
pub mod runner;
pub mod types;

// Re-exports for convenience
pub use client::{
    Argument, BoundArguments, CallFailure, MethodDescriptor, ParameterSlot, ServiceClient,
    ServiceError, ServiceResult,
};
pub use coerce::Coercer;
pub use config::HarnessConfig;
pub use error::{ConformanceError, ErrorCode, FixtureError};
pub use fixtures::{FixtureDocument, TestCase};
pub use report::{CaseOutcome, ConformanceReport, Verdict};
pub use runner::ConformanceRunner;
pub use types::{TypeDescriptor, TypeRegistry, TypedValue};

use tracing::Level;

/// Install a stderr `tracing` subscriber that also captures `log` records.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
