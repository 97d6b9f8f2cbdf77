//! Demo conformance service
//!
//! A deterministic in-process client for the conformance API, used by the
//! `conformance` binary and the integration tests in place of a transport.

pub mod service;
pub mod types;

pub use service::{ConformanceApiClient, ErrorCodes, SERVICE_NAME, SERVICE_VERSION};
