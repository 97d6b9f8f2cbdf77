//! Conformance runner.
//!
//! Drives each fixture case through resolve → coerce → invoke → verify and
//! accumulates verdicts into a [`ConformanceReport`]. Every per-case failure
//! is recovered at the case boundary; only loading the fixture document can
//! abort a run.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use serde_json::Value;

use crate::client::{Argument, BoundArguments, MethodDescriptor, ServiceClient, ServiceResult};
use crate::coerce::{Coercer, ROOT_PATH};
use crate::compare::diff;
use crate::config::HarnessConfig;
use crate::error::{log_conformance_error, ConformanceError, ErrorCode, FixtureError};
use crate::fixtures::{Expectation, FixtureDocument, TestCase};
use crate::naming::MethodResolver;
use crate::report::{CaseOutcome, ConformanceReport};
use crate::types::{RecordValue, TypedValue};

/// Why a case failed, plus the field-level diff lines explaining it.
#[derive(Debug)]
struct CaseFailure {
    error: ConformanceError,
    diffs: Vec<String>,
}

impl From<ConformanceError> for CaseFailure {
    fn from(error: ConformanceError) -> Self {
        Self {
            error,
            diffs: Vec::new(),
        }
    }
}

pub struct ConformanceRunner<'c, C: ServiceClient> {
    client: &'c C,
    resolver: MethodResolver<'c>,
    coercer: Coercer<'c>,
    filter: Option<String>,
    max_diagnostics: usize,
}

impl<'c, C: ServiceClient> ConformanceRunner<'c, C> {
    pub fn new(client: &'c C, config: &HarnessConfig) -> Self {
        Self {
            client,
            resolver: MethodResolver::new(client.methods()),
            coercer: Coercer::new(client.types()),
            filter: config.filter.clone(),
            max_diagnostics: config.max_diagnostics,
        }
    }

    /// Load a fixture file and run every selected case.
    pub fn run_path<P: AsRef<Path>>(&self, path: P) -> Result<ConformanceReport, FixtureError> {
        let document = FixtureDocument::load(path)?;
        Ok(self.run(&document))
    }

    /// Run every case selected by the configured filter, in fixture order.
    pub fn run(&self, document: &FixtureDocument) -> ConformanceReport {
        let mut report = ConformanceReport::new();
        for case in document.filtered(self.filter.as_deref()) {
            report.record(self.run_case(case));
        }
        tracing::info!("passed: {}", report.passed);
        tracing::info!("failed: {}", report.failed);
        if report.is_success() {
            tracing::info!("SUCCESS");
        }
        report
    }

    /// Run one case to a terminal verdict.
    pub fn run_case(&self, case: &TestCase) -> CaseOutcome {
        tracing::info!("testing {}", case.name);
        match self.evaluate(case) {
            Ok(()) => CaseOutcome::passed(&case.name),
            Err(failure) => {
                log_conformance_error(&failure.error, &case.name);
                for line in &failure.diffs {
                    tracing::error!("{}: {}", case.name, line);
                }
                let mut diagnostics = Vec::with_capacity(failure.diffs.len() + 1);
                diagnostics.push(failure.error.message());
                diagnostics.extend(failure.diffs);
                CaseOutcome::failed(&case.name, failure.error.code(), diagnostics)
            }
        }
    }

    fn evaluate(&self, case: &TestCase) -> Result<(), CaseFailure> {
        let method = self.resolver.resolve_method(&case.method)?;
        let arguments = self.bind_arguments(method, case)?;
        let result = self.invoke(method, &arguments)?;
        self.verify(case, &result)
    }

    /// Resolve every requested parameter, then coerce the raw values.
    fn bind_arguments(
        &self,
        method: &'c MethodDescriptor,
        case: &TestCase,
    ) -> Result<BoundArguments, ConformanceError> {
        let slots = case
            .request
            .iter()
            .map(|(key, raw)| {
                self.resolver
                    .resolve_parameter(method, key)
                    .map(|slot| (slot, raw))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut arguments = BoundArguments::new();
        for (slot, raw) in slots {
            let path = format!("{ROOT_PATH}.{}", slot.name);
            let argument = match self.coercer.coerce_optional(raw, &slot.descriptor, &path)? {
                Some(value) => Argument::Value(value),
                None => Argument::NoValue,
            };
            arguments.bind(&slot.name, argument);
        }
        for slot in &method.parameters {
            if !arguments.is_bound(&slot.name) && !slot.has_default {
                arguments.bind(&slot.name, Argument::NoValue);
            }
        }
        Ok(arguments)
    }

    fn invoke(
        &self,
        method: &MethodDescriptor,
        arguments: &BoundArguments,
    ) -> Result<ServiceResult, ConformanceError> {
        let call = panic::catch_unwind(AssertUnwindSafe(|| self.client.invoke(method, arguments)));
        let details = match call {
            Ok(Ok(result)) => return Ok(result),
            Ok(Err(failure)) => failure.details,
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };
        Err(ConformanceError::CallFailure {
            method: method.name.clone(),
            details,
        })
    }

    fn verify(&self, case: &TestCase, result: &ServiceResult) -> Result<(), CaseFailure> {
        match (case.expectation(), result) {
            (Expectation::Error(expected), ServiceResult::Error(actual)) => {
                let error_record = self.client.types().error_record();
                let expected = self.coercer.coerce_record(expected, error_record)?;
                let actual = self.coercer.coerce_record(&actual.to_wire(), error_record)?;
                self.compare(
                    "error",
                    &TypedValue::Record(expected),
                    &TypedValue::Record(actual),
                )
            }
            (Expectation::Error(expected), ServiceResult::Value(actual)) => Err(unexpected(
                format!("error {expected}"),
                format!("value {}", actual.repr()),
            )),
            (Expectation::Response(expected), ServiceResult::Value(actual)) => {
                let expected = self.expected_like(expected, actual)?;
                self.compare("value", &expected, actual)
            }
            (Expectation::Response(_), ServiceResult::Error(actual)) => Err(unexpected(
                "a success value".to_string(),
                format!("error {}", actual.to_wire()),
            )),
            (Expectation::Empty, ServiceResult::Value(actual)) => match actual {
                TypedValue::Record(record) if !record.is_empty() => {
                    self.compare("value", &TypedValue::Record(blank_like(record)), actual)
                }
                TypedValue::Record(_) => Ok(()),
                other => Err(unexpected(
                    "an empty success value".to_string(),
                    format!("value {}", other.repr()),
                )),
            },
            (Expectation::Empty, ServiceResult::Error(actual)) => Err(unexpected(
                "an empty success value".to_string(),
                format!("error {}", actual.to_wire()),
            )),
        }
    }

    /// Coerce the expected payload with the actual value's own record type.
    fn expected_like(
        &self,
        expected: &Value,
        actual: &TypedValue,
    ) -> Result<TypedValue, ConformanceError> {
        match actual {
            TypedValue::Record(record) => {
                let descriptor = self.client.types().record(&record.type_name)?;
                self.coercer
                    .coerce_record(expected, descriptor)
                    .map(TypedValue::Record)
            }
            _ => Ok(TypedValue::Json(expected.clone())),
        }
    }

    fn compare(
        &self,
        root: &str,
        expected: &TypedValue,
        actual: &TypedValue,
    ) -> Result<(), CaseFailure> {
        if expected.to_wire() == actual.to_wire() {
            return Ok(());
        }
        let diffs = diff(root, expected, actual)
            .take(self.max_diagnostics)
            .map(|entry| entry.to_string())
            .collect();
        Err(CaseFailure {
            error: ConformanceError::AssertionMismatch {
                expected: expected.repr(),
                actual: actual.repr(),
            },
            diffs,
        })
    }
}

/// All fields of `record` unset.
fn blank_like(record: &RecordValue) -> RecordValue {
    let mut blank = record.clone();
    blank.fields.iter_mut().for_each(|field| field.value = None);
    blank
}

fn unexpected(expected: String, actual: String) -> CaseFailure {
    CaseFailure::from(ConformanceError::AssertionMismatch { expected, actual })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
