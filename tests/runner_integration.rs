use std::io::Write;

use facility_conformance::demo::ConformanceApiClient;
use facility_conformance::error::{ConformanceErrorCodes, FixtureErrorCodes};
use facility_conformance::fixtures::DEFAULT_FIXTURE_PATH;
use facility_conformance::{
    ConformanceRunner, ErrorCode, FixtureDocument, HarnessConfig, TestCase, Verdict,
};
use serde_json::json;

fn client() -> ConformanceApiClient {
    ConformanceApiClient::new().expect("demo client descriptors are valid")
}

fn case(value: serde_json::Value) -> TestCase {
    serde_json::from_value(value).expect("test case JSON")
}

#[test]
fn bundled_fixtures_all_pass() {
    let client = client();
    let runner = ConformanceRunner::new(&client, &HarnessConfig::default());
    let report = runner
        .run_path(DEFAULT_FIXTURE_PATH)
        .expect("bundled fixtures load");
    let failures: Vec<_> = report.failures().collect();
    assert!(failures.is_empty(), "unexpected failures: {failures:#?}");
    assert!(report.is_success());
    assert_eq!(report.exit_status(), 0);
    assert_eq!(report.summary_lines().last().map(String::as_str), Some("SUCCESS"));
}

#[test]
fn escaped_parameters_resolve_from_plain_keys() {
    let client = client();
    let runner = ConformanceRunner::new(&client, &HarnessConfig::default());
    let outcome = runner.run_case(&case(json!({
        "test": "delete",
        "method": "DeleteWidget",
        "request": {"id": "1"}
    })));
    assert_eq!(outcome.verdict, Verdict::Passed, "{outcome:?}");
}

#[test]
fn unknown_enum_symbol_fails_the_case() {
    let client = client();
    let runner = ConformanceRunner::new(&client, &HarnessConfig::default());
    let outcome = runner.run_case(&case(json!({
        "test": "badEnum",
        "method": "checkQuery",
        "request": {"enum": "perhaps"}
    })));
    assert_eq!(
        outcome.error_code,
        Some(ConformanceErrorCodes::UNKNOWN_ENUM_SYMBOL)
    );
}

#[test]
fn wrong_expected_error_is_reported_by_path() {
    let client = client();
    let runner = ConformanceRunner::new(&client, &HarnessConfig::default());
    let outcome = runner.run_case(&case(json!({
        "test": "wrongCode",
        "method": "getWidget",
        "request": {"id": "42"},
        "error": {"code": "Conflict", "message": "Widget 42 not found."}
    })));
    assert_eq!(outcome.verdict, Verdict::Failed);
    assert!(outcome
        .diagnostics
        .contains(&"error.code expected: \"Conflict\" actual: \"NotFound\"".to_string()));
}

#[test]
fn mismatched_response_lists_nested_paths() {
    let client = client();
    let runner = ConformanceRunner::new(&client, &HarnessConfig::default());
    let outcome = runner.run_case(&case(json!({
        "test": "wrongName",
        "method": "getWidget",
        "request": {"id": "1"},
        "response": {"widget": {"id": "1", "name": "boot", "price": 9.99}, "eTag": "\"1\""}
    })));
    assert_eq!(outcome.verdict, Verdict::Failed);
    assert_eq!(
        outcome.diagnostics.last().map(String::as_str),
        Some("value.widget.name expected: \"boot\" actual: \"shoe\"")
    );
}

#[test]
fn failing_cases_do_not_stop_the_run() {
    let client = client();
    let runner = ConformanceRunner::new(&client, &HarnessConfig::default());
    let document = FixtureDocument::from_json(
        &json!({"tests": [
            {"test": "a", "method": "noSuchMethod"},
            {"test": "b", "method": "getApiInfo", "request": {"verbose": true}},
            {"test": "c", "method": "deleteWidget", "request": {"id": "2"}}
        ]})
        .to_string(),
    )
    .expect("fixture JSON");
    let report = runner.run(&document);
    assert_eq!((report.passed, report.failed), (1, 2));
    assert_eq!(
        report.outcomes[0].error_code,
        Some(ConformanceErrorCodes::METHOD_NOT_FOUND)
    );
    assert_eq!(
        report.outcomes[1].error_code,
        Some(ConformanceErrorCodes::UNKNOWN_PARAMETER)
    );
    assert_eq!(report.exit_status(), 2);
}

#[test]
fn malformed_fixture_file_aborts_the_run() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "{{\"tests\": {{}}}}").expect("write fixture");
    let client = client();
    let runner = ConformanceRunner::new(&client, &HarnessConfig::default());
    let err = runner.run_path(file.path()).unwrap_err();
    assert_eq!(err.code(), FixtureErrorCodes::STRUCTURE);
}
