use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use edaa_reports_core::dialect::osvvm::{self, OsvvmReport, DEFAULT_BUILD_NAME};
use edaa_reports_core::dialect::DialectReport;
use edaa_reports_core::unittest::Entity;
use edaa_reports_core::{
    AdapterRegistry, Config, Dialect, TestcaseStatus, TestsuiteStatus, TestsuiteSummary,
    UnittestError,
};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/osvvm.yml")
}

fn read(content: &[u8]) -> Result<TestsuiteSummary, UnittestError> {
    let adapter = AdapterRegistry::new().adapter(Dialect::OsvvmYaml)?;
    let report = adapter.parse(Path::new("build.yml"), content)?;
    adapter.to_testsuite_summary(&report)
}

#[test]
fn test_osvvm_build_summary() {
    let summary = read(&std::fs::read(fixture()).unwrap()).unwrap();

    assert_eq!(summary.name(), "OsvvmLibraries");
    assert_eq!(summary.total_duration(), Some(Duration::milliseconds(12_500)));
    let start = NaiveDate::from_ymd_opt(2024, 1, 20)
        .unwrap()
        .and_hms_opt(14, 37, 52)
        .unwrap();
    assert_eq!(summary.start_time(), Some(start));

    assert_eq!(summary.testsuite_count(), 2);
    assert_eq!(summary.testcase_count(), 3);
    assert_eq!(summary.status(), TestsuiteStatus::FAILED | TestsuiteStatus::ERRORED);
}

#[test]
fn test_osvvm_testcase_fields() {
    let summary = read(&std::fs::read(fixture()).unwrap()).unwrap();
    let axi = summary.testsuite("Axi4Lite").unwrap();

    let passed = axi.testcase("TbAxi4_BasicReadWrite").unwrap();
    assert_eq!(passed.status(), TestcaseStatus::PASSED);
    assert_eq!(passed.assertion_count(), Some(20));
    assert_eq!(passed.total_duration(), Some(Duration::seconds(2)));

    let failed = axi.testcase("TbAxi4_MemoryBurst").unwrap();
    assert_eq!(failed.status(), TestcaseStatus::FAILED | TestcaseStatus::ERRORED);
    assert_eq!(failed.error_count(), 2);
    assert_eq!(failed.passed_assertion_count(), Some(8));
    assert_eq!(failed.failed_assertion_count(), Some(2));

    let uart = summary.testsuite("Uart").unwrap();
    assert_eq!(uart.status(), TestsuiteStatus::SKIPPED);
    assert_eq!(axi.assertion_count(), Some(30));
}

#[test]
fn test_osvvm_strict_aggregation_accepts_consistent_file() {
    let mut config = Config::default();
    config.reader.strict_aggregation = true;
    let adapter = AdapterRegistry::with_config(&config)
        .adapter(Dialect::OsvvmYaml)
        .unwrap();

    let path = fixture();
    let report = adapter.parse(&path, &std::fs::read(&path).unwrap()).unwrap();
    assert!(adapter.to_testsuite_summary(&report).is_ok());
}

#[test]
fn test_osvvm_inconsistent_alert_counts() {
    let content = br#"
Name: Inconsistent
TestSuites:
  - Name: S
    TestCases:
      - TestCaseName: T
        Status: passed
        Results:
          TotalErrors: 5
          AlertCount:
            Warning: 1
            Error: 0
            Failure: 0
"#;
    let summary = read(content).unwrap();
    let testcase = summary.testsuite("S").unwrap().testcase("T").unwrap();
    assert_eq!(
        testcase.status(),
        TestcaseStatus::PASSED | TestcaseStatus::INCONSISTENT
    );
    assert!(!testcase.status().contains(TestcaseStatus::WARNED));
    assert_eq!(summary.counters().inconsistent, 1);
}

#[test]
fn test_osvvm_failed_and_inconsistent_fails_suite() {
    let content = br#"
Name: Broken
TestSuites:
  - Name: S
    TestCases:
      - TestCaseName: Ok
        Status: PASSED
      - TestCaseName: T
        Status: FAILED
        Results:
          TotalErrors: 5
          AlertCount:
            Warning: 0
            Error: 1
            Failure: 0
"#;
    let summary = read(content).unwrap();
    let suite = summary.testsuite("S").unwrap();
    assert_eq!(
        suite.testcase("T").unwrap().status(),
        TestcaseStatus::FAILED | TestcaseStatus::INCONSISTENT
    );
    assert_eq!(suite.status().primary(), TestsuiteStatus::FAILED);
    assert!(suite.status().contains(TestsuiteStatus::INCONSISTENT));
    assert_eq!(summary.status().primary(), TestsuiteStatus::FAILED);
    assert_eq!(summary.counters().inconsistent, 1);
    assert_eq!(summary.counters().failed_outcomes, 1);
}

#[test]
fn test_osvvm_aborted_run_with_nulls() {
    let content = br#"
BuildInfo:
  StartTime: not a time
TestSuites:
  - Name: Partial
    TestCases:
  - Name: Other
    TestCases:
      - TestCaseName: Counted
        Status: Running
        Results:
          AffirmCount: 3
          PassedCount: 1
      - TestCaseName: Bare
        Status: Running
        Results:
      - Status: PASSED
"#;
    let summary = read(content).unwrap();
    assert_eq!(summary.name(), DEFAULT_BUILD_NAME);
    assert!(summary.start_time().is_none());
    assert_eq!(summary.testsuite("Partial").unwrap().status(), TestsuiteStatus::EMPTY);

    // unknown statuses are derived from the assertion counts
    let other = summary.testsuite("Other").unwrap();
    assert_eq!(other.testcase("Counted").unwrap().status(), TestcaseStatus::FAILED);
    assert_eq!(other.testcase("Bare").unwrap().status(), TestcaseStatus::PASSED);
    assert_eq!(other.testcases().count(), 2);
}

#[test]
fn test_osvvm_malformed_yaml() {
    let err = read(b"TestSuites: [ {Name: ").unwrap_err();
    assert!(matches!(err, UnittestError::MalformedDocument { .. }));
}

#[test]
fn test_osvvm_round_trip() {
    let original = read(&std::fs::read(fixture()).unwrap()).unwrap();
    let adapter = AdapterRegistry::new().adapter(Dialect::OsvvmYaml).unwrap();

    let report = adapter.from_testsuite_summary(&original).unwrap();
    let yaml = adapter.serialize(&report).unwrap();
    let parsed: OsvvmReport = serde_yaml::from_slice(&yaml).unwrap();
    assert_eq!(parsed.test_suites.len(), 2);
    assert_eq!(
        parsed.test_suites[0].test_cases[1].status.as_deref(),
        Some("FAILED")
    );

    let again = read(&yaml).unwrap();
    assert_eq!(again.counters(), original.counters());
    assert_eq!(again.status(), original.status());
}

#[test]
fn test_osvvm_flattens_nested_suites() {
    let junit = AdapterRegistry::new()
        .adapter(Dialect::JUnit(edaa_reports_core::JUnitFlavor::Any))
        .unwrap();
    let content = br#"<testsuites name="r"><testsuite name="S">
        <testcase name="a" classname="pkg.A"/>
        <testcase name="b" classname="pkg.B"/>
    </testsuite></testsuites>"#;
    let summary = junit
        .to_testsuite_summary(&junit.parse(Path::new("r.xml"), content).unwrap())
        .unwrap();

    let report = osvvm::from_testsuite_summary(&summary).unwrap();
    assert_eq!(report.test_suites.len(), 1);
    let names: Vec<_> = report.test_suites[0]
        .test_cases
        .iter()
        .filter_map(|t| t.test_case_name.as_deref())
        .collect();
    assert_eq!(names, vec!["a", "b"]);

    let wrapped = DialectReport::Osvvm(report);
    assert_eq!(wrapped.dialect(), Dialect::OsvvmYaml);
}
