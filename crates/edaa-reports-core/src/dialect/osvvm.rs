//! OSVVM build summary YAML.
//!
//! OSVVM writes the summary incrementally while a regression runs, so an
//! aborted run leaves a document where sequences and maps are missing or
//! null. Such documents are read with the missing parts treated as empty.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use super::{Dialect, DialectAdapter, DialectReport};
use crate::config::ReaderConfig;
use crate::unittest::{
    duration_as_secs, duration_from_secs, format_timestamp, parse_timestamp, Entity, Testcase,
    TestcaseCategory, TestcaseStatus, Testsuite, TestsuiteSummary, UnittestError,
};

/// Summary name used when the document does not carry one.
pub const DEFAULT_BUILD_NAME: &str = "OSVVM";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OsvvmReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub build_info: OsvvmBuildInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub test_suites: Vec<OsvvmTestsuite>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OsvvmBuildInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OsvvmTestsuite {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub test_cases: Vec<OsvvmTestcase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OsvvmTestcase {
    #[serde(default)]
    pub test_case_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: OsvvmResults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OsvvmResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affirm_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_errors: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alert_count: OsvvmAlertCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OsvvmAlertCount {
    #[serde(default)]
    pub warning: u64,
    #[serde(default)]
    pub error: u64,
    #[serde(default)]
    pub failure: u64,
}

impl OsvvmAlertCount {
    pub fn total(&self) -> u64 {
        self.warning + self.error + self.failure
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Canonical status of an OSVVM testcase.
///
/// Alert flags are only trusted when `TotalErrors` matches the alert sum.
pub fn testcase_status(testcase: &OsvvmTestcase) -> TestcaseStatus {
    let mut status = match testcase.status.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("passed") => TestcaseStatus::PASSED,
        Some("skipped") => TestcaseStatus::SKIPPED,
        Some("failed") => TestcaseStatus::FAILED,
        other => {
            warn!(
                testcase = testcase.test_case_name.as_deref().unwrap_or_default(),
                status = other.unwrap_or("<missing>"),
                "unknown OSVVM testcase status"
            );
            TestcaseStatus::UNKNOWN
        }
    };

    let alerts = testcase.results.alert_count;
    match testcase.results.total_errors {
        Some(total) if total != alerts.total() => status |= TestcaseStatus::INCONSISTENT,
        _ => {
            if alerts.warning > 0 {
                status |= TestcaseStatus::WARNED;
            }
            if alerts.error > 0 {
                status |= TestcaseStatus::ERRORED;
            }
            if alerts.failure > 0 {
                status |= TestcaseStatus::ABORTED;
            }
        }
    }
    status
}

/// Build a canonical summary from a parsed build summary.
pub fn to_testsuite_summary(report: &OsvvmReport, config: &ReaderConfig) -> Result<TestsuiteSummary, UnittestError> {
    let mut summary = TestsuiteSummary::new(report.name.as_deref().unwrap_or(DEFAULT_BUILD_NAME))?;
    if let Some(value) = &report.build_info.start_time {
        match parse_timestamp(value) {
            Some(start) => summary = summary.with_start_time(start),
            None => warn!(value = value.as_str(), "ignoring unparsable OSVVM StartTime"),
        }
    }
    if let Some(elapsed) = report.build_info.elapsed {
        summary = summary.with_total_duration(duration_from_secs(elapsed));
    }

    for osvvm_suite in &report.test_suites {
        let Some(name) = &osvvm_suite.name else {
            warn!("skipping OSVVM testsuite without name");
            continue;
        };
        let mut suite = Testsuite::new(name)?;
        if let Some(elapsed) = osvvm_suite.elapsed_time {
            suite = suite.with_total_duration(duration_from_secs(elapsed));
        }
        let suite = summary.add_testsuite(suite)?;

        for osvvm_testcase in &osvvm_suite.test_cases {
            let Some(name) = &osvvm_testcase.test_case_name else {
                warn!(testsuite = suite.name(), "skipping OSVVM testcase without name");
                continue;
            };
            let results = &osvvm_testcase.results;
            let alerts = results.alert_count;
            let mut testcase = Testcase::new(name)?
                .with_status(testcase_status(osvvm_testcase))
                .with_counts(alerts.warning, alerts.error, alerts.failure);
            if let Some(elapsed) = osvvm_testcase.elapsed_time {
                testcase = testcase.with_total_duration(duration_from_secs(elapsed));
            }
            if let Some(count) = results.affirm_count {
                testcase = testcase.with_assertion_count(count);
            }
            if let Some(count) = results.passed_count {
                testcase = testcase.with_passed_assertion_count(count);
            }
            suite.add_testcase(testcase)?;
        }
    }

    summary.aggregate(config.strict_aggregation)?;
    debug!(
        summary = summary.name(),
        testsuites = summary.testsuite_count(),
        testcases = summary.testcase_count(),
        "converted OSVVM build summary"
    );
    Ok(summary)
}

/// Build an OSVVM build summary from a canonical summary.
///
/// OSVVM testsuites are flat; testcases of nested suites are listed in
/// their top-level suite.
pub fn from_testsuite_summary(summary: &TestsuiteSummary) -> Result<OsvvmReport, UnittestError> {
    let mut summary = summary.copy();
    summary.aggregate(false)?;

    let mut report = OsvvmReport {
        name: Some(summary.name().to_string()),
        build_info: OsvvmBuildInfo {
            start_time: summary.start_time().map(format_timestamp),
            elapsed: summary.total_duration().map(duration_as_secs),
        },
        test_suites: Vec::new(),
    };

    for suite in summary.testsuites() {
        let test_cases = suite
            .iterate_testcases()
            .map(|testcase| OsvvmTestcase {
                test_case_name: Some(testcase.name().to_string()),
                elapsed_time: testcase.total_duration().map(duration_as_secs),
                status: Some(status_name(testcase.status()).to_string()),
                results: OsvvmResults {
                    affirm_count: testcase.assertion_count(),
                    passed_count: testcase.passed_assertion_count(),
                    total_errors: Some(
                        testcase.warning_count() + testcase.error_count() + testcase.fatal_count(),
                    ),
                    alert_count: OsvvmAlertCount {
                        warning: testcase.warning_count(),
                        error: testcase.error_count(),
                        failure: testcase.fatal_count(),
                    },
                },
            })
            .collect();
        report.test_suites.push(OsvvmTestsuite {
            name: Some(suite.name().to_string()),
            elapsed_time: suite.total_duration().map(duration_as_secs),
            test_cases,
        });
    }
    Ok(report)
}

fn status_name(status: TestcaseStatus) -> &'static str {
    match status.category() {
        TestcaseCategory::Passed | TestcaseCategory::Weak => "PASSED",
        TestcaseCategory::Failed | TestcaseCategory::Errored | TestcaseCategory::Inconsistent => "FAILED",
        TestcaseCategory::Skipped | TestcaseCategory::Excluded => "SKIPPED",
        TestcaseCategory::Unknown => "UNKNOWN",
    }
}

/// Adapter for OSVVM build summary YAML files.
#[derive(Debug, Clone, Default)]
pub struct OsvvmAdapter {
    reader: ReaderConfig,
}

impl OsvvmAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(reader: ReaderConfig) -> Self {
        Self { reader }
    }

    fn osvvm<'a>(&self, report: &'a DialectReport) -> Result<&'a OsvvmReport, UnittestError> {
        match report {
            DialectReport::Osvvm(osvvm) => Ok(osvvm),
            _ => Err(self.mismatch(report)),
        }
    }
}

impl DialectAdapter for OsvvmAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::OsvvmYaml
    }

    fn parse(&self, path: &Path, content: &[u8]) -> Result<DialectReport, UnittestError> {
        let report: OsvvmReport = serde_yaml::from_slice(content)
            .map_err(|e| UnittestError::malformed(path, e.to_string()))?;
        debug!(
            path = %path.display(),
            testsuites = report.test_suites.len(),
            "parsed OSVVM build summary"
        );
        Ok(DialectReport::Osvvm(report))
    }

    fn to_testsuite_summary(&self, report: &DialectReport) -> Result<TestsuiteSummary, UnittestError> {
        to_testsuite_summary(self.osvvm(report)?, &self.reader)
    }

    fn from_testsuite_summary(&self, summary: &TestsuiteSummary) -> Result<DialectReport, UnittestError> {
        from_testsuite_summary(summary).map(DialectReport::Osvvm)
    }

    fn serialize(&self, report: &DialectReport) -> Result<Vec<u8>, UnittestError> {
        let report = self.osvvm(report)?;
        serde_yaml::to_string(report)
            .map(String::into_bytes)
            .map_err(|e| {
                UnittestError::structure(report.name.as_deref().unwrap_or(DEFAULT_BUILD_NAME), e.to_string())
            })
    }
}
