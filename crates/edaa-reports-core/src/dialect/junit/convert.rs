//! Conversion between [`JUnitReport`] and the canonical model.
//!
//! JUnit has no nested suites; the hierarchy is encoded in the dotted
//! `classname` of each testcase. Reading expands `a.b.C` into the suite
//! chain a (package) → b (module) → C (class); writing joins a testcase's
//! parent with the split-origin suites above it back into one classname.
//! Logical suites are never folded into a classname.
//!
//! Everything the canonical model has no field for is kept as annotations:
//! structural data under the `junit.` prefix, `<property>` entries verbatim.

use tracing::debug;

use super::flavor::JUnitFlavor;
use super::model::{JUnitReport, JUnitResult, JUnitResultKind, JUnitTestcase, JUnitTestsuite};
use crate::config::ReaderConfig;
use crate::unittest::{
    Annotations, Entity, Testcase, Testsuite, TestsuiteKind, TestsuiteSummary, UnittestError,
};

pub const ANNOTATION_PREFIX: &str = "junit.";
pub const KEY_FILE: &str = "junit.file";
pub const KEY_LINE: &str = "junit.line";
pub const KEY_MESSAGE: &str = "junit.message";
pub const KEY_TYPE: &str = "junit.type";
pub const KEY_TEXT: &str = "junit.text";
pub const KEY_SYSTEM_OUT: &str = "junit.system-out";
pub const KEY_SYSTEM_ERR: &str = "junit.system-err";
pub const KEY_HOSTNAME: &str = "junit.hostname";
/// Set only for testcases read with a blank classname.
pub const KEY_CLASSNAME: &str = "junit.classname";

/// Build a canonical summary from a parsed report.
pub fn to_testsuite_summary(
    report: &JUnitReport,
    config: &ReaderConfig,
) -> Result<TestsuiteSummary, UnittestError> {
    let mut summary = TestsuiteSummary::new(&report.name)?;
    if let Some(timestamp) = report.timestamp {
        summary = summary.with_start_time(timestamp);
    }
    if let Some(duration) = report.duration {
        summary = summary.with_total_duration(duration);
    }

    for junit_suite in report.testsuites.values() {
        if config.decouple_classname_hierarchy {
            for junit_testcase in junit_suite.testcases() {
                let chain = classname_chain(&junit_testcase.classname);
                let Some(((first, kind), rest)) = chain.split_first() else {
                    return Err(UnittestError::structure(
                        summary.name(),
                        format!("testcase '{}' has no classname to place it by", junit_testcase.name),
                    ));
                };
                let top = summary.ensure_testsuite(first, *kind)?;
                place_testcase(top, rest, testcase_from_junit(junit_testcase)?)?;
            }
        } else {
            let suite = summary.add_testsuite(testsuite_from_junit(junit_suite)?)?;
            for junit_testcase in junit_suite.testcases() {
                let chain = classname_chain(&junit_testcase.classname);
                place_testcase(suite, &chain, testcase_from_junit(junit_testcase)?)?;
            }
        }
    }

    summary.aggregate(config.strict_aggregation)?;
    debug!(
        summary = summary.name(),
        testsuites = summary.testsuite_count(),
        testcases = summary.testcase_count(),
        "converted JUnit report to canonical summary"
    );
    Ok(summary)
}

/// Build a report of `flavor` from a canonical summary.
///
/// Top-level logical suites become JUnit testsuites. Top-level suites that
/// stem from a classname (decoupled hierarchies) are gathered in one JUnit
/// testsuite named after the summary.
pub fn from_testsuite_summary(
    summary: &TestsuiteSummary,
    flavor: JUnitFlavor,
) -> Result<JUnitReport, UnittestError> {
    let mut summary = summary.copy();
    summary.aggregate(false)?;

    let mut report = JUnitReport::new(flavor, summary.name());
    report.timestamp = summary.start_time();
    report.duration = summary.total_duration();

    for suite in summary.testsuites() {
        let mut testcases = Vec::new();
        if suite.kind().is_split_origin() {
            let mut chain = vec![(suite.name(), suite.kind())];
            collect_testcases(suite, &mut chain, suite.name(), &mut testcases);
            if !report.testsuites.contains_key(summary.name()) {
                report.add_testsuite(JUnitTestsuite::new(summary.name()))?;
            }
            let Some(target) = report.testsuites.get_mut(summary.name()) else {
                continue;
            };
            for (classname, testcase) in testcases {
                target.add_testcase(testcase_to_junit(testcase, classname))?;
            }
        } else {
            let target = report.add_testsuite(testsuite_to_junit(suite))?;
            collect_testcases(suite, &mut Vec::new(), suite.name(), &mut testcases);
            for (classname, testcase) in testcases {
                target.add_testcase(testcase_to_junit(testcase, classname))?;
            }
        }
    }

    report.aggregate();
    Ok(report)
}

/// Split a classname into suite names with the kind each one gets.
///
/// A classname with empty segments is not split.
fn classname_chain(classname: &str) -> Vec<(String, TestsuiteKind)> {
    if classname.trim().is_empty() {
        return Vec::new();
    }
    let segments: Vec<&str> = classname.split('.').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return vec![(classname.to_string(), TestsuiteKind::Logical)];
    }

    let count = segments.len();
    segments
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let kind = match count - index {
                1 => TestsuiteKind::Class,
                2 => TestsuiteKind::Module,
                _ => TestsuiteKind::Package,
            };
            (name.to_string(), kind)
        })
        .collect()
}

fn place_testcase(
    suite: &mut Testsuite,
    chain: &[(String, TestsuiteKind)],
    testcase: Testcase,
) -> Result<(), UnittestError> {
    let mut current = suite;
    for (name, kind) in chain {
        current = current.ensure_testsuite(name, *kind)?;
    }
    current.add_testcase(testcase)?;
    Ok(())
}

fn testsuite_from_junit(junit: &JUnitTestsuite) -> Result<Testsuite, UnittestError> {
    let mut suite = Testsuite::new(&junit.name)?;
    if let Some(timestamp) = junit.timestamp {
        suite = suite.with_start_time(timestamp);
    }
    if let Some(duration) = junit.duration {
        suite = suite.with_total_duration(duration);
    }

    let annotations = suite.annotations_mut();
    annotations.extend_from(&junit.properties);
    set_optional(annotations, KEY_HOSTNAME, junit.hostname.as_deref());
    set_optional(annotations, KEY_SYSTEM_OUT, junit.system_out.as_deref());
    set_optional(annotations, KEY_SYSTEM_ERR, junit.system_err.as_deref());
    Ok(suite)
}

fn testcase_from_junit(junit: &JUnitTestcase) -> Result<Testcase, UnittestError> {
    let mut testcase = Testcase::new(&junit.name)?.with_status(junit.status);
    if let Some(duration) = junit.duration {
        testcase = testcase.with_test_duration(duration);
    }
    if let Some(timestamp) = junit.timestamp {
        testcase = testcase.with_start_time(timestamp);
    }
    if let Some(assertions) = junit.assertions {
        testcase = testcase.with_assertion_count(assertions);
    }

    let annotations = testcase.annotations_mut();
    annotations.extend_from(&junit.properties);
    if junit.classname.trim().is_empty() {
        annotations.set(KEY_CLASSNAME, junit.classname.as_str());
    }
    set_optional(annotations, KEY_FILE, junit.file.as_deref());
    set_optional(annotations, KEY_LINE, junit.line.map(|l| l.to_string()).as_deref());
    if let Some(result) = &junit.result {
        set_optional(annotations, KEY_MESSAGE, result.message.as_deref());
        set_optional(annotations, KEY_TYPE, result.result_type.as_deref());
        set_optional(annotations, KEY_TEXT, result.text.as_deref());
    }
    set_optional(annotations, KEY_SYSTEM_OUT, junit.system_out.as_deref());
    set_optional(annotations, KEY_SYSTEM_ERR, junit.system_err.as_deref());
    Ok(testcase)
}

/// Gather the testcases below `suite` with their collapsed classnames.
///
/// `chain` holds the suites between the JUnit testsuite and `suite`.
/// Testcases with an empty chain keep the classname they were read with,
/// or get `fallback`.
fn collect_testcases<'a>(
    suite: &'a Testsuite,
    chain: &mut Vec<(&'a str, TestsuiteKind)>,
    fallback: &str,
    out: &mut Vec<(String, &'a Testcase)>,
) {
    let classname = collapse_classname(chain);
    for testcase in suite.testcases() {
        let classname = classname.clone().unwrap_or_else(|| {
            testcase
                .annotations()
                .get(KEY_CLASSNAME)
                .unwrap_or(fallback)
                .to_string()
        });
        out.push((classname, testcase));
    }
    for child in suite.testsuites() {
        chain.push((child.name(), child.kind()));
        collect_testcases(child, chain, fallback, out);
        chain.pop();
    }
}

/// The parent's name, prefixed by the split-origin suites directly above it.
fn collapse_classname(chain: &[(&str, TestsuiteKind)]) -> Option<String> {
    let ((parent, _), ancestors) = chain.split_last()?;
    let mut names = vec![*parent];
    names.extend(
        ancestors
            .iter()
            .rev()
            .take_while(|(_, kind)| kind.is_split_origin())
            .map(|(name, _)| *name),
    );
    names.reverse();
    Some(names.join("."))
}

fn testsuite_to_junit(suite: &Testsuite) -> JUnitTestsuite {
    let annotations = suite.annotations();
    let mut junit = JUnitTestsuite::new(suite.name());
    junit.timestamp = suite.start_time();
    junit.duration = suite.total_duration();
    junit.hostname = annotations.get(KEY_HOSTNAME).map(str::to_string);
    junit.system_out = annotations.get(KEY_SYSTEM_OUT).map(str::to_string);
    junit.system_err = annotations.get(KEY_SYSTEM_ERR).map(str::to_string);
    junit.properties = plain_properties(annotations);
    junit
}

fn testcase_to_junit(testcase: &Testcase, classname: String) -> JUnitTestcase {
    let annotations = testcase.annotations();
    let mut junit = JUnitTestcase::new(testcase.name(), classname);
    junit.duration = testcase.test_duration().or(testcase.total_duration());
    junit.timestamp = testcase.start_time();
    junit.assertions = testcase.assertion_count();
    junit.status = testcase.status();
    junit.file = annotations.get(KEY_FILE).map(str::to_string);
    junit.line = annotations.get(KEY_LINE).and_then(|l| l.parse().ok());
    junit.system_out = annotations.get(KEY_SYSTEM_OUT).map(str::to_string);
    junit.system_err = annotations.get(KEY_SYSTEM_ERR).map(str::to_string);
    junit.properties = plain_properties(annotations);
    junit.result = JUnitResultKind::for_status(testcase.status()).map(|kind| JUnitResult {
        kind,
        message: annotations.get(KEY_MESSAGE).map(str::to_string),
        result_type: annotations.get(KEY_TYPE).map(str::to_string),
        text: annotations.get(KEY_TEXT).map(str::to_string),
    });
    junit
}

/// Annotations that are not JUnit structural data.
fn plain_properties(annotations: &Annotations) -> Annotations {
    annotations
        .iter()
        .filter(|(key, _)| !key.starts_with(ANNOTATION_PREFIX))
        .collect()
}

fn set_optional(annotations: &mut Annotations, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        annotations.set(key, value);
    }
}
