//! [`JUnitReport`] to JUnit XML document.

use chrono::{Duration, NaiveDateTime};

use super::flavor::JUnitFlavor;
use super::model::{JUnitCounters, JUnitReport, JUnitResultKind, JUnitTestcase, JUnitTestsuite};
use super::xml::{self, XmlElement};
use crate::config::WriterConfig;
use crate::unittest::{duration_as_secs, format_timestamp, Annotations, UnittestError};

/// Hostname written when a dialect requires one and none is known.
const FALLBACK_HOSTNAME: &str = "localhost";

/// Serialize `report` with the document layout of its flavor.
///
/// Counts are recomputed from the testcases; stored counters are ignored.
pub fn write_report(report: &JUnitReport, config: &WriterConfig) -> Result<Vec<u8>, UnittestError> {
    let mut report = report.clone();
    report.aggregate();
    let writer = Writer {
        flavor: report.flavor,
        precision: config.time_precision,
    };

    let root = if report.flavor.single_testsuite() {
        let mut suites = report.testsuites.values();
        match (suites.next(), suites.next()) {
            (Some(suite), None) => writer.testsuite(suite),
            _ => {
                return Err(UnittestError::structure(
                    &report.name,
                    format!(
                        "{} documents hold exactly one testsuite, found {}",
                        report.flavor,
                        report.testsuites.len()
                    ),
                ));
            }
        }
    } else {
        writer.testsuites(&report)
    };

    xml::write(&root, config.indent)
        .map_err(|message| UnittestError::structure(&report.name, message))
}

struct Writer {
    flavor: JUnitFlavor,
    precision: usize,
}

impl Writer {
    fn testsuites(&self, report: &JUnitReport) -> XmlElement {
        let mut element = XmlElement::new("testsuites").with_attribute("name", &report.name);
        element = self.counters(element, &report.counters);
        element = element
            .with_attribute("time", self.seconds(report.duration.or_else(|| suites_duration(report))))
            .with_attribute("timestamp", self.timestamp(report.timestamp));

        for suite in report.testsuites.values() {
            element.push(self.testsuite(suite));
        }
        element
    }

    fn testsuite(&self, suite: &JUnitTestsuite) -> XmlElement {
        let mut element = XmlElement::new("testsuite").with_attribute("name", &suite.name);
        element = self.counters(element, &suite.counters);

        let hostname = match (&suite.hostname, self.flavor) {
            (Some(hostname), _) => Some(hostname.as_str()),
            (None, JUnitFlavor::CTest) => Some(FALLBACK_HOSTNAME),
            (None, _) => None,
        };
        element = element
            .with_optional_attribute("hostname", hostname)
            .with_attribute("time", self.seconds(suite.duration.or_else(|| testcases_duration(suite))));
        if suite.timestamp.is_some() || self.flavor == JUnitFlavor::CTest {
            element = element.with_attribute("timestamp", self.timestamp(suite.timestamp));
        }

        if !suite.properties.is_empty() {
            element.push(properties(&suite.properties));
        }
        for testcase in suite.testcases() {
            element.push(self.testcase(testcase));
        }
        if let Some(text) = &suite.system_out {
            element.push(XmlElement::new("system-out").with_text(text));
        }
        if let Some(text) = &suite.system_err {
            element.push(XmlElement::new("system-err").with_text(text));
        }
        element
    }

    fn testcase(&self, testcase: &JUnitTestcase) -> XmlElement {
        let mut element = XmlElement::new("testcase")
            .with_attribute("name", &testcase.name)
            .with_attribute("classname", &testcase.classname);

        let requires_time = self.flavor.required_testcase_attributes().contains(&"time");
        if testcase.duration.is_some() || requires_time {
            element = element.with_attribute("time", self.seconds(testcase.duration));
        }
        if let Some((status, result)) = self.flavor.status_attributes(testcase.status) {
            element = element
                .with_attribute("status", status)
                .with_attribute("result", result);
        }
        element = element
            .with_optional_attribute("timestamp", testcase.timestamp.map(format_timestamp))
            .with_optional_attribute("assertions", testcase.assertions.map(|n| n.to_string()))
            .with_optional_attribute("file", testcase.file.as_deref())
            .with_optional_attribute("line", testcase.line.map(|n| n.to_string()));

        if !testcase.properties.is_empty() {
            element.push(properties(&testcase.properties));
        }

        let result_kind = testcase
            .result
            .as_ref()
            .map(|r| r.kind)
            .or_else(|| JUnitResultKind::for_status(testcase.status));
        if let Some(kind) = result_kind {
            let mut result = XmlElement::new(kind.element_name());
            if let Some(details) = testcase.result.as_ref().filter(|r| r.kind == kind) {
                result = result
                    .with_optional_attribute("message", details.message.as_deref())
                    .with_optional_attribute("type", details.result_type.as_deref());
                if let Some(text) = &details.text {
                    result = result.with_text(text);
                }
            }
            element.push(result);
        }

        if let Some(text) = &testcase.system_out {
            element.push(XmlElement::new("system-out").with_text(text));
        }
        if let Some(text) = &testcase.system_err {
            element.push(XmlElement::new("system-err").with_text(text));
        }
        element
    }

    fn counters(&self, element: XmlElement, counters: &JUnitCounters) -> XmlElement {
        let element = element
            .with_attribute("tests", counters.tests.to_string())
            .with_attribute("failures", counters.failures.to_string())
            .with_attribute("errors", counters.errors.to_string());
        if self.flavor.has_disabled_count() {
            element
                .with_attribute("disabled", counters.disabled.to_string())
                .with_attribute("skipped", counters.skipped.to_string())
        } else {
            element.with_attribute("skipped", (counters.skipped + counters.disabled).to_string())
        }
    }

    fn seconds(&self, duration: Option<Duration>) -> String {
        let seconds = duration.map(duration_as_secs).unwrap_or(0.0);
        format!("{:.*}", self.precision, seconds)
    }

    fn timestamp(&self, timestamp: Option<NaiveDateTime>) -> String {
        format_timestamp(timestamp.unwrap_or_default())
    }
}

fn properties(annotations: &Annotations) -> XmlElement {
    let mut element = XmlElement::new("properties");
    for (name, value) in annotations.iter() {
        element.push(
            XmlElement::new("property")
                .with_attribute("name", name)
                .with_attribute("value", value),
        );
    }
    element
}

fn suites_duration(report: &JUnitReport) -> Option<Duration> {
    crate::unittest::sum_durations(report.testsuites.values().map(|s| s.duration))
}

fn testcases_duration(suite: &JUnitTestsuite) -> Option<Duration> {
    crate::unittest::sum_durations(suite.testcases().map(|t| t.duration))
}
