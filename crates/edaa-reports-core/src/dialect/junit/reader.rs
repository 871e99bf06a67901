//! JUnit XML document to [`JUnitReport`].

use std::path::Path;

use tracing::{debug, warn};

use super::flavor::JUnitFlavor;
use super::model::{JUnitReport, JUnitResult, JUnitResultKind, JUnitTestcase, JUnitTestsuite};
use super::xml::{self, XmlElement};
use crate::unittest::{duration_from_secs, parse_timestamp, Annotations, TestcaseStatus, UnittestError};

/// Name of the report when the document element carries none.
pub const DEFAULT_REPORT_NAME: &str = "root";

/// Parse `content` read from `path` as a `flavor` document.
pub fn read_report(path: &Path, content: &[u8], flavor: JUnitFlavor) -> Result<JUnitReport, UnittestError> {
    let root = xml::parse(content).map_err(|message| UnittestError::malformed(path, message))?;
    let reader = Reader { path, flavor };

    if root.name != flavor.root_element() {
        return Err(UnittestError::UnexpectedRootElement {
            path: path.to_path_buf(),
            expected: flavor.root_element().to_string(),
            found: root.name.clone(),
        });
    }

    let mut report = if flavor.single_testsuite() {
        let suite = reader.testsuite(&root)?;
        let mut report = JUnitReport::new(flavor, suite.name.clone());
        report.timestamp = suite.timestamp;
        report.duration = suite.duration;
        report.add_testsuite(suite)?;
        report
    } else {
        reader.testsuites(&root)?
    };

    report.aggregate();
    debug!(
        path = %path.display(),
        flavor = %flavor,
        testsuites = report.testsuites.len(),
        tests = report.counters.tests,
        "parsed JUnit document"
    );
    Ok(report)
}

struct Reader<'a> {
    path: &'a Path,
    flavor: JUnitFlavor,
}

impl Reader<'_> {
    fn testsuites(&self, element: &XmlElement) -> Result<JUnitReport, UnittestError> {
        self.require(element, self.flavor.required_testsuites_attributes())?;

        let name = element.attribute("name").unwrap_or(DEFAULT_REPORT_NAME);
        let mut report = JUnitReport::new(self.flavor, name);
        report.timestamp = self.timestamp(element, "timestamp")?;
        report.duration = self.seconds(element, "time")?;

        for child in &element.children {
            match child.name.as_str() {
                "testsuite" => {
                    let suite = self.testsuite(child)?;
                    report.add_testsuite(suite)?;
                }
                "properties" => {}
                other => warn!(element = other, "ignoring unknown element below <testsuites>"),
            }
        }
        Ok(report)
    }

    fn testsuite(&self, element: &XmlElement) -> Result<JUnitTestsuite, UnittestError> {
        self.require(element, self.flavor.required_testsuite_attributes())?;

        let mut suite = JUnitTestsuite::new(element.attribute("name").unwrap_or_default());
        suite.hostname = element.attribute("hostname").map(str::to_string);
        suite.timestamp = self.timestamp(element, "timestamp")?;
        suite.duration = self.seconds(element, "time")?;

        for child in &element.children {
            match child.name.as_str() {
                "testcase" => suite.add_testcase(self.testcase(child)?)?,
                "properties" => suite.properties = self.properties(child),
                "system-out" => suite.system_out = Some(child.text.clone()),
                "system-err" => suite.system_err = Some(child.text.clone()),
                "testsuite" => warn!(
                    testsuite = suite.name.as_str(),
                    nested = child.attribute("name").unwrap_or_default(),
                    "ignoring nested <testsuite>"
                ),
                other => warn!(
                    testsuite = suite.name.as_str(),
                    element = other,
                    "ignoring unknown element below <testsuite>"
                ),
            }
        }

        if let Some(stored) = self.unsigned(element, "tests")? {
            let computed = suite.testcases().count() as u64;
            if stored != computed {
                warn!(
                    testsuite = suite.name.as_str(),
                    stored, computed, "tests attribute disagrees with the testcases"
                );
            }
        }
        Ok(suite)
    }

    fn testcase(&self, element: &XmlElement) -> Result<JUnitTestcase, UnittestError> {
        self.require(element, self.flavor.required_testcase_attributes())?;

        let mut testcase = JUnitTestcase::new(
            element.attribute("name").unwrap_or_default(),
            element.attribute("classname").unwrap_or_default(),
        );
        testcase.duration = self.seconds(element, "time")?;
        testcase.timestamp = self.timestamp(element, "timestamp")?;
        testcase.assertions = self.unsigned(element, "assertions")?;
        testcase.file = element.attribute("file").map(str::to_string);
        testcase.line = self.unsigned(element, "line")?;

        for child in &element.children {
            if let Some(kind) = JUnitResultKind::from_element_name(&child.name) {
                if testcase.result.is_some() {
                    return Err(UnittestError::structure(
                        format!("{}/{}", testcase.classname, testcase.name),
                        "more than one result element",
                    ));
                }
                testcase.result = Some(JUnitResult {
                    kind,
                    message: child.attribute("message").map(str::to_string),
                    result_type: child.attribute("type").map(str::to_string),
                    text: child.text_content().map(str::to_string),
                });
                continue;
            }
            match child.name.as_str() {
                "system-out" => testcase.system_out = Some(child.text.clone()),
                "system-err" => testcase.system_err = Some(child.text.clone()),
                "properties" => testcase.properties = self.properties(child),
                other => {
                    return Err(UnittestError::structure(
                        format!("{}/{}", testcase.classname, testcase.name),
                        format!("unexpected element <{other}> in <testcase>"),
                    ));
                }
            }
        }

        // Disabled tests carry a plain <skipped/> next to their status attribute.
        let from_attributes = self.attribute_status(element)?;
        testcase.status = match (&testcase.result, from_attributes) {
            (Some(result), Some(TestcaseStatus::EXCLUDED)) if result.kind == JUnitResultKind::Skipped => {
                TestcaseStatus::EXCLUDED
            }
            (Some(result), _) => result.kind.status(),
            (None, status) => status.unwrap_or(TestcaseStatus::PASSED),
        };
        Ok(testcase)
    }

    /// Status given by the `status`/`result` attributes, `result` taking precedence.
    fn attribute_status(&self, element: &XmlElement) -> Result<Option<TestcaseStatus>, UnittestError> {
        if !self.flavor.has_status_attributes() {
            return Ok(None);
        }
        let from_status = match element.attribute("status") {
            Some(value) => self
                .flavor
                .parse_status_attribute(value)
                .map_err(|reason| self.invalid(element, "status", value, reason))?,
            None => None,
        };
        let from_result = match element.attribute("result") {
            Some(value) => self
                .flavor
                .parse_result_attribute(value)
                .map_err(|reason| self.invalid(element, "result", value, reason))?,
            None => None,
        };
        Ok(from_result.or(from_status))
    }

    fn properties(&self, element: &XmlElement) -> Annotations {
        element
            .children_named("property")
            .filter_map(|p| {
                let name = p.attribute("name")?;
                let value = p.attribute("value").map(str::to_string).unwrap_or_else(|| p.text.clone());
                Some((name.to_string(), value))
            })
            .collect()
    }

    fn require(&self, element: &XmlElement, attributes: &[&str]) -> Result<(), UnittestError> {
        match attributes.iter().find(|a| element.attribute(a).is_none()) {
            Some(missing) => Err(UnittestError::MissingAttribute {
                path: self.path.to_path_buf(),
                element: element.name.clone(),
                attribute: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn seconds(&self, element: &XmlElement, attribute: &str) -> Result<Option<chrono::Duration>, UnittestError> {
        let Some(value) = element.attribute(attribute) else {
            return Ok(None);
        };
        // some producers write thousands separators for long runs
        let cleaned = value.trim().replace(',', "");
        match cleaned.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(Some(duration_from_secs(seconds))),
            Ok(_) => Err(self.invalid(element, attribute, value, "expected a non-negative number of seconds")),
            Err(e) => Err(self.invalid(element, attribute, value, e.to_string())),
        }
    }

    fn unsigned(&self, element: &XmlElement, attribute: &str) -> Result<Option<u64>, UnittestError> {
        element
            .attribute(attribute)
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| self.invalid(element, attribute, value, e.to_string()))
            })
            .transpose()
    }

    fn timestamp(
        &self,
        element: &XmlElement,
        attribute: &str,
    ) -> Result<Option<chrono::NaiveDateTime>, UnittestError> {
        element
            .attribute(attribute)
            .map(|value| {
                parse_timestamp(value)
                    .ok_or_else(|| self.invalid(element, attribute, value, "expected an ISO-8601 timestamp"))
            })
            .transpose()
    }

    fn invalid(&self, element: &XmlElement, attribute: &str, value: &str, reason: impl Into<String>) -> UnittestError {
        UnittestError::InvalidAttribute {
            path: self.path.to_path_buf(),
            element: element.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(content: &str, flavor: JUnitFlavor) -> Result<JUnitReport, UnittestError> {
        read_report(Path::new("report.xml"), content.as_bytes(), flavor)
    }

    #[test]
    fn test_testcase_without_result_is_passed() {
        let report = read(
            r#"<testsuites><testsuite name="S"><testcase name="x" classname="c"/></testsuite></testsuites>"#,
            JUnitFlavor::Any,
        )
        .unwrap();
        let testcase = report.testsuites["S"].testcases().next().unwrap();
        assert_eq!(testcase.status, TestcaseStatus::PASSED);
    }

    #[test]
    fn test_wrong_root_element() {
        let err = read(r#"<testsuite name="S"/>"#, JUnitFlavor::PyTest).unwrap_err();
        match err {
            UnittestError::UnexpectedRootElement { expected, found, .. } => {
                assert_eq!(expected, "testsuites");
                assert_eq!(found, "testsuite");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_time() {
        let err = read(
            r#"<testsuites><testsuite name="S"><testcase name="x" classname="c" time="soon"/></testsuite></testsuites>"#,
            JUnitFlavor::Any,
        )
        .unwrap_err();
        assert!(matches!(err, UnittestError::InvalidAttribute { ref attribute, .. } if attribute == "time"));
    }

    #[test]
    fn test_unknown_testcase_child() {
        let err = read(
            r#"<testsuites><testsuite name="S"><testcase name="x" classname="c"><oops/></testcase></testsuite></testsuites>"#,
            JUnitFlavor::Any,
        )
        .unwrap_err();
        assert!(matches!(err, UnittestError::Structure { .. }));
    }

    #[test]
    fn test_nested_testsuite_is_ignored() {
        let report = read(
            r#"<testsuites><testsuite name="S">
                 <testsuite name="inner"><testcase name="y" classname="c"/></testsuite>
                 <testcase name="x" classname="c"/>
               </testsuite></testsuites>"#,
            JUnitFlavor::Any,
        )
        .unwrap();
        assert_eq!(report.counters.tests, 1);
    }

    #[test]
    fn test_thousands_separator_in_time() {
        let report = read(
            r#"<testsuites><testsuite name="S" time="1,234.5"/></testsuites>"#,
            JUnitFlavor::Any,
        )
        .unwrap();
        assert_eq!(report.testsuites["S"].duration, Some(duration_from_secs(1234.5)));
    }
}
