//! Differences between the JUnit XML dialects.
//!
//! All dialects share the `testsuite`/`testcase` vocabulary; they differ in
//! the root element, the attributes a conforming file must carry and the
//! status vocabulary of testcases.

use serde::{Deserialize, Serialize};

use crate::unittest::TestcaseStatus;

/// One JUnit XML dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JUnitFlavor {
    /// Lowest common denominator of all JUnit producers.
    Any,
    /// Ant's JUnit 4 task output.
    AntJUnit4,
    /// CTest `--output-junit`.
    CTest,
    /// GoogleTest `--gtest_output=xml`.
    GoogleTest,
    /// pytest `--junitxml`.
    PyTest,
}

impl JUnitFlavor {
    pub const ALL: [JUnitFlavor; 5] = [
        JUnitFlavor::Any,
        JUnitFlavor::AntJUnit4,
        JUnitFlavor::CTest,
        JUnitFlavor::GoogleTest,
        JUnitFlavor::PyTest,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Any => "Any-JUnit",
            Self::AntJUnit4 => "Ant+JUnit4",
            Self::CTest => "CTest-JUnit",
            Self::GoogleTest => "GoogleTest-JUnit",
            Self::PyTest => "pyTest-JUnit",
        }
    }

    /// Identifier prefix as used on the command line (`<prefix>-junit`).
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::AntJUnit4 => "ant",
            Self::CTest => "ctest",
            Self::GoogleTest => "gtest",
            Self::PyTest => "pytest",
        }
    }

    /// Expected document element.
    pub fn root_element(&self) -> &'static str {
        match self {
            Self::AntJUnit4 | Self::CTest => "testsuite",
            Self::Any | Self::GoogleTest | Self::PyTest => "testsuites",
        }
    }

    /// The document element is itself the only testsuite.
    pub fn single_testsuite(&self) -> bool {
        self.root_element() == "testsuite"
    }

    /// Attributes the `<testsuites>` element must carry.
    pub fn required_testsuites_attributes(&self) -> &'static [&'static str] {
        match self {
            Self::GoogleTest => &["name", "tests", "failures", "disabled", "errors", "time", "timestamp"],
            _ => &[],
        }
    }

    /// Attributes every `<testsuite>` element must carry.
    pub fn required_testsuite_attributes(&self) -> &'static [&'static str] {
        match self {
            Self::Any => &["name"],
            Self::AntJUnit4 => &["name", "tests", "failures", "errors", "time"],
            Self::CTest => &[
                "name", "tests", "failures", "errors", "disabled", "skipped", "hostname", "time",
                "timestamp",
            ],
            Self::GoogleTest => &["name", "tests", "failures", "disabled", "errors", "time"],
            Self::PyTest => &["name", "tests", "failures", "errors", "skipped", "time"],
        }
    }

    /// Attributes every `<testcase>` element must carry.
    pub fn required_testcase_attributes(&self) -> &'static [&'static str] {
        match self {
            Self::Any | Self::PyTest => &["name", "classname"],
            Self::AntJUnit4 => &["name", "classname", "time"],
            Self::CTest => &["name", "classname", "time", "status"],
            Self::GoogleTest => &["name", "classname", "time", "status"],
        }
    }

    /// The dialect counts disabled tests separately from skipped ones.
    pub fn has_disabled_count(&self) -> bool {
        matches!(self, Self::CTest | Self::GoogleTest)
    }

    /// The dialect carries `status`/`result` attributes on testcases.
    pub fn has_status_attributes(&self) -> bool {
        matches!(self, Self::CTest | Self::GoogleTest)
    }

    /// Interpret the `status` attribute of a testcase.
    ///
    /// `Ok(None)` means the value does not decide the outcome by itself.
    pub fn parse_status_attribute(&self, value: &str) -> Result<Option<TestcaseStatus>, String> {
        let status = match (self, value) {
            (Self::CTest | Self::GoogleTest, "run") => None,
            (Self::CTest | Self::GoogleTest, "notrun") => Some(TestcaseStatus::SKIPPED),
            (Self::CTest, "disabled") => Some(TestcaseStatus::EXCLUDED),
            (Self::CTest, "fail") => Some(TestcaseStatus::FAILED),
            (Self::CTest | Self::GoogleTest, other) => {
                return Err(format!("unknown testcase status '{other}'"))
            }
            _ => None,
        };
        Ok(status)
    }

    /// Interpret the GoogleTest `result` attribute of a testcase.
    pub fn parse_result_attribute(&self, value: &str) -> Result<Option<TestcaseStatus>, String> {
        match (self, value) {
            (Self::GoogleTest | Self::CTest, "completed") => Ok(None),
            (Self::GoogleTest | Self::CTest, "skipped") => Ok(Some(TestcaseStatus::SKIPPED)),
            (Self::GoogleTest | Self::CTest, "suppressed") => Ok(Some(TestcaseStatus::EXCLUDED)),
            (Self::GoogleTest | Self::CTest, other) => Err(format!("unknown testcase result '{other}'")),
            _ => Ok(None),
        }
    }

    /// `status` and `result` attribute values written for a testcase status.
    pub fn status_attributes(&self, status: TestcaseStatus) -> Option<(&'static str, &'static str)> {
        if !self.has_status_attributes() {
            return None;
        }
        let primary = status.primary();
        let values = if primary == TestcaseStatus::EXCLUDED {
            match self {
                Self::CTest => ("disabled", "suppressed"),
                _ => ("notrun", "suppressed"),
            }
        } else if primary == TestcaseStatus::SKIPPED {
            match self {
                Self::CTest => ("notrun", "skipped"),
                _ => ("run", "skipped"),
            }
        } else if primary == TestcaseStatus::FAILED && *self == Self::CTest {
            ("fail", "completed")
        } else {
            ("run", "completed")
        };
        Some(values)
    }
}

impl std::fmt::Display for JUnitFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
