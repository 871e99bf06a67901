//! JUnit-specific entity tree.
//!
//! Mirrors the XML structure: a report holds testsuites, testcases are
//! grouped by their classname into testclasses.

use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;

use super::flavor::JUnitFlavor;
use crate::unittest::{Annotations, TestcaseCategory, TestcaseStatus, UnittestError};

/// Kind of result element of a testcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JUnitResultKind {
    Skipped,
    Failure,
    Error,
}

impl JUnitResultKind {
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Failure => "failure",
            Self::Error => "error",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "skipped" => Some(Self::Skipped),
            "failure" => Some(Self::Failure),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn status(&self) -> TestcaseStatus {
        match self {
            Self::Skipped => TestcaseStatus::SKIPPED,
            Self::Failure => TestcaseStatus::FAILED,
            Self::Error => TestcaseStatus::ERRORED,
        }
    }

    /// Result element written for a status, `None` for passing tests.
    pub fn for_status(status: TestcaseStatus) -> Option<Self> {
        match status.category() {
            TestcaseCategory::Failed => Some(Self::Failure),
            TestcaseCategory::Errored | TestcaseCategory::Inconsistent => Some(Self::Error),
            TestcaseCategory::Skipped | TestcaseCategory::Excluded => Some(Self::Skipped),
            TestcaseCategory::Passed | TestcaseCategory::Weak | TestcaseCategory::Unknown => None,
        }
    }
}

/// `<skipped>`, `<failure>` or `<error>` with its details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JUnitResult {
    pub kind: JUnitResultKind,
    pub message: Option<String>,
    pub result_type: Option<String>,
    pub text: Option<String>,
}

impl JUnitResult {
    pub fn new(kind: JUnitResultKind) -> Self {
        Self {
            kind,
            message: None,
            result_type: None,
            text: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JUnitTestcase {
    pub name: String,
    pub classname: String,
    pub duration: Option<Duration>,
    pub timestamp: Option<NaiveDateTime>,
    pub assertions: Option<u64>,
    pub file: Option<String>,
    pub line: Option<u64>,
    pub status: TestcaseStatus,
    pub result: Option<JUnitResult>,
    pub system_out: Option<String>,
    pub system_err: Option<String>,
    pub properties: Annotations,
}

impl JUnitTestcase {
    pub fn new(name: impl Into<String>, classname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classname: classname.into(),
            duration: None,
            timestamp: None,
            assertions: None,
            file: None,
            line: None,
            status: TestcaseStatus::PASSED,
            result: None,
            system_out: None,
            system_err: None,
            properties: Annotations::new(),
        }
    }
}

/// Testcases sharing one classname.
#[derive(Debug, Clone, PartialEq)]
pub struct JUnitTestclass {
    pub name: String,
    pub testcases: IndexMap<String, JUnitTestcase>,
}

impl JUnitTestclass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            testcases: IndexMap::new(),
        }
    }
}

/// Counts written as attributes of `<testsuite>` and `<testsuites>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JUnitCounters {
    pub tests: u64,
    pub failures: u64,
    pub errors: u64,
    pub skipped: u64,
    pub disabled: u64,
}

impl JUnitCounters {
    fn count(&mut self, status: TestcaseStatus) {
        self.tests += 1;
        match status.category() {
            TestcaseCategory::Failed => self.failures += 1,
            TestcaseCategory::Errored | TestcaseCategory::Inconsistent => self.errors += 1,
            TestcaseCategory::Skipped => self.skipped += 1,
            TestcaseCategory::Excluded => self.disabled += 1,
            TestcaseCategory::Passed | TestcaseCategory::Weak | TestcaseCategory::Unknown => {}
        }
    }

    fn add(&mut self, other: &JUnitCounters) {
        self.tests += other.tests;
        self.failures += other.failures;
        self.errors += other.errors;
        self.skipped += other.skipped;
        self.disabled += other.disabled;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JUnitTestsuite {
    pub name: String,
    pub hostname: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    pub duration: Option<Duration>,
    pub properties: Annotations,
    pub system_out: Option<String>,
    pub system_err: Option<String>,
    pub testclasses: IndexMap<String, JUnitTestclass>,
    pub counters: JUnitCounters,
}

impl JUnitTestsuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hostname: None,
            timestamp: None,
            duration: None,
            properties: Annotations::new(),
            system_out: None,
            system_err: None,
            testclasses: IndexMap::new(),
            counters: JUnitCounters::default(),
        }
    }

    /// Insert a testcase into the testclass named by its classname.
    pub fn add_testcase(&mut self, testcase: JUnitTestcase) -> Result<(), UnittestError> {
        let testclass = self
            .testclasses
            .entry(testcase.classname.clone())
            .or_insert_with(|| JUnitTestclass::new(testcase.classname.clone()));
        if testclass.testcases.contains_key(&testcase.name) {
            return Err(UnittestError::DuplicateName {
                parent: format!("{}/{}", self.name, testclass.name),
                kind: "testcase",
                name: testcase.name,
            });
        }
        testclass.testcases.insert(testcase.name.clone(), testcase);
        Ok(())
    }

    /// Testcases of all testclasses in document order.
    pub fn testcases(&self) -> impl Iterator<Item = &JUnitTestcase> {
        self.testclasses.values().flat_map(|tc| tc.testcases.values())
    }

    /// Recompute the counters from the testcases.
    pub fn aggregate(&mut self) -> JUnitCounters {
        let mut counters = JUnitCounters::default();
        for testcase in self.testcases() {
            counters.count(testcase.status);
        }
        self.counters = counters;
        counters
    }
}

/// Content of one JUnit XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct JUnitReport {
    pub flavor: JUnitFlavor,
    pub name: String,
    pub timestamp: Option<NaiveDateTime>,
    pub duration: Option<Duration>,
    pub testsuites: IndexMap<String, JUnitTestsuite>,
    pub counters: JUnitCounters,
}

impl JUnitReport {
    pub fn new(flavor: JUnitFlavor, name: impl Into<String>) -> Self {
        Self {
            flavor,
            name: name.into(),
            timestamp: None,
            duration: None,
            testsuites: IndexMap::new(),
            counters: JUnitCounters::default(),
        }
    }

    pub fn add_testsuite(&mut self, testsuite: JUnitTestsuite) -> Result<&mut JUnitTestsuite, UnittestError> {
        if self.testsuites.contains_key(&testsuite.name) {
            return Err(UnittestError::DuplicateName {
                parent: self.name.clone(),
                kind: "testsuite",
                name: testsuite.name,
            });
        }
        Ok(self
            .testsuites
            .entry(testsuite.name.clone())
            .or_insert(testsuite))
    }

    /// Recompute the counters of all suites and of the report.
    pub fn aggregate(&mut self) -> JUnitCounters {
        let mut counters = JUnitCounters::default();
        for suite in self.testsuites.values_mut() {
            counters.add(&suite.aggregate());
        }
        self.counters = counters;
        counters
    }
}
