//! JUnit XML dialects.
//!
//! One adapter type serves all JUnit flavors; the differences between them
//! are described by [`JUnitFlavor`].

use std::path::Path;

use super::{Dialect, DialectAdapter, DialectReport};
use crate::config::{ReaderConfig, WriterConfig};
use crate::unittest::{TestsuiteSummary, UnittestError};

mod convert;
mod flavor;
pub mod model;
mod reader;
mod writer;
pub mod xml;

pub use convert::{
    from_testsuite_summary, to_testsuite_summary, ANNOTATION_PREFIX, KEY_FILE, KEY_HOSTNAME,
    KEY_CLASSNAME, KEY_LINE, KEY_MESSAGE, KEY_SYSTEM_ERR, KEY_SYSTEM_OUT, KEY_TEXT, KEY_TYPE,
};
pub use flavor::JUnitFlavor;
pub use model::{
    JUnitCounters, JUnitReport, JUnitResult, JUnitResultKind, JUnitTestcase, JUnitTestclass,
    JUnitTestsuite,
};
pub use reader::{read_report, DEFAULT_REPORT_NAME};
pub use writer::write_report;

/// Adapter for one JUnit flavor.
#[derive(Debug, Clone)]
pub struct JUnitAdapter {
    flavor: JUnitFlavor,
    reader: ReaderConfig,
    writer: WriterConfig,
}

impl JUnitAdapter {
    pub fn new(flavor: JUnitFlavor) -> Self {
        Self::with_config(flavor, ReaderConfig::default(), WriterConfig::default())
    }

    pub fn with_config(flavor: JUnitFlavor, reader: ReaderConfig, writer: WriterConfig) -> Self {
        Self {
            flavor,
            reader,
            writer,
        }
    }

    pub fn flavor(&self) -> JUnitFlavor {
        self.flavor
    }

    fn junit<'a>(&self, report: &'a DialectReport) -> Result<&'a JUnitReport, UnittestError> {
        match report {
            DialectReport::JUnit(junit) if junit.flavor == self.flavor => Ok(junit),
            _ => Err(self.mismatch(report)),
        }
    }
}

impl DialectAdapter for JUnitAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::JUnit(self.flavor)
    }

    fn parse(&self, path: &Path, content: &[u8]) -> Result<DialectReport, UnittestError> {
        read_report(path, content, self.flavor).map(DialectReport::JUnit)
    }

    fn to_testsuite_summary(&self, report: &DialectReport) -> Result<TestsuiteSummary, UnittestError> {
        to_testsuite_summary(self.junit(report)?, &self.reader)
    }

    fn from_testsuite_summary(&self, summary: &TestsuiteSummary) -> Result<DialectReport, UnittestError> {
        from_testsuite_summary(summary, self.flavor).map(DialectReport::JUnit)
    }

    fn serialize(&self, report: &DialectReport) -> Result<Vec<u8>, UnittestError> {
        write_report(self.junit(report)?, &self.writer)
    }
}
