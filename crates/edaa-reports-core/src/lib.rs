//! Unified unit test reports.
//!
//! Reads unit test result files of several dialects (JUnit variants,
//! OSVVM YAML) into one canonical model, lets callers aggregate, merge and
//! restructure it, and writes it back in any supported dialect.

pub mod config;
pub mod dialect;
pub mod document;
pub mod unittest;

pub use config::Config;
pub use dialect::{AdapterRegistry, Dialect, DialectAdapter, DialectReport, JUnitFlavor};
pub use document::Document;
pub use unittest::{
    MergedTestsuiteSummary, Testcase, TestcaseStatus, Testsuite, TestsuiteKind, TestsuiteStatus,
    TestsuiteSummary, UnittestError,
};
