//! Report dialects and their adapters.
//!
//! A dialect adapter turns the bytes of one report format into a dialect
//! specific entity tree, converts that tree into the canonical
//! [`TestsuiteSummary`] and back, and serializes it again.
//!
//! # Example
//!
//! ```ignore
//! let registry = AdapterRegistry::new();
//! let adapter = registry.adapter("ant-junit".parse()?)?;
//! let report = adapter.parse(path, &bytes)?;
//! let summary = adapter.to_testsuite_summary(&report)?;
//! ```

use std::path::Path;
use std::str::FromStr;

use crate::unittest::{TestsuiteSummary, UnittestError};

pub mod junit;
pub mod osvvm;
mod registry;

pub use junit::{JUnitAdapter, JUnitFlavor, JUnitReport};
pub use osvvm::{OsvvmAdapter, OsvvmReport};
pub use registry::AdapterRegistry;

/// One supported report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    JUnit(JUnitFlavor),
    OsvvmYaml,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::JUnit(JUnitFlavor::Any),
        Dialect::JUnit(JUnitFlavor::AntJUnit4),
        Dialect::JUnit(JUnitFlavor::CTest),
        Dialect::JUnit(JUnitFlavor::GoogleTest),
        Dialect::JUnit(JUnitFlavor::PyTest),
        Dialect::OsvvmYaml,
    ];

    /// Identifier used on the command line, e.g. `ant-junit`.
    pub fn identifier(&self) -> &'static str {
        match self {
            Dialect::JUnit(JUnitFlavor::Any) => "any-junit",
            Dialect::JUnit(JUnitFlavor::AntJUnit4) => "ant-junit",
            Dialect::JUnit(JUnitFlavor::CTest) => "ctest-junit",
            Dialect::JUnit(JUnitFlavor::GoogleTest) => "gtest-junit",
            Dialect::JUnit(JUnitFlavor::PyTest) => "pytest-junit",
            Dialect::OsvvmYaml => "osvvm-yaml",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::JUnit(flavor) => flavor.display_name(),
            Dialect::OsvvmYaml => "OSVVM-YAML",
        }
    }

    /// Comma separated list of all identifiers, for error messages.
    pub fn known_identifiers() -> String {
        Self::ALL
            .iter()
            .map(Dialect::identifier)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Dialect {
    type Err = UnittestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.identifier() == wanted)
            .ok_or_else(|| UnittestError::UnknownDialect {
                identifier: s.to_string(),
                known: Self::known_identifiers(),
            })
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Dialect specific entity tree of one document.
#[derive(Debug, Clone, PartialEq)]
pub enum DialectReport {
    JUnit(JUnitReport),
    Osvvm(OsvvmReport),
}

impl DialectReport {
    pub fn dialect(&self) -> Dialect {
        match self {
            DialectReport::JUnit(report) => Dialect::JUnit(report.flavor),
            DialectReport::Osvvm(_) => Dialect::OsvvmYaml,
        }
    }
}

/// Format-specific reading, conversion and writing.
///
/// Implementations hold no per-document state; one adapter serves any
/// number of documents of its dialect.
pub trait DialectAdapter: Send + Sync {
    /// Dialect handled by this adapter.
    fn dialect(&self) -> Dialect;

    /// Parse document `content` read from `path`.
    ///
    /// `path` only serves error messages.
    fn parse(&self, path: &Path, content: &[u8]) -> Result<DialectReport, UnittestError>;

    /// Convert a parsed report into an aggregated canonical summary.
    fn to_testsuite_summary(&self, report: &DialectReport) -> Result<TestsuiteSummary, UnittestError>;

    /// Convert a canonical summary into this dialect's entity tree.
    fn from_testsuite_summary(&self, summary: &TestsuiteSummary) -> Result<DialectReport, UnittestError>;

    /// Serialize a report into the dialect's file format.
    fn serialize(&self, report: &DialectReport) -> Result<Vec<u8>, UnittestError>;

    /// Error for a report of another dialect handed to this adapter.
    fn mismatch(&self, report: &DialectReport) -> UnittestError {
        UnittestError::DialectMismatch {
            expected: self.dialect().identifier().to_string(),
            found: report.dialect().identifier().to_string(),
        }
    }
}
