//! Report files on disk.
//!
//! A [`Document`] couples a path with the adapter of its dialect and walks
//! a file through the pipeline:
//!
//! ```text
//! read ──▶ analyze ──▶ convert ──▶ TestsuiteSummary
//!                                        │ (edit, merge, ...)
//! write ◀── serialize ◀── convert_from ◀─┘
//! ```
//!
//! The summary handed out is always an owned copy; editing it never changes
//! the document.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::Config;
use crate::dialect::{AdapterRegistry, Dialect, DialectAdapter, DialectReport};
use crate::unittest::{TestsuiteSummary, UnittestError};

pub struct Document {
    path: PathBuf,
    adapter: Arc<dyn DialectAdapter>,
    content: Option<Vec<u8>>,
    report: Option<DialectReport>,
    summary: Option<TestsuiteSummary>,
    analysis_duration: Option<Duration>,
    conversion_duration: Option<Duration>,
}

impl Document {
    /// Document of `dialect` at `path`, using the default adapter settings.
    ///
    /// Use [`Document::with_config`] to apply a loaded [`Config`].
    pub fn new(path: impl Into<PathBuf>, dialect: Dialect) -> Result<Self, UnittestError> {
        Self::with_config(path, dialect, &Config::default())
    }

    /// Document of `dialect` at `path` whose adapter follows the reader and
    /// writer settings of `config`.
    pub fn with_config(
        path: impl Into<PathBuf>,
        dialect: Dialect,
        config: &Config,
    ) -> Result<Self, UnittestError> {
        let adapter = AdapterRegistry::with_config(config).adapter(dialect)?;
        Ok(Self::with_adapter(path, adapter))
    }

    /// Document handled by an explicitly configured adapter.
    pub fn with_adapter(path: impl Into<PathBuf>, adapter: Arc<dyn DialectAdapter>) -> Self {
        Self {
            path: path.into(),
            adapter,
            content: None,
            report: None,
            summary: None,
            analysis_duration: None,
            conversion_duration: None,
        }
    }

    /// Read, analyze and convert the file at `path` with default settings.
    pub fn open(path: impl Into<PathBuf>, dialect: Dialect) -> Result<Self, UnittestError> {
        Self::open_with_config(path, dialect, &Config::default())
    }

    /// Like [`Document::open`], with the settings of `config`.
    pub fn open_with_config(
        path: impl Into<PathBuf>,
        dialect: Dialect,
        config: &Config,
    ) -> Result<Self, UnittestError> {
        let mut document = Self::with_config(path, dialect, config)?;
        document.read()?;
        document.analyze()?;
        document.convert()?;
        Ok(document)
    }

    /// Document at `path` holding `summary` converted into `dialect`.
    ///
    /// Nothing is written until [`Document::write`] is called.
    pub fn from_testsuite_summary(
        path: impl Into<PathBuf>,
        dialect: Dialect,
        summary: &TestsuiteSummary,
    ) -> Result<Self, UnittestError> {
        let mut document = Self::new(path, dialect)?;
        document.convert_from(summary)?;
        Ok(document)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.adapter.dialect()
    }

    /// Dialect specific entity tree, once analyzed or converted.
    pub fn report(&self) -> Option<&DialectReport> {
        self.report.as_ref()
    }

    /// Wall-clock time spent in [`Document::analyze`].
    pub fn analysis_duration(&self) -> Option<Duration> {
        self.analysis_duration
    }

    /// Wall-clock time spent converting between the dialect and canonical model.
    pub fn conversion_duration(&self) -> Option<Duration> {
        self.conversion_duration
    }

    /// Load the raw file content.
    pub fn read(&mut self) -> Result<(), UnittestError> {
        if !self.path.exists() {
            return Err(UnittestError::FileNotFound {
                path: self.path.clone(),
            });
        }
        let content = fs::read(&self.path).map_err(|e| UnittestError::io(&self.path, e))?;
        info!(path = %self.path.display(), bytes = content.len(), "read report");
        self.content = Some(content);
        Ok(())
    }

    /// Parse the content into the dialect entity tree, reading it first if needed.
    pub fn analyze(&mut self) -> Result<(), UnittestError> {
        if self.content.is_none() {
            self.read()?;
        }
        let content = self.content.as_deref().unwrap_or_default();

        let start = Instant::now();
        let report = self.adapter.parse(&self.path, content)?;
        let elapsed = start.elapsed();

        debug!(path = %self.path.display(), elapsed_us = elapsed.as_micros() as u64, "analyzed report");
        self.analysis_duration = Some(elapsed);
        self.report = Some(report);
        self.summary = None;
        Ok(())
    }

    /// Convert the analyzed report into the canonical model.
    pub fn convert(&mut self) -> Result<(), UnittestError> {
        let report = self.report.as_ref().ok_or_else(|| UnittestError::NotAnalyzed {
            path: self.path.clone(),
        })?;

        let start = Instant::now();
        let summary = self.adapter.to_testsuite_summary(report)?;
        let elapsed = start.elapsed();

        debug!(path = %self.path.display(), elapsed_us = elapsed.as_micros() as u64, "converted report");
        self.conversion_duration = Some(elapsed);
        self.summary = Some(summary);
        Ok(())
    }

    /// Replace the document content with `summary` converted into this dialect.
    pub fn convert_from(&mut self, summary: &TestsuiteSummary) -> Result<(), UnittestError> {
        let start = Instant::now();
        let report = self.adapter.from_testsuite_summary(summary)?;
        let elapsed = start.elapsed();

        debug!(path = %self.path.display(), elapsed_us = elapsed.as_micros() as u64, "converted summary");
        self.conversion_duration = Some(elapsed);
        self.report = Some(report);
        self.summary = Some(summary.copy());
        self.content = None;
        Ok(())
    }

    /// Owned copy of the canonical summary.
    ///
    /// Converts on the fly when [`Document::convert`] was not called.
    pub fn to_testsuite_summary(&self) -> Result<TestsuiteSummary, UnittestError> {
        match (&self.summary, &self.report) {
            (Some(summary), _) => Ok(summary.copy()),
            (None, Some(report)) => self.adapter.to_testsuite_summary(report),
            (None, None) => Err(UnittestError::NotAnalyzed {
                path: self.path.clone(),
            }),
        }
    }

    /// Write the report to the document's own path.
    pub fn write(&self, overwrite: bool) -> Result<(), UnittestError> {
        self.write_to(&self.path, overwrite)
    }

    /// Write the report to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<(), UnittestError> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            return Err(UnittestError::FileExists {
                path: path.to_path_buf(),
            });
        }
        let report = self.report.as_ref().ok_or_else(|| UnittestError::NotAnalyzed {
            path: self.path.clone(),
        })?;

        let bytes = self.adapter.serialize(report)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| UnittestError::io(parent, e))?;
            }
        }
        fs::write(path, &bytes).map_err(|e| UnittestError::io(path, e))?;

        info!(path = %path.display(), dialect = %self.dialect(), bytes = bytes.len(), "wrote report");
        Ok(())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("dialect", &self.dialect())
            .field("analyzed", &self.report.is_some())
            .finish()
    }
}
