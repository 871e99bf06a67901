//! Merging several reports of the same test tree into one.
//!
//! Typical use is combining the per-process or per-shard reports of a single
//! test run: suites are matched by name at every level, testcases found in
//! more than one report have their statuses combined.

use indexmap::IndexMap;
use tracing::debug;

use super::base::{sum_durations, Entity, EntityPath};
use super::error::UnittestError;
use super::testsuite::{Testsuite, TestsuiteAggregate, TestsuiteSummary};

/// A summary accumulating other summaries.
#[derive(Debug, Clone)]
pub struct MergedTestsuiteSummary {
    summary: TestsuiteSummary,
    merged_names: Vec<String>,
    /// How often an entity was seen; entities seen once are not recorded.
    merge_counts: IndexMap<EntityPath, usize>,
}

impl MergedTestsuiteSummary {
    pub fn new(name: impl Into<String>) -> Result<Self, UnittestError> {
        Ok(Self {
            summary: TestsuiteSummary::new(name)?,
            merged_names: Vec::new(),
            merge_counts: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.summary.name()
    }

    /// Number of summaries merged so far.
    pub fn merged_count(&self) -> usize {
        self.merged_names.len()
    }

    /// Names of the merged summaries in merge order.
    pub fn merged_names(&self) -> &[String] {
        &self.merged_names
    }

    /// How many merged reports contained the entity at `path`.
    ///
    /// Zero if the entity does not exist.
    pub fn merge_count_of(&self, path: &EntityPath) -> usize {
        if let Some(count) = self.merge_counts.get(path) {
            return *count;
        }
        let segments: Vec<&str> = path
            .segments()
            .iter()
            .skip(1)
            .map(String::as_str)
            .collect();
        let exists = match segments.split_last() {
            Some((last, parents)) => match self.summary.find(&segments) {
                Some(_) => true,
                None => self
                    .summary
                    .find(parents)
                    .is_some_and(|suite| suite.testcase(last).is_some()),
            },
            None => path.last() == Some(self.summary.name()),
        };
        usize::from(exists)
    }

    /// Merge a copy of `other` into this summary.
    pub fn merge(&mut self, other: &TestsuiteSummary) -> Result<(), UnittestError> {
        debug!(summary = other.name(), into = self.summary.name(), "merging testsuite summary");

        let start = match (self.summary.start_time(), other.start_time()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.summary.base_mut().start_time = start;

        for source in other.testsuites() {
            match self.summary.testsuite_mut(source.name()) {
                Some(target) => merge_suite(target, source, &mut self.merge_counts)?,
                None => {
                    self.summary.add_testsuite(source.copy())?;
                }
            }
        }

        self.merged_names.push(other.name().to_string());
        Ok(())
    }

    pub fn aggregate(&mut self, strict: bool) -> Result<TestsuiteAggregate, UnittestError> {
        self.summary.aggregate(strict)
    }

    /// Plain, aggregated summary with the merged content.
    pub fn to_testsuite_summary(&self) -> Result<TestsuiteSummary, UnittestError> {
        let mut summary = self.summary.copy();
        summary.aggregate(false)?;
        Ok(summary)
    }
}

fn merge_suite(
    target: &mut Testsuite,
    source: &Testsuite,
    counts: &mut IndexMap<EntityPath, usize>,
) -> Result<(), UnittestError> {
    bump(counts, target.path());

    let total = sum_durations([target.total_duration(), source.total_duration()]);
    target.base_mut().total_duration = total;

    for child in source.testsuites() {
        match target.testsuite_mut(child.name()) {
            Some(existing) => merge_suite(existing, child, counts)?,
            None => {
                target.add_testsuite(child.copy())?;
            }
        }
    }

    for testcase in source.testcases() {
        match target.testcase_mut(testcase.name()) {
            Some(existing) => {
                existing.absorb(testcase);
                bump(counts, existing.path());
            }
            None => {
                target.add_testcase(testcase.copy())?;
            }
        }
    }
    Ok(())
}

fn bump(counts: &mut IndexMap<EntityPath, usize>, path: EntityPath) {
    *counts.entry(path).or_insert(1) += 1;
}
