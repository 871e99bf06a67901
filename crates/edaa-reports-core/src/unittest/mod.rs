//! Unified data model for unit test reports.
//!
//! Every supported report dialect converts into and out of this model. The
//! tree is strictly owned from the root: a [`TestsuiteSummary`] owns its
//! [`Testsuite`]s, which own nested suites and [`Testcase`]s. Children refer
//! back to their ancestors by [`EntityPath`] only.
//!
//! ## Components
//!
//! - **Status**: bit-flag outcomes for testcases and testsuites
//! - **Entities**: testcases, testsuites and summaries with shared base data
//! - **Aggregation**: bottom-up recomputation of durations, counts and status
//! - **Merge**: combining several summaries of one test run
//! - **Cleanup**: restructuring passes for pytest-derived hierarchies

mod annotations;
mod base;
mod cleanup;
mod error;
mod merge;
mod status;
mod testcase;
mod testsuite;

pub use annotations::Annotations;
pub use base::{
    duration_as_secs, duration_from_secs, format_timestamp, parse_timestamp, sum_durations,
    validate_name, Entity, EntityBase, EntityPath,
};
pub use error::UnittestError;
pub use merge::MergedTestsuiteSummary;
pub use status::{IterationScheme, TestcaseCategory, TestcaseStatus, TestsuiteKind, TestsuiteStatus};
pub use testcase::{Testcase, TestcaseAggregate};
pub use testsuite::{
    EntityIter, TestEntity, Testsuite, TestsuiteAggregate, TestsuiteCounters, TestsuiteSummary,
};
