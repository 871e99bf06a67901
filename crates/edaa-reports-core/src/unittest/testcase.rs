//! Leaf entity of the unified model.

use chrono::{Duration, NaiveDateTime};
use tracing::warn;

use super::base::{duration_as_secs, Entity, EntityBase, EntityPath};
use super::error::UnittestError;
use super::status::TestcaseStatus;

/// A single executed (or skipped) test.
#[derive(Debug, Clone, PartialEq)]
pub struct Testcase {
    base: EntityBase,
    status: TestcaseStatus,
    assertion_count: Option<u64>,
    passed_assertion_count: Option<u64>,
    failed_assertion_count: Option<u64>,
}

/// Values recomputed by [`Testcase::aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestcaseAggregate {
    pub status: TestcaseStatus,
    pub total_duration: Option<Duration>,
    pub assertion_count: Option<u64>,
    pub passed_assertion_count: Option<u64>,
    pub failed_assertion_count: Option<u64>,
    pub warning_count: u64,
    pub error_count: u64,
    pub fatal_count: u64,
}

impl Entity for Testcase {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}

impl Testcase {
    /// Create a detached testcase with unknown status.
    pub fn new(name: impl Into<String>) -> Result<Self, UnittestError> {
        Ok(Self {
            base: EntityBase::new(name)?,
            status: TestcaseStatus::UNKNOWN,
            assertion_count: None,
            passed_assertion_count: None,
            failed_assertion_count: None,
        })
    }

    pub fn with_status(mut self, status: TestcaseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_start_time(mut self, start_time: NaiveDateTime) -> Self {
        self.base.start_time = Some(start_time);
        self
    }

    pub fn with_setup_duration(mut self, duration: Duration) -> Self {
        self.base.setup_duration = Some(duration);
        self
    }

    pub fn with_test_duration(mut self, duration: Duration) -> Self {
        self.base.test_duration = Some(duration);
        self
    }

    pub fn with_teardown_duration(mut self, duration: Duration) -> Self {
        self.base.teardown_duration = Some(duration);
        self
    }

    pub fn with_total_duration(mut self, duration: Duration) -> Self {
        self.base.total_duration = Some(duration);
        self
    }

    pub fn with_counts(mut self, warnings: u64, errors: u64, fatals: u64) -> Self {
        self.base.warning_count = warnings;
        self.base.error_count = errors;
        self.base.fatal_count = fatals;
        self
    }

    pub fn with_assertion_count(mut self, count: u64) -> Self {
        self.assertion_count = Some(count);
        self
    }

    pub fn with_passed_assertion_count(mut self, count: u64) -> Self {
        self.passed_assertion_count = Some(count);
        self
    }

    pub fn with_failed_assertion_count(mut self, count: u64) -> Self {
        self.failed_assertion_count = Some(count);
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base.annotations.set(key, value);
        self
    }

    pub fn status(&self) -> TestcaseStatus {
        self.status
    }

    pub fn set_status(&mut self, status: TestcaseStatus) {
        self.status = status;
    }

    pub fn assertion_count(&self) -> Option<u64> {
        self.assertion_count
    }

    pub fn passed_assertion_count(&self) -> Option<u64> {
        self.passed_assertion_count
    }

    pub fn failed_assertion_count(&self) -> Option<u64> {
        self.failed_assertion_count
    }

    /// Deep copy without a parent.
    pub fn copy(&self) -> Self {
        let mut copy = self.clone();
        copy.base.parent = None;
        copy
    }

    pub(crate) fn set_parent(&mut self, parent: Option<EntityPath>) {
        self.base.parent = parent;
    }

    /// Fold another run of the same testcase into this one.
    ///
    /// Statuses are combined with [`TestcaseStatus::merge`], counts are
    /// added up, timing and annotations of `self` are kept.
    pub(crate) fn absorb(&mut self, other: &Testcase) {
        self.status = self.status.merge(other.status);
        self.base.warning_count += other.base.warning_count;
        self.base.error_count += other.base.error_count;
        self.base.fatal_count += other.base.fatal_count;
        self.assertion_count = add_optional(self.assertion_count, other.assertion_count);
        self.passed_assertion_count =
            add_optional(self.passed_assertion_count, other.passed_assertion_count);
        self.failed_assertion_count =
            add_optional(self.failed_assertion_count, other.failed_assertion_count);
    }

    /// Recompute derived durations, assertion counts and status.
    ///
    /// In strict mode contradicting inputs fail with
    /// [`UnittestError::AggregationConsistency`]; otherwise the computed
    /// value replaces the stored one.
    pub fn aggregate(&mut self, strict: bool) -> Result<TestcaseAggregate, UnittestError> {
        self.aggregate_durations(strict)?;
        self.aggregate_assertions(strict)?;
        self.derive_status(strict);

        Ok(TestcaseAggregate {
            status: self.status,
            total_duration: self.base.total_duration,
            assertion_count: self.assertion_count,
            passed_assertion_count: self.passed_assertion_count,
            failed_assertion_count: self.failed_assertion_count,
            warning_count: self.base.warning_count,
            error_count: self.base.error_count,
            fatal_count: self.base.fatal_count,
        })
    }

    fn aggregate_durations(&mut self, strict: bool) -> Result<(), UnittestError> {
        let base = &mut self.base;

        // A known total with a missing test part: the test part is the rest.
        if let (Some(total), None) = (base.total_duration, base.test_duration) {
            if base.setup_duration.is_some() || base.teardown_duration.is_some() {
                let overhead = base.setup_duration.unwrap_or_else(Duration::zero)
                    + base.teardown_duration.unwrap_or_else(Duration::zero);
                if total >= overhead {
                    base.test_duration = Some(total - overhead);
                }
            }
        }

        let Some(parts) = base.known_parts_sum() else {
            return Ok(());
        };

        match base.total_duration {
            None => base.total_duration = Some(parts),
            Some(total) => {
                let consistent = if base.all_parts_known() {
                    total == parts
                } else {
                    total >= parts
                };
                if !consistent {
                    if strict {
                        return Err(UnittestError::AggregationConsistency {
                            entity: base.path().to_string(),
                            field: "total duration",
                            stored: format!("{:.6}s", duration_as_secs(total)),
                            computed: format!("{:.6}s", duration_as_secs(parts)),
                        });
                    }
                    warn!(testcase = %base.path(), "total duration repaired from its parts");
                    base.total_duration = Some(parts);
                }
            }
        }
        Ok(())
    }

    fn aggregate_assertions(&mut self, strict: bool) -> Result<(), UnittestError> {
        let inconsistent = |stored: u64, computed: u64| UnittestError::AggregationConsistency {
            entity: self.base.path().to_string(),
            field: "assertion count",
            stored: stored.to_string(),
            computed: computed.to_string(),
        };

        match (
            self.assertion_count,
            self.passed_assertion_count,
            self.failed_assertion_count,
        ) {
            (stored, Some(passed), Some(failed)) => {
                let computed = passed + failed;
                if let Some(stored) = stored.filter(|s| *s != computed) {
                    if strict {
                        return Err(inconsistent(stored, computed));
                    }
                    warn!(testcase = %self.base.path(), "assertion count repaired from passed and failed counts");
                }
                self.assertion_count = Some(computed);
            }
            (Some(total), Some(passed), None) => {
                if passed > total {
                    if strict {
                        return Err(inconsistent(total, passed));
                    }
                    self.assertion_count = Some(passed);
                    self.failed_assertion_count = Some(0);
                } else {
                    self.failed_assertion_count = Some(total - passed);
                }
            }
            (Some(total), None, Some(failed)) => {
                if failed > total {
                    if strict {
                        return Err(inconsistent(total, failed));
                    }
                    self.assertion_count = Some(failed);
                    self.passed_assertion_count = Some(0);
                } else {
                    self.passed_assertion_count = Some(total - failed);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Status from assertions and alert counts, for testcases reported
    /// without one. In strict mode a fatal alert fails the testcase.
    fn derive_status(&mut self, strict: bool) {
        if self.status != TestcaseStatus::UNKNOWN {
            return;
        }

        self.status = match (self.assertion_count, self.failed_assertion_count) {
            (None, _) => TestcaseStatus::PASSED,
            (Some(0), _) => TestcaseStatus::WEAK,
            (Some(_), None) | (Some(_), Some(0)) => TestcaseStatus::PASSED,
            (Some(_), Some(_)) => TestcaseStatus::FAILED,
        };

        if self.base.warning_count > 0 {
            self.status |= TestcaseStatus::WARNED;
        }
        if self.base.error_count > 0 {
            self.status |= TestcaseStatus::ERRORED;
        }
        if self.base.fatal_count > 0 {
            self.status |= TestcaseStatus::ABORTED;
            if strict {
                self.status = self.status.modifiers() | TestcaseStatus::FAILED;
            }
        }
    }
}

fn add_optional(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_testcase_defaults() {
        let tc = Testcase::new("test_add").unwrap();
        assert_eq!(tc.name(), "test_add");
        assert_eq!(tc.status(), TestcaseStatus::UNKNOWN);
        assert!(tc.parent().is_none());
        assert!(tc.total_duration().is_none());
        assert_eq!(tc.warning_count(), 0);
    }

    #[test]
    fn test_total_from_parts() {
        let mut tc = Testcase::new("t")
            .unwrap()
            .with_setup_duration(Duration::milliseconds(100))
            .with_test_duration(Duration::milliseconds(800))
            .with_teardown_duration(Duration::milliseconds(100));
        let result = tc.aggregate(true).unwrap();
        assert_eq!(result.total_duration, Some(Duration::seconds(1)));
        assert_eq!(tc.total_duration(), Some(Duration::seconds(1)));
    }

    #[test]
    fn test_total_stays_unknown_without_parts() {
        let mut tc = Testcase::new("t").unwrap();
        assert_eq!(tc.aggregate(true).unwrap().total_duration, None);
    }

    #[test]
    fn test_strict_rejects_inconsistent_total() {
        let mut tc = Testcase::new("t")
            .unwrap()
            .with_setup_duration(Duration::seconds(1))
            .with_test_duration(Duration::seconds(1))
            .with_teardown_duration(Duration::seconds(1))
            .with_total_duration(Duration::seconds(5));
        let err = tc.clone().aggregate(true).unwrap_err();
        assert!(matches!(
            err,
            UnittestError::AggregationConsistency { field: "total duration", .. }
        ));

        let result = tc.aggregate(false).unwrap();
        assert_eq!(result.total_duration, Some(Duration::seconds(3)));
    }

    #[test]
    fn test_partial_parts_allow_larger_total() {
        let mut tc = Testcase::new("t")
            .unwrap()
            .with_test_duration(Duration::seconds(1))
            .with_total_duration(Duration::seconds(2));
        let result = tc.aggregate(true).unwrap();
        assert_eq!(result.total_duration, Some(Duration::seconds(2)));
    }

    #[test]
    fn test_test_duration_derived_from_total() {
        let mut tc = Testcase::new("t")
            .unwrap()
            .with_setup_duration(Duration::seconds(1))
            .with_total_duration(Duration::seconds(4));
        tc.aggregate(true).unwrap();
        assert_eq!(tc.test_duration(), Some(Duration::seconds(3)));
    }

    #[test]
    fn test_assertion_counts() {
        let mut tc = Testcase::new("t")
            .unwrap()
            .with_passed_assertion_count(7)
            .with_failed_assertion_count(2);
        let result = tc.aggregate(true).unwrap();
        assert_eq!(result.assertion_count, Some(9));
        assert_eq!(tc.status(), TestcaseStatus::FAILED);

        let mut tc = Testcase::new("t")
            .unwrap()
            .with_assertion_count(10)
            .with_passed_assertion_count(10);
        tc.aggregate(true).unwrap();
        assert_eq!(tc.failed_assertion_count(), Some(0));
        assert_eq!(tc.status(), TestcaseStatus::PASSED);
    }

    #[test]
    fn test_strict_rejects_inconsistent_assertions() {
        let mut tc = Testcase::new("t")
            .unwrap()
            .with_assertion_count(3)
            .with_passed_assertion_count(2)
            .with_failed_assertion_count(2);
        assert!(tc.clone().aggregate(true).is_err());
        assert_eq!(tc.aggregate(false).unwrap().assertion_count, Some(4));
    }

    #[test]
    fn test_status_derivation() {
        let mut weak = Testcase::new("t").unwrap().with_assertion_count(0);
        weak.aggregate(true).unwrap();
        assert_eq!(weak.status(), TestcaseStatus::WEAK);

        let mut warned = Testcase::new("t").unwrap().with_counts(1, 0, 1);
        let mut lenient = warned.clone();
        lenient.aggregate(false).unwrap();
        assert_eq!(
            lenient.status(),
            TestcaseStatus::PASSED | TestcaseStatus::WARNED | TestcaseStatus::ABORTED
        );
        warned.aggregate(true).unwrap();
        assert_eq!(
            warned.status(),
            TestcaseStatus::FAILED | TestcaseStatus::WARNED | TestcaseStatus::ABORTED
        );

        let mut weak_fatal = Testcase::new("t").unwrap().with_assertion_count(0).with_counts(0, 0, 2);
        weak_fatal.aggregate(true).unwrap();
        assert_eq!(weak_fatal.status(), TestcaseStatus::FAILED | TestcaseStatus::ABORTED);

        let mut explicit = Testcase::new("t")
            .unwrap()
            .with_status(TestcaseStatus::SKIPPED)
            .with_counts(1, 0, 0);
        explicit.aggregate(true).unwrap();
        assert_eq!(explicit.status(), TestcaseStatus::SKIPPED);
    }

    #[test]
    fn test_copy_is_detached() {
        let mut tc = Testcase::new("t").unwrap().with_annotation("seed", "1");
        tc.set_parent(Some(EntityPath::root("suite")));
        let copy = tc.copy();
        assert!(copy.parent().is_none());
        assert_eq!(copy.annotations().get("seed"), Some("1"));
        assert!(tc.parent().is_some());
    }

    #[test]
    fn test_absorb_merges_runs() {
        let mut first = Testcase::new("t")
            .unwrap()
            .with_status(TestcaseStatus::PASSED)
            .with_assertion_count(2)
            .with_counts(1, 0, 0);
        let second = Testcase::new("t")
            .unwrap()
            .with_status(TestcaseStatus::FAILED)
            .with_assertion_count(3);
        first.absorb(&second);
        assert_eq!(first.status(), TestcaseStatus::FAILED);
        assert_eq!(first.assertion_count(), Some(5));
        assert_eq!(first.warning_count(), 1);
    }
}
