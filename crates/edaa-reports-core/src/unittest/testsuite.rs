//! Grouping entities of the unified model and the bottom-up aggregation.
//!
//! ## Components
//!
//! - [`Testsuite`]: internal node holding child suites and testcases
//! - [`TestsuiteSummary`]: root node of a report, holds suites only
//! - [`EntityIter`]: lazy traversal driven by an [`IterationScheme`]
//!
//! Suite statuses are never parsed from a report; they are always derived
//! from the testcases by [`Testsuite::aggregate`].

use std::fmt::Write as _;
use std::ops::AddAssign;

use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;
use tracing::warn;

use super::base::{duration_as_secs, sum_durations, validate_name, Entity, EntityBase, EntityPath};
use super::error::UnittestError;
use super::status::{
    IterationScheme, TestcaseCategory, TestcaseStatus, TestsuiteKind, TestsuiteStatus,
};
use super::testcase::Testcase;

/// Number of testcases per counting bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestsuiteCounters {
    pub tests: u64,
    pub inconsistent: u64,
    pub excluded: u64,
    pub skipped: u64,
    pub errored: u64,
    pub weak: u64,
    pub failed: u64,
    pub passed: u64,
    pub unknown: u64,
    /// Testcases whose primary outcome is Failed, whichever bucket they
    /// were counted in.
    pub failed_outcomes: u64,
}

impl TestsuiteCounters {
    /// Count a testcase by its category and its primary outcome.
    pub fn count_status(&mut self, status: TestcaseStatus) {
        self.count(status.category());
        if status.primary() == TestcaseStatus::FAILED {
            self.failed_outcomes += 1;
        }
    }

    pub fn count(&mut self, category: TestcaseCategory) {
        self.tests += 1;
        match category {
            TestcaseCategory::Unknown => self.unknown += 1,
            TestcaseCategory::Inconsistent => self.inconsistent += 1,
            TestcaseCategory::Excluded => self.excluded += 1,
            TestcaseCategory::Skipped => self.skipped += 1,
            TestcaseCategory::Errored => self.errored += 1,
            TestcaseCategory::Weak => self.weak += 1,
            TestcaseCategory::Failed => self.failed += 1,
            TestcaseCategory::Passed => self.passed += 1,
        }
    }
}

impl AddAssign for TestsuiteCounters {
    fn add_assign(&mut self, other: Self) {
        self.tests += other.tests;
        self.inconsistent += other.inconsistent;
        self.excluded += other.excluded;
        self.skipped += other.skipped;
        self.errored += other.errored;
        self.weak += other.weak;
        self.failed += other.failed;
        self.passed += other.passed;
        self.unknown += other.unknown;
        self.failed_outcomes += other.failed_outcomes;
    }
}

/// Values recomputed by [`Testsuite::aggregate`] and
/// [`TestsuiteSummary::aggregate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestsuiteAggregate {
    pub status: TestsuiteStatus,
    pub counters: TestsuiteCounters,
    pub testcase_count: u64,
    pub assertion_count: Option<u64>,
    pub total_duration: Option<Duration>,
    pub warning_count: u64,
    pub error_count: u64,
    pub fatal_count: u64,
}

/// Derived fields shared by suites and summaries.
#[derive(Debug, Clone, Default, PartialEq)]
struct Derived {
    status: TestsuiteStatus,
    counters: TestsuiteCounters,
    assertion_count: Option<u64>,
}

/// A group of testcases and nested testsuites.
#[derive(Debug, Clone, PartialEq)]
pub struct Testsuite {
    base: EntityBase,
    kind: TestsuiteKind,
    testsuites: IndexMap<String, Testsuite>,
    testcases: IndexMap<String, Testcase>,
    derived: Derived,
}

/// Root of a report: a named collection of testsuites.
#[derive(Debug, Clone, PartialEq)]
pub struct TestsuiteSummary {
    base: EntityBase,
    testsuites: IndexMap<String, Testsuite>,
    derived: Derived,
}

/// An entity yielded by tree iteration.
#[derive(Debug, Clone, Copy)]
pub enum TestEntity<'a> {
    Testsuite(&'a Testsuite),
    Testcase(&'a Testcase),
}

impl<'a> TestEntity<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            TestEntity::Testsuite(s) => &s.base.name,
            TestEntity::Testcase(t) => t.name(),
        }
    }

    pub fn as_testsuite(&self) -> Option<&'a Testsuite> {
        match *self {
            TestEntity::Testsuite(s) => Some(s),
            TestEntity::Testcase(_) => None,
        }
    }

    pub fn as_testcase(&self) -> Option<&'a Testcase> {
        match *self {
            TestEntity::Testcase(t) => Some(t),
            TestEntity::Testsuite(_) => None,
        }
    }
}

impl Entity for Testsuite {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}

impl Entity for TestsuiteSummary {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}

impl Testsuite {
    /// Create a detached logical testsuite.
    pub fn new(name: impl Into<String>) -> Result<Self, UnittestError> {
        Self::of_kind(name, TestsuiteKind::Logical)
    }

    /// Create a detached testsuite of the given kind.
    ///
    /// Suites synthesized from dotted names must not contain a dot, otherwise
    /// the name could not be collapsed back unambiguously.
    pub fn of_kind(name: impl Into<String>, kind: TestsuiteKind) -> Result<Self, UnittestError> {
        let name = name.into();
        validate_name(&name)?;
        if kind.is_split_origin() && name.contains('.') {
            return Err(UnittestError::invalid_name(
                name,
                format!("a {kind} testsuite name must not contain the '.' separator"),
            ));
        }

        Ok(Self {
            base: EntityBase::new(name)?,
            kind,
            testsuites: IndexMap::new(),
            testcases: IndexMap::new(),
            derived: Derived::default(),
        })
    }

    pub fn with_start_time(mut self, start_time: NaiveDateTime) -> Self {
        self.base.start_time = Some(start_time);
        self
    }

    pub fn with_setup_duration(mut self, duration: Duration) -> Self {
        self.base.setup_duration = Some(duration);
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

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base.annotations.set(key, value);
        self
    }

    pub fn kind(&self) -> TestsuiteKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: TestsuiteKind) {
        self.kind = kind;
    }

    pub fn status(&self) -> TestsuiteStatus {
        self.derived.status
    }

    pub fn counters(&self) -> TestsuiteCounters {
        self.derived.counters
    }

    /// Number of testcases below this suite, transitively.
    pub fn testcase_count(&self) -> u64 {
        self.derived.counters.tests
    }

    pub fn assertion_count(&self) -> Option<u64> {
        self.derived.assertion_count
    }

    pub fn testsuite(&self, name: &str) -> Option<&Testsuite> {
        self.testsuites.get(name)
    }

    pub fn testsuite_mut(&mut self, name: &str) -> Option<&mut Testsuite> {
        self.testsuites.get_mut(name)
    }

    pub fn testcase(&self, name: &str) -> Option<&Testcase> {
        self.testcases.get(name)
    }

    pub fn testcase_mut(&mut self, name: &str) -> Option<&mut Testcase> {
        self.testcases.get_mut(name)
    }

    /// Direct child suites in insertion order.
    pub fn testsuites(&self) -> impl DoubleEndedIterator<Item = &Testsuite> {
        self.testsuites.values()
    }

    /// Direct testcases in insertion order.
    pub fn testcases(&self) -> impl DoubleEndedIterator<Item = &Testcase> {
        self.testcases.values()
    }

    pub fn has_children(&self) -> bool {
        !self.testsuites.is_empty() || !self.testcases.is_empty()
    }

    /// Insert a child suite and return it.
    pub fn add_testsuite(&mut self, suite: Testsuite) -> Result<&mut Testsuite, UnittestError> {
        let parent = self.path();
        insert_testsuite(&mut self.testsuites, parent, suite)
    }

    pub fn add_testsuites<I>(&mut self, suites: I) -> Result<(), UnittestError>
    where
        I: IntoIterator<Item = Testsuite>,
    {
        for suite in suites {
            self.add_testsuite(suite)?;
        }
        Ok(())
    }

    /// Insert a testcase and return it.
    pub fn add_testcase(&mut self, mut testcase: Testcase) -> Result<&mut Testcase, UnittestError> {
        let name = testcase.name().to_string();
        if self.testcases.contains_key(&name) {
            return Err(UnittestError::DuplicateName {
                parent: self.path().to_string(),
                kind: "testcase",
                name,
            });
        }
        testcase.set_parent(Some(self.path()));
        Ok(self.testcases.entry(name).or_insert(testcase))
    }

    pub fn add_testcases<I>(&mut self, testcases: I) -> Result<(), UnittestError>
    where
        I: IntoIterator<Item = Testcase>,
    {
        for testcase in testcases {
            self.add_testcase(testcase)?;
        }
        Ok(())
    }

    /// Existing child suite `name`, or a new one of `kind`.
    pub fn ensure_testsuite(
        &mut self,
        name: &str,
        kind: TestsuiteKind,
    ) -> Result<&mut Testsuite, UnittestError> {
        let parent = self.path();
        ensure_testsuite(&mut self.testsuites, parent, name, kind)
    }

    /// Detach and return a child suite.
    pub fn remove_testsuite(&mut self, name: &str) -> Option<Testsuite> {
        self.testsuites.shift_remove(name).map(|mut suite| {
            suite.reparent(None);
            suite
        })
    }

    pub fn remove_testcase(&mut self, name: &str) -> Option<Testcase> {
        self.testcases.shift_remove(name).map(|mut testcase| {
            testcase.set_parent(None);
            testcase
        })
    }

    /// Detach all children, leaving this suite empty.
    pub fn take_children(&mut self) -> (Vec<Testsuite>, Vec<Testcase>) {
        let suites = self
            .testsuites
            .drain(..)
            .map(|(_, mut suite)| {
                suite.reparent(None);
                suite
            })
            .collect();
        let testcases = self
            .testcases
            .drain(..)
            .map(|(_, mut testcase)| {
                testcase.set_parent(None);
                testcase
            })
            .collect();
        (suites, testcases)
    }

    /// Deep copy without a parent.
    pub fn copy(&self) -> Self {
        let mut copy = self.clone();
        copy.reparent(None);
        copy
    }

    pub(crate) fn reparent(&mut self, parent: Option<EntityPath>) {
        self.base.parent = parent;
        let own = self.base.path();
        for suite in self.testsuites.values_mut() {
            suite.reparent(Some(own.clone()));
        }
        for testcase in self.testcases.values_mut() {
            testcase.set_parent(Some(own.clone()));
        }
    }

    /// Lazily walk this suite according to `scheme`.
    pub fn iterate(&self, scheme: IterationScheme) -> EntityIter<'_> {
        EntityIter {
            stack: vec![Step::Expand {
                suite: self,
                emit_self: scheme.contains(IterationScheme::INCLUDE_SELF),
                descend: true,
            }],
            scheme,
        }
    }

    /// All testcases below this suite, depth first.
    pub fn iterate_testcases(&self) -> impl Iterator<Item = &Testcase> {
        self.iterate(IterationScheme::TESTCASE_DEFAULT)
            .filter_map(|entity| entity.as_testcase())
    }

    /// All suites below this suite, pre-order.
    pub fn iterate_testsuites(&self) -> impl Iterator<Item = &Testsuite> {
        self.iterate(IterationScheme::TESTSUITE_DEFAULT)
            .filter_map(|entity| entity.as_testsuite())
    }

    /// Recompute all derived values of this subtree, children first.
    pub fn aggregate(&mut self, strict: bool) -> Result<TestsuiteAggregate, UnittestError> {
        let result = aggregate_node(
            &mut self.base,
            self.testsuites.values_mut(),
            self.testcases.values_mut(),
            strict,
        )?;
        self.derived = Derived {
            status: result.status,
            counters: result.counters,
            assertion_count: result.assertion_count,
        };
        Ok(result)
    }

    fn render_into(&self, out: &mut String, prefix: &str) {
        let entries = self.testsuites.len() + self.testcases.len();
        let mut index = 0;

        for suite in self.testsuites.values() {
            index += 1;
            let last = index == entries;
            let _ = writeln!(
                out,
                "{prefix}{}{} [{}] ({} tests)",
                connector(last),
                suite.base.name,
                suite.status(),
                suite.testcase_count()
            );
            suite.render_into(out, &format!("{prefix}{}", continuation(last)));
        }

        for testcase in self.testcases.values() {
            index += 1;
            let _ = writeln!(
                out,
                "{prefix}{}{}: {}{}",
                connector(index == entries),
                testcase.name(),
                testcase.status(),
                render_duration(testcase.total_duration())
            );
        }
    }
}

impl TestsuiteSummary {
    pub fn new(name: impl Into<String>) -> Result<Self, UnittestError> {
        Ok(Self {
            base: EntityBase::new(name)?,
            testsuites: IndexMap::new(),
            derived: Derived::default(),
        })
    }

    pub fn with_start_time(mut self, start_time: NaiveDateTime) -> Self {
        self.base.start_time = Some(start_time);
        self
    }

    pub fn with_total_duration(mut self, duration: Duration) -> Self {
        self.base.total_duration = Some(duration);
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base.annotations.set(key, value);
        self
    }

    pub fn status(&self) -> TestsuiteStatus {
        self.derived.status
    }

    pub fn counters(&self) -> TestsuiteCounters {
        self.derived.counters
    }

    pub fn testcase_count(&self) -> u64 {
        self.derived.counters.tests
    }

    pub fn assertion_count(&self) -> Option<u64> {
        self.derived.assertion_count
    }

    pub fn testsuite(&self, name: &str) -> Option<&Testsuite> {
        self.testsuites.get(name)
    }

    pub fn testsuite_mut(&mut self, name: &str) -> Option<&mut Testsuite> {
        self.testsuites.get_mut(name)
    }

    pub fn testsuites(&self) -> impl DoubleEndedIterator<Item = &Testsuite> {
        self.testsuites.values()
    }

    pub fn testsuite_count(&self) -> usize {
        self.testsuites.len()
    }

    /// Suite reached by following child names from the summary.
    pub fn find(&self, path: &[&str]) -> Option<&Testsuite> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.testsuites.get(*first)?, |suite, name| suite.testsuite(name))
    }

    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut Testsuite> {
        let (first, rest) = path.split_first()?;
        let mut suite = self.testsuites.get_mut(*first)?;
        for name in rest {
            suite = suite.testsuite_mut(name)?;
        }
        Some(suite)
    }

    pub fn add_testsuite(&mut self, suite: Testsuite) -> Result<&mut Testsuite, UnittestError> {
        let parent = self.path();
        insert_testsuite(&mut self.testsuites, parent, suite)
    }

    pub fn add_testsuites<I>(&mut self, suites: I) -> Result<(), UnittestError>
    where
        I: IntoIterator<Item = Testsuite>,
    {
        for suite in suites {
            self.add_testsuite(suite)?;
        }
        Ok(())
    }

    /// Always fails: a summary holds testsuites only.
    pub fn add_testcase(&mut self, testcase: Testcase) -> Result<&mut Testcase, UnittestError> {
        Err(UnittestError::structure(
            self.path(),
            format!(
                "testcase '{}' cannot be added to a testsuite summary",
                testcase.name()
            ),
        ))
    }

    pub fn ensure_testsuite(
        &mut self,
        name: &str,
        kind: TestsuiteKind,
    ) -> Result<&mut Testsuite, UnittestError> {
        let parent = self.path();
        ensure_testsuite(&mut self.testsuites, parent, name, kind)
    }

    pub fn remove_testsuite(&mut self, name: &str) -> Option<Testsuite> {
        self.testsuites.shift_remove(name).map(|mut suite| {
            suite.reparent(None);
            suite
        })
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Lazily walk all suites of this summary according to `scheme`.
    ///
    /// The summary itself is never yielded.
    pub fn iterate(&self, scheme: IterationScheme) -> EntityIter<'_> {
        let mut iter = EntityIter {
            stack: Vec::new(),
            scheme,
        };
        iter.push_suites(self.testsuites.values());
        iter
    }

    pub fn iterate_testcases(&self) -> impl Iterator<Item = &Testcase> {
        self.iterate(IterationScheme::TESTCASE_DEFAULT)
            .filter_map(|entity| entity.as_testcase())
    }

    pub fn iterate_testsuites(&self) -> impl Iterator<Item = &Testsuite> {
        self.iterate(IterationScheme::TESTSUITE_DEFAULT)
            .filter_map(|entity| entity.as_testsuite())
    }

    pub fn aggregate(&mut self, strict: bool) -> Result<TestsuiteAggregate, UnittestError> {
        let result = aggregate_node(
            &mut self.base,
            self.testsuites.values_mut(),
            std::iter::empty(),
            strict,
        )?;
        self.derived = Derived {
            status: result.status,
            counters: result.counters,
            assertion_count: result.assertion_count,
        };
        Ok(result)
    }

    /// Render the hierarchy as an indented tree with status per entity.
    pub fn render_tree(&self) -> String {
        let counters = self.counters();
        let mut out = format!(
            "{} [{}] ({} tests: {} passed, {} failed, {} errored, {} skipped){}\n",
            self.base.name,
            self.status(),
            counters.tests,
            counters.passed,
            counters.failed,
            counters.errored,
            counters.skipped + counters.excluded,
            render_duration(self.base.total_duration)
        );

        let count = self.testsuites.len();
        for (index, suite) in self.testsuites.values().enumerate() {
            let last = index + 1 == count;
            let _ = writeln!(
                out,
                "{}{} [{}] ({} tests)",
                connector(last),
                suite.base.name,
                suite.status(),
                suite.testcase_count()
            );
            suite.render_into(&mut out, continuation(last));
        }
        out
    }
}

fn insert_testsuite(
    testsuites: &mut IndexMap<String, Testsuite>,
    parent: EntityPath,
    mut suite: Testsuite,
) -> Result<&mut Testsuite, UnittestError> {
    let name = suite.base.name.clone();
    if testsuites.contains_key(&name) {
        return Err(UnittestError::DuplicateName {
            parent: parent.to_string(),
            kind: "testsuite",
            name,
        });
    }
    suite.reparent(Some(parent));
    Ok(testsuites.entry(name).or_insert(suite))
}

fn ensure_testsuite<'a>(
    testsuites: &'a mut IndexMap<String, Testsuite>,
    parent: EntityPath,
    name: &str,
    kind: TestsuiteKind,
) -> Result<&'a mut Testsuite, UnittestError> {
    if !testsuites.contains_key(name) {
        insert_testsuite(testsuites, parent, Testsuite::of_kind(name, kind)?)?;
    }
    testsuites.get_mut(name).ok_or_else(|| {
        UnittestError::structure(name, "testsuite vanished during insertion")
    })
}

/// Bottom-up recomputation shared by suites and summaries.
fn aggregate_node<'a>(
    base: &mut EntityBase,
    testsuites: impl Iterator<Item = &'a mut Testsuite>,
    testcases: impl Iterator<Item = &'a mut Testcase>,
    strict: bool,
) -> Result<TestsuiteAggregate, UnittestError> {
    let mut counters = TestsuiteCounters::default();
    let mut modifiers = TestsuiteStatus::empty();
    let mut assertions: Option<u64> = None;
    let mut durations = Vec::new();
    let (mut warnings, mut errors, mut fatals) = (0, 0, 0);
    let mut has_children = false;

    for suite in testsuites {
        has_children = true;
        let child = suite.aggregate(strict)?;
        counters += child.counters;
        modifiers |= child.status.modifiers();
        assertions = add_optional(assertions, child.assertion_count);
        durations.push(child.total_duration);
        warnings += child.warning_count;
        errors += child.error_count;
        fatals += child.fatal_count;
    }

    for testcase in testcases {
        has_children = true;
        let child = testcase.aggregate(strict)?;
        counters.count_status(child.status);
        modifiers |= TestsuiteStatus::modifiers_of(child.status);
        assertions = add_optional(assertions, child.assertion_count);
        durations.push(child.total_duration);
        warnings += child.warning_count;
        errors += child.error_count;
        fatals += child.fatal_count;
    }

    if has_children {
        base.warning_count = warnings;
        base.error_count = errors;
        base.fatal_count = fatals;
    }

    if let Some(children) = sum_durations(durations) {
        let computed = sum_durations([base.setup_duration, Some(children), base.teardown_duration])
            .unwrap_or(children);
        match base.total_duration {
            None => base.total_duration = Some(computed),
            // Suite totals include runner overhead, so they may exceed the sum.
            Some(total) if total < computed => {
                if strict {
                    return Err(UnittestError::AggregationConsistency {
                        entity: base.path().to_string(),
                        field: "total duration",
                        stored: format!("{:.6}s", duration_as_secs(total)),
                        computed: format!("{:.6}s", duration_as_secs(computed)),
                    });
                }
                warn!(testsuite = %base.path(), "total duration raised to the sum of its children");
                base.total_duration = Some(computed);
            }
            Some(_) => {}
        }
    }

    Ok(TestsuiteAggregate {
        status: derive_status(&counters) | modifiers,
        counters,
        testcase_count: counters.tests,
        assertion_count: assertions,
        total_duration: base.total_duration,
        warning_count: base.warning_count,
        error_count: base.error_count,
        fatal_count: base.fatal_count,
    })
}

fn derive_status(counters: &TestsuiteCounters) -> TestsuiteStatus {
    if counters.tests == 0 {
        TestsuiteStatus::EMPTY
    } else if counters.failed_outcomes > 0 {
        TestsuiteStatus::FAILED
    } else if counters.excluded == counters.tests {
        TestsuiteStatus::EXCLUDED
    } else if counters.skipped + counters.excluded == counters.tests {
        TestsuiteStatus::SKIPPED
    } else {
        TestsuiteStatus::PASSED
    }
}

fn add_optional(acc: Option<u64>, value: Option<u64>) -> Option<u64> {
    match (acc, value) {
        (None, None) => None,
        (a, v) => Some(a.unwrap_or(0) + v.unwrap_or(0)),
    }
}

fn connector(last: bool) -> &'static str {
    if last {
        "└── "
    } else {
        "├── "
    }
}

fn continuation(last: bool) -> &'static str {
    if last {
        "    "
    } else {
        "│   "
    }
}

fn render_duration(duration: Option<Duration>) -> String {
    duration
        .map(|d| format!(" in {:.3}s", duration_as_secs(d)))
        .unwrap_or_default()
}

enum Step<'a> {
    Expand {
        suite: &'a Testsuite,
        emit_self: bool,
        descend: bool,
    },
    Emit(TestEntity<'a>),
}

/// Depth-first iterator over a suite tree.
///
/// Holds an explicit work stack, so iteration is lazy and can be restarted
/// by calling `iterate` again.
pub struct EntityIter<'a> {
    stack: Vec<Step<'a>>,
    scheme: IterationScheme,
}

impl<'a> EntityIter<'a> {
    fn post_order(&self) -> bool {
        self.scheme.contains(IterationScheme::POSTORDER)
            && !self.scheme.contains(IterationScheme::PREORDER)
    }

    /// Push child suites so they pop in document order.
    fn push_suites<I>(&mut self, suites: I)
    where
        I: DoubleEndedIterator<Item = &'a Testsuite>,
    {
        let include = self.scheme.contains(IterationScheme::INCLUDE_TESTSUITES);
        let recursive = self.scheme.contains(IterationScheme::RECURSIVE);
        for suite in suites.rev() {
            if recursive {
                self.stack.push(Step::Expand {
                    suite,
                    emit_self: include,
                    descend: true,
                });
            } else if include {
                self.stack.push(Step::Emit(TestEntity::Testsuite(suite)));
            }
        }
    }

    fn push_testcases<I>(&mut self, testcases: I)
    where
        I: DoubleEndedIterator<Item = &'a Testcase>,
    {
        if self.scheme.contains(IterationScheme::INCLUDE_TESTCASES) {
            for testcase in testcases.rev() {
                self.stack.push(Step::Emit(TestEntity::Testcase(testcase)));
            }
        }
    }
}

impl<'a> Iterator for EntityIter<'a> {
    type Item = TestEntity<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Emit(entity) => return Some(entity),
                Step::Expand {
                    suite,
                    emit_self,
                    descend,
                } => {
                    let post_order = self.post_order();
                    if post_order && emit_self {
                        self.stack.push(Step::Emit(TestEntity::Testsuite(suite)));
                    }
                    if descend {
                        if post_order {
                            self.push_testcases(suite.testcases.values());
                            self.push_suites(suite.testsuites.values());
                        } else {
                            self.push_suites(suite.testsuites.values());
                            self.push_testcases(suite.testcases.values());
                        }
                    }
                    if !post_order && emit_self {
                        return Some(TestEntity::Testsuite(suite));
                    }
                }
            }
        }
        None
    }
}
