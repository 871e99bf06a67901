//! Restructuring passes for hierarchies derived from pytest classnames.
//!
//! pytest reports the Python module path as classname, so packages show up
//! as `__init__` suites and deep source layouts produce long suite chains.
//! These passes reshape a [`TestsuiteSummary`] before it is written out.

use tracing::debug;

use super::base::Entity;
use super::error::UnittestError;
use super::status::TestsuiteKind;
use super::testsuite::{Testsuite, TestsuiteSummary};

const DUNDER_INIT: &str = "__init__";

impl TestsuiteSummary {
    /// Fold every `__init__` suite into its parent suite.
    ///
    /// Returns the number of folded suites. On error the summary is left
    /// unchanged.
    pub fn rewrite_dunder_init(&mut self) -> Result<usize, UnittestError> {
        let mut folded = 0;
        let mut staged = Vec::new();
        for suite in self.testsuites() {
            let mut suite = suite.clone();
            folded += fold_dunder_init(&mut suite)?;
            staged.push(suite);
        }

        for suite in staged {
            if let Some(slot) = self.testsuite_mut(suite.name()) {
                *slot = suite;
            }
        }
        Ok(folded)
    }

    /// Lift the child suites of the suite at dotted `path` to the summary.
    ///
    /// The lifted suites become logical suites. Suites left empty along the
    /// path are removed. Returns `false` if `path` does not exist. A lifted
    /// suite whose name is already taken at the top level is an error, and
    /// nothing is moved.
    pub fn reduce_depth(&mut self, path: &str) -> Result<bool, UnittestError> {
        let segments: Vec<&str> = path.split('.').collect();
        let Some(target) = self.find(&segments) else {
            debug!(path, "reduce-depth target not found");
            return Ok(false);
        };
        self.check_lift(target)?;
        let Some(target) = self.find_mut(&segments) else {
            return Ok(false);
        };

        let (suites, testcases) = target.take_children();
        target.add_testcases(testcases)?;
        self.lift(suites)?;
        self.prune_empty(&segments);
        Ok(true)
    }

    /// Lift the child suites of top-level suite `name` to the summary.
    ///
    /// Returns `false` if there is no such suite. Name conflicts are
    /// reported before anything is moved.
    pub fn split(&mut self, name: &str) -> Result<bool, UnittestError> {
        let Some(target) = self.testsuite(name) else {
            debug!(name, "split target not found");
            return Ok(false);
        };
        self.check_lift(target)?;
        let Some(target) = self.testsuite_mut(name) else {
            return Ok(false);
        };

        let (suites, testcases) = target.take_children();
        target.add_testcases(testcases)?;
        self.lift(suites)?;
        self.prune_empty(&[name]);
        Ok(true)
    }

    /// Every child suite of `source` must be free to move to the top level.
    fn check_lift(&self, source: &Testsuite) -> Result<(), UnittestError> {
        match source.testsuites().find(|s| self.testsuite(s.name()).is_some()) {
            Some(conflict) => Err(UnittestError::DuplicateName {
                parent: self.path().to_string(),
                kind: "testsuite",
                name: conflict.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    fn lift(&mut self, suites: Vec<Testsuite>) -> Result<(), UnittestError> {
        for mut suite in suites {
            debug!(suite = suite.name(), into = self.name(), "lifting testsuite");
            suite.set_kind(TestsuiteKind::Logical);
            self.add_testsuite(suite)?;
        }
        Ok(())
    }

    /// Remove empty suites along `segments`, deepest first.
    fn prune_empty(&mut self, segments: &[&str]) {
        for depth in (1..=segments.len()).rev() {
            let chain = &segments[..depth];
            let empty = self.find(chain).is_some_and(|suite| !suite.has_children());
            if !empty {
                break;
            }

            let name = chain[depth - 1];
            if depth == 1 {
                self.remove_testsuite(name);
            } else if let Some(parent) = self.find_mut(&chain[..depth - 1]) {
                parent.remove_testsuite(name);
            }
        }
    }
}

fn fold_dunder_init(suite: &mut Testsuite) -> Result<usize, UnittestError> {
    let mut folded = 0;
    let mut pending: Vec<String> = suite.testsuites().map(|s| s.name().to_string()).collect();

    while let Some(name) = pending.pop() {
        if name == DUNDER_INIT {
            let Some(mut init) = suite.remove_testsuite(&name) else {
                continue;
            };
            let (suites, testcases) = init.take_children();
            pending.extend(suites.iter().map(|s| s.name().to_string()));
            suite.add_testsuites(suites)?;
            suite.add_testcases(testcases)?;
            folded += 1;
        } else if let Some(child) = suite.testsuite_mut(&name) {
            folded += fold_dunder_init(child)?;
        }
    }
    Ok(folded)
}
