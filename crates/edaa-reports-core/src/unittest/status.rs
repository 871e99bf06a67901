//! Status, kind and iteration vocabularies of the unified test entity model.
//!
//! Statuses are bit sets: the low bits (covered by `MASK`) hold exactly one
//! primary outcome, the higher bits hold modifiers that can be combined freely
//! with any outcome. Testcase and testsuite statuses share bit positions for
//! every modifier, so modifiers can be lifted from testcases to suites without
//! translation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Outcome of a single testcase.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TestcaseStatus: u32 {
        /// Testcase was excluded by configuration (e.g. disabled).
        const EXCLUDED = 1 << 0;
        /// Testcase was not run.
        const SKIPPED = 1 << 1;
        /// Testcase ran but checked nothing (zero assertions).
        const WEAK = 1 << 2;
        const PASSED = 1 << 3;
        const FAILED = 1 << 4;

        /// Group of all primary outcomes.
        const MASK = Self::EXCLUDED.bits()
            | Self::SKIPPED.bits()
            | Self::WEAK.bits()
            | Self::PASSED.bits()
            | Self::FAILED.bits();

        /// The expected outcome was inverted (expected-to-fail tests).
        const INVERTED = 1 << 7;
        const UNEXPECTED_PASSED = Self::FAILED.bits() | Self::INVERTED.bits();
        const EXPECTED_FAILED = Self::PASSED.bits() | Self::INVERTED.bits();

        const WARNED = 1 << 10;
        const ERRORED = 1 << 11;
        const ABORTED = 1 << 12;
        const SETUP_ERROR = 1 << 13;
        const TEARDOWN_ERROR = 1 << 14;
        /// Reported counts contradict each other.
        const INCONSISTENT = 1 << 15;

        /// Group of all modifiers except `INVERTED`.
        const FLAGS = Self::WARNED.bits()
            | Self::ERRORED.bits()
            | Self::ABORTED.bits()
            | Self::SETUP_ERROR.bits()
            | Self::TEARDOWN_ERROR.bits()
            | Self::INCONSISTENT.bits();
    }
}

bitflags! {
    /// Outcome of a testsuite, derived from its children by aggregation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TestsuiteStatus: u32 {
        const EXCLUDED = 1 << 0;
        const SKIPPED = 1 << 1;
        /// Testsuite contains no testcases.
        const EMPTY = 1 << 2;
        const PASSED = 1 << 3;
        const FAILED = 1 << 4;

        const MASK = Self::EXCLUDED.bits()
            | Self::SKIPPED.bits()
            | Self::EMPTY.bits()
            | Self::PASSED.bits()
            | Self::FAILED.bits();

        const WARNED = 1 << 10;
        const ERRORED = 1 << 11;
        const ABORTED = 1 << 12;
        const SETUP_ERROR = 1 << 13;
        const TEARDOWN_ERROR = 1 << 14;
        const INCONSISTENT = 1 << 15;

        const FLAGS = Self::WARNED.bits()
            | Self::ERRORED.bits()
            | Self::ABORTED.bits()
            | Self::SETUP_ERROR.bits()
            | Self::TEARDOWN_ERROR.bits()
            | Self::INCONSISTENT.bits();
    }
}

/// Counting bucket of a testcase status.
///
/// Used for the per-suite counters and by writers choosing a result element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestcaseCategory {
    Unknown,
    Inconsistent,
    Excluded,
    Skipped,
    Errored,
    Weak,
    Failed,
    Passed,
}

impl TestcaseStatus {
    pub const UNKNOWN: Self = Self::empty();

    /// Primary outcome without modifiers.
    pub fn primary(self) -> Self {
        self & Self::MASK
    }

    /// Modifiers without the primary outcome.
    pub fn modifiers(self) -> Self {
        self & (Self::FLAGS | Self::INVERTED)
    }

    pub fn is_unknown(self) -> bool {
        self.primary().is_empty()
    }

    /// Combine the statuses of the same testcase taken from two reports.
    ///
    /// Primary outcomes follow a fixed table (a failure anywhere wins over
    /// passes and skips, a skip defers to the other side); modifiers are or-ed.
    pub fn merge(self, other: Self) -> Self {
        let own = self.primary();
        let theirs = other.primary();

        let primary = if own == Self::EXCLUDED {
            if theirs == Self::EXCLUDED {
                Self::EXCLUDED
            } else {
                Self::UNKNOWN
            }
        } else if own == Self::SKIPPED {
            if theirs.is_empty() || theirs == Self::EXCLUDED {
                Self::UNKNOWN
            } else {
                theirs
            }
        } else if own == Self::WEAK {
            if theirs == Self::WEAK {
                Self::WEAK
            } else {
                Self::UNKNOWN
            }
        } else if own == Self::PASSED {
            if theirs == Self::FAILED {
                Self::FAILED
            } else if theirs == Self::SKIPPED || theirs == Self::PASSED {
                Self::PASSED
            } else {
                Self::UNKNOWN
            }
        } else if own == Self::FAILED {
            if theirs == Self::SKIPPED || theirs == Self::PASSED || theirs == Self::FAILED {
                Self::FAILED
            } else {
                Self::UNKNOWN
            }
        } else {
            Self::UNKNOWN
        };

        primary | self.modifiers() | other.modifiers()
    }

    /// Counting bucket. Checked in order: inconsistent, failed, any error
    /// modifier, then the primary outcome.
    pub fn category(self) -> TestcaseCategory {
        let error_flags =
            Self::ERRORED | Self::ABORTED | Self::SETUP_ERROR | Self::TEARDOWN_ERROR;
        let primary = self.primary();

        if self.contains(Self::INCONSISTENT) {
            TestcaseCategory::Inconsistent
        } else if primary == Self::FAILED {
            TestcaseCategory::Failed
        } else if self.intersects(error_flags) {
            TestcaseCategory::Errored
        } else if primary == Self::EXCLUDED {
            TestcaseCategory::Excluded
        } else if primary == Self::SKIPPED {
            TestcaseCategory::Skipped
        } else if primary == Self::WEAK {
            TestcaseCategory::Weak
        } else if primary == Self::PASSED {
            TestcaseCategory::Passed
        } else {
            TestcaseCategory::Unknown
        }
    }

    /// Human-readable name, e.g. `Passed`, `ExpectedFailed`, `Failed+Warned`.
    pub fn display_name(self) -> String {
        let primary = if self.contains(Self::INVERTED) {
            match self.primary() {
                p if p == Self::FAILED => "UnexpectedPassed",
                p if p == Self::PASSED => "ExpectedFailed",
                p => primary_name(p.bits()),
            }
        } else {
            primary_name(self.primary().bits())
        };

        join_modifiers(primary, self.bits())
    }
}

impl TestsuiteStatus {
    pub const UNKNOWN: Self = Self::empty();

    pub fn primary(self) -> Self {
        self & Self::MASK
    }

    pub fn modifiers(self) -> Self {
        self & Self::FLAGS
    }

    /// Suite modifiers lifted from a testcase status.
    pub fn modifiers_of(status: TestcaseStatus) -> Self {
        Self::from_bits_truncate(status.bits()) & Self::FLAGS
    }

    /// The single most important outcome carried by this status.
    ///
    /// Priority, highest first: aborted, setup/teardown error, errored,
    /// failed, warned, skipped/excluded, passed, empty.
    pub fn dominant(self) -> Self {
        const ORDER: [TestsuiteStatus; 10] = [
            TestsuiteStatus::ABORTED,
            TestsuiteStatus::SETUP_ERROR,
            TestsuiteStatus::TEARDOWN_ERROR,
            TestsuiteStatus::ERRORED,
            TestsuiteStatus::FAILED,
            TestsuiteStatus::WARNED,
            TestsuiteStatus::SKIPPED,
            TestsuiteStatus::EXCLUDED,
            TestsuiteStatus::PASSED,
            TestsuiteStatus::EMPTY,
        ];

        ORDER
            .into_iter()
            .find(|flag| self.contains(*flag))
            .unwrap_or(Self::UNKNOWN)
    }

    /// True unless the suite failed or carries an error modifier.
    pub fn is_success(self) -> bool {
        let bad = Self::FAILED
            | Self::ERRORED
            | Self::ABORTED
            | Self::SETUP_ERROR
            | Self::TEARDOWN_ERROR
            | Self::INCONSISTENT;
        !self.intersects(bad)
    }

    pub fn display_name(self) -> String {
        let primary = if self.primary() == Self::EMPTY {
            "Empty"
        } else {
            primary_name(self.primary().bits())
        };
        join_modifiers(primary, self.bits())
    }
}

impl std::fmt::Display for TestcaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::fmt::Display for TestsuiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

fn primary_name(bits: u32) -> &'static str {
    match bits {
        0 => "Unknown",
        1 => "Excluded",
        2 => "Skipped",
        4 => "Weak",
        8 => "Passed",
        16 => "Failed",
        _ => "Invalid",
    }
}

fn join_modifiers(primary: &str, bits: u32) -> String {
    const MODIFIERS: [(u32, &str); 6] = [
        (1 << 10, "Warned"),
        (1 << 11, "Errored"),
        (1 << 12, "Aborted"),
        (1 << 13, "SetupError"),
        (1 << 14, "TearDownError"),
        (1 << 15, "Inconsistent"),
    ];

    let mut name = primary.to_string();
    for (bit, label) in MODIFIERS {
        if bits & bit != 0 {
            name.push('+');
            name.push_str(label);
        }
    }
    name
}

/// Origin of a testsuite.
///
/// Kinds above `Logical` mark suites synthesized by splitting a dotted name
/// (e.g. a JUnit classname) into a hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TestsuiteKind {
    Root,
    #[default]
    Logical,
    Namespace,
    Package,
    Module,
    Class,
}

impl TestsuiteKind {
    pub fn is_split_origin(&self) -> bool {
        *self > TestsuiteKind::Logical
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Logical => "logical",
            Self::Namespace => "namespace",
            Self::Package => "package",
            Self::Module => "module",
            Self::Class => "class",
        }
    }
}

impl std::fmt::Display for TestsuiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

bitflags! {
    /// Selects which entities a tree iteration yields and in which order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IterationScheme: u32 {
        /// Yield the suite the iteration was started on.
        const INCLUDE_SELF = 1 << 0;
        const INCLUDE_TESTSUITES = 1 << 1;
        const INCLUDE_TESTCASES = 1 << 2;
        /// Descend into nested suites.
        const RECURSIVE = 1 << 3;
        /// Parents before children.
        const PREORDER = 1 << 4;
        /// Children before parents.
        const POSTORDER = 1 << 5;

        const DEFAULT = Self::INCLUDE_TESTSUITES.bits()
            | Self::INCLUDE_TESTCASES.bits()
            | Self::RECURSIVE.bits()
            | Self::PREORDER.bits();
        const TESTSUITE_DEFAULT = Self::INCLUDE_TESTSUITES.bits()
            | Self::RECURSIVE.bits()
            | Self::PREORDER.bits();
        const TESTCASE_DEFAULT = Self::INCLUDE_TESTCASES.bits() | Self::RECURSIVE.bits();
    }
}

impl Default for IterationScheme {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_are_aliases() {
        assert_eq!(
            TestcaseStatus::UNEXPECTED_PASSED,
            TestcaseStatus::FAILED | TestcaseStatus::INVERTED
        );
        assert_eq!(
            TestcaseStatus::EXPECTED_FAILED.primary(),
            TestcaseStatus::PASSED
        );
        assert!(TestcaseStatus::UNKNOWN.is_unknown());
    }

    #[test]
    fn test_modifier_bits_shared_with_suites() {
        let status = TestcaseStatus::PASSED | TestcaseStatus::WARNED | TestcaseStatus::INVERTED;
        let lifted = TestsuiteStatus::modifiers_of(status);
        assert_eq!(lifted, TestsuiteStatus::WARNED);
    }

    #[test]
    fn test_merge_table() {
        use TestcaseStatus as S;
        assert_eq!(S::PASSED.merge(S::FAILED), S::FAILED);
        assert_eq!(S::PASSED.merge(S::SKIPPED), S::PASSED);
        assert_eq!(S::SKIPPED.merge(S::PASSED), S::PASSED);
        assert_eq!(S::SKIPPED.merge(S::EXCLUDED), S::UNKNOWN);
        assert_eq!(S::FAILED.merge(S::PASSED), S::FAILED);
        assert_eq!(S::EXCLUDED.merge(S::EXCLUDED), S::EXCLUDED);
        assert_eq!(S::WEAK.merge(S::PASSED), S::UNKNOWN);
        assert_eq!(
            (S::PASSED | S::WARNED).merge(S::PASSED | S::ERRORED),
            S::PASSED | S::WARNED | S::ERRORED
        );
    }

    #[test]
    fn test_category_order() {
        use TestcaseStatus as S;
        assert_eq!(S::PASSED.category(), TestcaseCategory::Passed);
        assert_eq!((S::FAILED | S::ERRORED).category(), TestcaseCategory::Failed);
        assert_eq!((S::PASSED | S::ERRORED).category(), TestcaseCategory::Errored);
        assert_eq!(S::ERRORED.category(), TestcaseCategory::Errored);
        assert_eq!(
            (S::FAILED | S::INCONSISTENT).category(),
            TestcaseCategory::Inconsistent
        );
        assert_eq!(S::UNKNOWN.category(), TestcaseCategory::Unknown);
    }

    #[test]
    fn test_dominant_priority() {
        use TestsuiteStatus as S;
        assert_eq!((S::FAILED | S::ABORTED).dominant(), S::ABORTED);
        assert_eq!((S::FAILED | S::ERRORED).dominant(), S::ERRORED);
        assert_eq!((S::PASSED | S::WARNED).dominant(), S::WARNED);
        assert_eq!(S::SKIPPED.dominant(), S::SKIPPED);
        assert_eq!(S::EMPTY.dominant(), S::EMPTY);
        assert_eq!(S::UNKNOWN.dominant(), S::UNKNOWN);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TestcaseStatus::EXPECTED_FAILED.to_string(), "ExpectedFailed");
        assert_eq!(
            (TestcaseStatus::FAILED | TestcaseStatus::WARNED).to_string(),
            "Failed+Warned"
        );
        assert_eq!(TestsuiteStatus::PASSED.to_string(), "Passed");
    }

    #[test]
    fn test_kind_split_origin() {
        assert!(!TestsuiteKind::Root.is_split_origin());
        assert!(!TestsuiteKind::Logical.is_split_origin());
        assert!(TestsuiteKind::Package.is_split_origin());
        assert!(TestsuiteKind::Class.is_split_origin());
    }

    #[test]
    fn test_iteration_scheme_default() {
        let scheme = IterationScheme::default();
        assert!(scheme.contains(IterationScheme::INCLUDE_TESTCASES));
        assert!(scheme.contains(IterationScheme::PREORDER));
        assert!(!scheme.contains(IterationScheme::INCLUDE_SELF));
    }
}
