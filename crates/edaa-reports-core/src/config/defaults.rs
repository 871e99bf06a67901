//! Default values for edaa-reports configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Reader Defaults
// ============================================================================

/// Fail on aggregation inconsistencies instead of repairing them.
pub const DEFAULT_STRICT_AGGREGATION: bool = false;

/// Keep the JUnit `<testsuite>` layer above the classname hierarchy.
pub const DEFAULT_DECOUPLE_CLASSNAME_HIERARCHY: bool = false;

// ============================================================================
// Writer Defaults
// ============================================================================

/// Refuse to replace existing report files.
pub const DEFAULT_OVERWRITE: bool = false;

/// XML indentation width in spaces.
pub const DEFAULT_INDENT: usize = 2;

/// Decimals written for `time` attributes (microseconds).
pub const DEFAULT_TIME_PRECISION: usize = 6;

// ============================================================================
// Summary Defaults
// ============================================================================

/// Name of merged summaries.
pub const DEFAULT_SUMMARY_NAME: &str = "TestsuiteSummary";

// ============================================================================
// File Locations
// ============================================================================

/// Project-local config file.
pub const PROJECT_CONFIG_FILE: &str = "edaa-reports.toml";

/// Directory below the user config directory.
pub const USER_CONFIG_DIR: &str = "edaa-reports";

/// File name inside [`USER_CONFIG_DIR`].
pub const USER_CONFIG_FILE: &str = "config.toml";
