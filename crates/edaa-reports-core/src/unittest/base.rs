//! Fields and behavior shared by every test entity.
//!
//! ## Components
//!
//! - [`EntityBase`]: name, parent path, timing, runtime counts and annotations
//! - [`EntityPath`]: non-owning back-reference from a child to its ancestors
//! - duration and timestamp helpers used by the dialect adapters

use chrono::{DateTime, Duration, NaiveDateTime};

use super::annotations::Annotations;
use super::error::UnittestError;

/// Names of all ancestors of an entity, root first.
///
/// Children never hold references to their parents; they store the path of
/// the containing suite instead. Parents update the path when a child is
/// inserted, so the tree stays strictly owned from the root down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EntityPath(Vec<String>);

impl EntityPath {
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Path of a child named `name` below this path.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Name of the entity the path points to.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for EntityPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Check that a name can identify an entity among its siblings.
pub fn validate_name(name: &str) -> Result<(), UnittestError> {
    if name.trim().is_empty() {
        return Err(UnittestError::invalid_name(
            name,
            "name must not be empty or whitespace",
        ));
    }
    Ok(())
}

/// Base data of testcases, testsuites and summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBase {
    pub(crate) name: String,
    pub(crate) parent: Option<EntityPath>,
    pub(crate) start_time: Option<NaiveDateTime>,
    pub(crate) setup_duration: Option<Duration>,
    pub(crate) test_duration: Option<Duration>,
    pub(crate) teardown_duration: Option<Duration>,
    pub(crate) total_duration: Option<Duration>,
    pub(crate) warning_count: u64,
    pub(crate) error_count: u64,
    pub(crate) fatal_count: u64,
    pub(crate) annotations: Annotations,
}

impl EntityBase {
    pub fn new(name: impl Into<String>) -> Result<Self, UnittestError> {
        let name = name.into();
        validate_name(&name)?;

        Ok(Self {
            name,
            parent: None,
            start_time: None,
            setup_duration: None,
            test_duration: None,
            teardown_duration: None,
            total_duration: None,
            warning_count: 0,
            error_count: 0,
            fatal_count: 0,
            annotations: Annotations::new(),
        })
    }

    /// Path of this entity itself: parent path plus own name.
    pub fn path(&self) -> EntityPath {
        match &self.parent {
            Some(parent) => parent.child(&self.name),
            None => EntityPath::root(&self.name),
        }
    }

    /// Sum of the known duration parts, or `None` if none is known.
    pub(crate) fn known_parts_sum(&self) -> Option<Duration> {
        sum_durations([
            self.setup_duration,
            self.test_duration,
            self.teardown_duration,
        ])
    }

    pub(crate) fn all_parts_known(&self) -> bool {
        self.setup_duration.is_some()
            && self.test_duration.is_some()
            && self.teardown_duration.is_some()
    }
}

/// Accessors shared by all entity types.
///
/// Implementors only provide [`Entity::base`] / [`Entity::base_mut`].
pub trait Entity {
    fn base(&self) -> &EntityBase;
    fn base_mut(&mut self) -> &mut EntityBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    /// Path of the containing suite, `None` for detached entities and roots.
    fn parent(&self) -> Option<&EntityPath> {
        self.base().parent.as_ref()
    }

    fn path(&self) -> EntityPath {
        self.base().path()
    }

    fn start_time(&self) -> Option<NaiveDateTime> {
        self.base().start_time
    }

    fn setup_duration(&self) -> Option<Duration> {
        self.base().setup_duration
    }

    fn test_duration(&self) -> Option<Duration> {
        self.base().test_duration
    }

    fn teardown_duration(&self) -> Option<Duration> {
        self.base().teardown_duration
    }

    fn total_duration(&self) -> Option<Duration> {
        self.base().total_duration
    }

    fn warning_count(&self) -> u64 {
        self.base().warning_count
    }

    fn error_count(&self) -> u64 {
        self.base().error_count
    }

    fn fatal_count(&self) -> u64 {
        self.base().fatal_count
    }

    fn annotations(&self) -> &Annotations {
        &self.base().annotations
    }

    fn annotations_mut(&mut self) -> &mut Annotations {
        &mut self.base_mut().annotations
    }
}

/// Add up durations, ignoring unknown ones. `None` if all are unknown.
pub fn sum_durations<I>(durations: I) -> Option<Duration>
where
    I: IntoIterator<Item = Option<Duration>>,
{
    durations
        .into_iter()
        .flatten()
        .fold(None, |acc: Option<Duration>, d| {
            Some(acc.unwrap_or_else(Duration::zero) + d)
        })
}

/// Convert fractional seconds as found in report files.
pub fn duration_from_secs(seconds: f64) -> Duration {
    Duration::microseconds((seconds * 1_000_000.0).round() as i64)
}

pub fn duration_as_secs(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => duration.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Parse an ISO-8601 timestamp with or without offset.
///
/// Offsets are dropped; the wall-clock time of the report is kept.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"]
        .iter()
        .find_map(|format| {
            NaiveDateTime::parse_from_str(value, format)
                .ok()
                .or_else(|| DateTime::parse_from_str(value, format).ok().map(|dt| dt.naive_local()))
        })
}

pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
