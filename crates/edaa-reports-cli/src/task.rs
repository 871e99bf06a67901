//! Command line values: report tasks and pytest cleanups.

use std::fmt;

use edaa_reports_core::Dialect;

/// A report file (or glob pattern) of a dialect, written `<dialect>:<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTask {
    pub dialect: Dialect,
    pub path: String,
}

impl fmt::Display for ReportTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dialect, self.path)
    }
}

/// Parse `<dialect>:<path>`; the path may contain further colons.
pub fn parse_task(value: &str) -> Result<ReportTask, String> {
    let (identifier, path) = value
        .split_once(':')
        .ok_or_else(|| format!("expected <dialect>:<path>, got '{value}'"))?;
    if path.is_empty() {
        return Err(format!("missing path in '{value}'"));
    }
    let dialect: Dialect = identifier.parse().map_err(|e| format!("{e}"))?;
    Ok(ReportTask {
        dialect,
        path: path.to_string(),
    })
}

/// One restructuring pass for pytest-derived summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PytestCleanup {
    RewriteDunderInit,
    ReduceDepth(Vec<String>),
    Split(Vec<String>),
}

/// Ordered list of cleanups, written `rewrite-dunder-init;reduce-depth:a.b;split:x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PytestCleanups(pub Vec<PytestCleanup>);

pub fn parse_cleanups(value: &str) -> Result<PytestCleanups, String> {
    let mut cleanups = Vec::new();
    for part in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (command, arguments) = match part.split_once(':') {
            Some((command, arguments)) => (command, Some(arguments)),
            None => (part, None),
        };
        let names = || -> Result<Vec<String>, String> {
            let names: Vec<String> = arguments
                .unwrap_or_default()
                .split(':')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                Err(format!("'{command}' needs at least one argument"))
            } else {
                Ok(names)
            }
        };

        let cleanup = match command {
            "rewrite-dunder-init" => PytestCleanup::RewriteDunderInit,
            "reduce-depth" => PytestCleanup::ReduceDepth(names()?),
            "split" => PytestCleanup::Split(names()?),
            other => return Err(format!("unknown pytest cleanup '{other}'")),
        };
        cleanups.push(cleanup);
    }
    Ok(PytestCleanups(cleanups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edaa_reports_core::JUnitFlavor;

    #[test]
    fn test_parse_task() {
        let task = parse_task("ant-junit:reports/TEST-a.xml").unwrap();
        assert_eq!(task.dialect, Dialect::JUnit(JUnitFlavor::AntJUnit4));
        assert_eq!(task.path, "reports/TEST-a.xml");

        let task = parse_task("osvvm-yaml:C:/build/summary.yml").unwrap();
        assert_eq!(task.path, "C:/build/summary.yml");
    }

    #[test]
    fn test_parse_task_errors() {
        assert!(parse_task("report.xml").is_err());
        assert!(parse_task("ant-junit:").is_err());
        let err = parse_task("nunit:report.xml").unwrap_err();
        assert!(err.contains("pytest-junit"));
    }

    #[test]
    fn test_parse_cleanups() {
        let cleanups = parse_cleanups("rewrite-dunder-init; reduce-depth:a.b:c;split:tests").unwrap();
        assert_eq!(
            cleanups.0,
            vec![
                PytestCleanup::RewriteDunderInit,
                PytestCleanup::ReduceDepth(vec!["a.b".to_string(), "c".to_string()]),
                PytestCleanup::Split(vec!["tests".to_string()]),
            ]
        );
        assert!(parse_cleanups("split").is_err());
        assert!(parse_cleanups("flatten:x").is_err());
    }
}
