//! The `unittest` subcommand.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use edaa_reports_core::unittest::Entity;
use edaa_reports_core::{AdapterRegistry, Config, Document, MergedTestsuiteSummary, TestsuiteSummary};
use tracing::{info, warn};

use crate::task::{parse_cleanups, parse_task, PytestCleanup, PytestCleanups, ReportTask};

#[derive(Args, Debug)]
pub struct UnittestArgs {
    /// Report to read, as <dialect>:<path>
    #[arg(long, value_parser = parse_task)]
    input: Option<ReportTask>,

    /// Reports to merge, as <dialect>:<glob> (repeatable)
    #[arg(long, value_parser = parse_task)]
    merge: Vec<ReportTask>,

    /// Name of the merged summary
    #[arg(long)]
    name: Option<String>,

    /// pytest cleanups, e.g. "rewrite-dunder-init;reduce-depth:a.b;split:tests"
    #[arg(long, value_parser = parse_cleanups)]
    pytest: Option<PytestCleanups>,

    /// Print the resulting summary
    #[arg(long, value_enum)]
    render: Option<Render>,

    /// Write the result, as <dialect>:<path> (repeatable)
    #[arg(long, value_parser = parse_task)]
    output: Vec<ReportTask>,

    /// Replace existing output files
    #[arg(long)]
    overwrite: bool,

    /// Fail on inconsistent durations and counts instead of repairing them
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Render {
    /// Hierarchy with status and counts
    Tree,
}

pub fn run(args: UnittestArgs, mut config: Config) -> Result<()> {
    if args.input.is_none() && args.merge.is_empty() {
        bail!("nothing to read: pass --input <dialect>:<path> or --merge <dialect>:<glob>");
    }
    if args.strict {
        config.reader.strict_aggregation = true;
    }
    let registry = AdapterRegistry::with_config(&config);

    let mut summaries = Vec::new();
    if let Some(task) = &args.input {
        summaries.push(read_summary(&registry, task, Path::new(&task.path))?);
    }
    for task in &args.merge {
        let paths = expand_glob(task)?;
        if paths.is_empty() {
            warn!(pattern = task.path.as_str(), "no files match merge pattern");
        }
        for path in paths {
            summaries.push(read_summary(&registry, task, &path)?);
        }
    }

    let mut summary = if args.merge.is_empty() && summaries.len() == 1 {
        summaries.remove(0)
    } else {
        let name = args.name.as_deref().unwrap_or(config.summary.name.as_str());
        let mut merged = MergedTestsuiteSummary::new(name)?;
        for summary in &summaries {
            merged.merge(summary)?;
        }
        info!(name, merged = merged.merged_count(), "merged summaries");
        merged.to_testsuite_summary()?
    };

    if let Some(PytestCleanups(cleanups)) = &args.pytest {
        apply_cleanups(&mut summary, cleanups)?;
        summary.aggregate(config.reader.strict_aggregation)?;
    }

    if args.render == Some(Render::Tree) {
        println!("{}", summary.render_tree());
    }

    let overwrite = args.overwrite || config.writer.overwrite;
    for task in &args.output {
        let adapter = registry.adapter(task.dialect)?;
        let mut document = Document::with_adapter(&task.path, adapter);
        document
            .convert_from(&summary)
            .wrap_err_with(|| format!("converting summary for {task}"))?;
        document
            .write(overwrite)
            .wrap_err_with(|| format!("writing {task}"))?;
    }

    info!(
        summary = summary.name(),
        status = %summary.status(),
        testcases = summary.testcase_count(),
        "done"
    );
    Ok(())
}

fn read_summary(registry: &AdapterRegistry, task: &ReportTask, path: &Path) -> Result<TestsuiteSummary> {
    let adapter = registry.adapter(task.dialect)?;
    let mut document = Document::with_adapter(path, adapter);
    document
        .analyze()
        .and_then(|_| document.convert())
        .wrap_err_with(|| format!("reading {} as {}", path.display(), task.dialect))?;
    info!(
        path = %path.display(),
        analysis_us = document.analysis_duration().map(|d| d.as_micros() as u64),
        conversion_us = document.conversion_duration().map(|d| d.as_micros() as u64),
        "loaded report"
    );
    Ok(document.to_testsuite_summary()?)
}

fn expand_glob(task: &ReportTask) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(&task.path).map_err(|e| eyre!("invalid pattern in {task}: {e}"))?;
    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry.wrap_err_with(|| format!("expanding {task}"))?);
    }
    paths.sort();
    Ok(paths)
}

fn apply_cleanups(summary: &mut TestsuiteSummary, cleanups: &[PytestCleanup]) -> Result<()> {
    for cleanup in cleanups {
        match cleanup {
            PytestCleanup::RewriteDunderInit => {
                let folded = summary.rewrite_dunder_init()?;
                info!(folded, "rewrote __init__ suites");
            }
            PytestCleanup::ReduceDepth(paths) => {
                for path in paths {
                    if !summary.reduce_depth(path)? {
                        warn!(path = path.as_str(), "reduce-depth: no such testsuite");
                    }
                }
            }
            PytestCleanup::Split(names) => {
                for name in names {
                    if !summary.split(name)? {
                        warn!(name = name.as_str(), "split: no such testsuite");
                    }
                }
            }
        }
    }
    Ok(())
}
