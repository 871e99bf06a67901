use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../edaa-reports-core/tests/data")
        .join(name)
}

/// Run the binary inside `dir` so no project config file is picked up.
fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_edaa-reports"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_dialects_lists_identifiers() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["dialects"]);
    assert!(output.status.success());

    let text = stdout(&output);
    for identifier in ["any-junit", "ant-junit", "ctest-junit", "gtest-junit", "pytest-junit", "osvvm-yaml"] {
        assert!(text.contains(identifier), "missing {identifier} in:\n{text}");
    }
}

#[test]
fn test_render_tree() {
    let temp = TempDir::new().unwrap();
    let input = format!("ant-junit:{}", fixture("ant_junit4.xml").display());
    let output = run(temp.path(), &["unittest", "--input", &input, "--render", "tree"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.starts_with("pyEDAA.Reports [Failed] (4 tests"));
    assert!(text.contains("Arith"));
    assert!(text.contains("test_sub: Failed"));
}

#[test]
fn test_convert_to_other_dialect() {
    let temp = TempDir::new().unwrap();
    let input = format!("ctest-junit:{}", fixture("ctest.xml").display());
    let target = temp.path().join("out/report.yml");
    let output_arg = format!("osvvm-yaml:{}", target.display());

    let output = run(temp.path(), &["unittest", "--input", &input, "--output", &output_arg]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let yaml = fs::read_to_string(&target).unwrap();
    assert!(yaml.contains("Linux-c++"));
    assert!(yaml.contains("FAILED"));
}

#[test]
fn test_existing_output_needs_overwrite() {
    let temp = TempDir::new().unwrap();
    let input = format!("gtest-junit:{}", fixture("gtest.xml").display());
    let target = temp.path().join("merged.xml");
    fs::write(&target, "old").unwrap();
    let output_arg = format!("any-junit:{}", target.display());

    let refused = run(temp.path(), &["unittest", "--input", &input, "--output", &output_arg]);
    assert!(!refused.status.success());
    assert_eq!(fs::read_to_string(&target).unwrap(), "old");

    let replaced = run(
        temp.path(),
        &["unittest", "--input", &input, "--output", &output_arg, "--overwrite"],
    );
    assert!(replaced.status.success());
    assert!(fs::read_to_string(&target).unwrap().contains("<testsuites"));
}

#[test]
fn test_merge_glob() {
    let temp = TempDir::new().unwrap();
    let shards = temp.path().join("shards");
    fs::create_dir(&shards).unwrap();
    for name in ["a.xml", "b.xml"] {
        fs::copy(fixture("gtest.xml"), shards.join(name)).unwrap();
    }
    let pattern = format!("gtest-junit:{}/*.xml", shards.display());

    let output = run(
        temp.path(),
        &["unittest", "--merge", &pattern, "--name", "nightly", "--render", "tree"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.starts_with("nightly [Failed] (3 tests"));
}

#[test]
fn test_pytest_cleanups() {
    let temp = TempDir::new().unwrap();
    let input = format!("pytest-junit:{}", fixture("pytest.xml").display());

    let output = run(
        temp.path(),
        &[
            "unittest",
            "--input",
            &input,
            "--pytest",
            "rewrite-dunder-init;reduce-depth:pytest.tests",
            "--render",
            "tree",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.contains("└── unit [Passed] (3 tests)"));
    assert!(!text.contains("__init__"));
    assert!(!text.contains("pytest ["));
}

#[test]
fn test_requires_an_input() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["unittest", "--render", "tree"]);
    assert!(!output.status.success());
}

#[test]
fn test_rejects_unknown_dialect() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["unittest", "--input", "nunit:report.xml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("pytest-junit"));
}
