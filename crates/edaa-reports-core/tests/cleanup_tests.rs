use std::path::Path;

use edaa_reports_core::unittest::Entity;
use edaa_reports_core::{
    Dialect, Document, JUnitFlavor, Testcase, TestcaseStatus, Testsuite, TestsuiteKind,
    TestsuiteStatus, TestsuiteSummary, UnittestError,
};

fn pytest_summary() -> TestsuiteSummary {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/pytest.xml");
    Document::open(path, Dialect::JUnit(JUnitFlavor::PyTest))
        .unwrap()
        .to_testsuite_summary()
        .unwrap()
}

#[test]
fn test_rewrite_dunder_init_on_pytest_report() {
    let mut summary = pytest_summary();
    assert_eq!(summary.rewrite_dunder_init().unwrap(), 1);

    let unit = summary.find(&["pytest", "tests", "unit"]).unwrap();
    assert!(unit.testsuite("__init__").is_none());
    assert!(unit.testcase("test_import").is_some());
    assert!(unit.testsuite("test_mod").is_some());

    summary.aggregate(false).unwrap();
    assert_eq!(summary.testcase_count(), 3);
}

#[test]
fn test_reduce_depth_lifts_children() {
    let mut summary = pytest_summary();
    summary.rewrite_dunder_init().unwrap();
    assert!(summary.reduce_depth("pytest.tests").unwrap());
    summary.aggregate(false).unwrap();

    assert!(summary.testsuite("pytest").is_none());
    let unit = summary.testsuite("unit").unwrap();
    assert_eq!(unit.kind(), TestsuiteKind::Logical);
    assert_eq!(unit.path().to_string(), format!("{}/unit", summary.name()));
    assert!(unit.testcase("test_import").is_some());

    let test_b = unit.testsuite("test_mod").unwrap().testcase("test_b").unwrap();
    assert_eq!(test_b.parent().unwrap().to_string(), format!("{}/unit/test_mod", summary.name()));
    assert_eq!(summary.testcase_count(), 3);
    assert_eq!(summary.status(), TestsuiteStatus::PASSED);
}

#[test]
fn test_reduce_depth_unknown_path() {
    let mut summary = pytest_summary();
    let before = summary.clone();
    assert!(!summary.reduce_depth("pytest.nothing.here").unwrap());
    assert_eq!(summary, before);
}

#[test]
fn test_split_top_level_suite() {
    let mut summary = TestsuiteSummary::new("all").unwrap();
    let bundle = summary.add_testsuite(Testsuite::new("bundle").unwrap()).unwrap();
    bundle
        .add_testcase(Testcase::new("loose").unwrap().with_status(TestcaseStatus::PASSED))
        .unwrap();
    for name in ["alpha", "beta"] {
        let child = bundle
            .add_testsuite(Testsuite::of_kind(name, TestsuiteKind::Module).unwrap())
            .unwrap();
        child
            .add_testcase(Testcase::new("t").unwrap().with_status(TestcaseStatus::PASSED))
            .unwrap();
    }

    assert!(summary.split("bundle").unwrap());
    summary.aggregate(false).unwrap();

    let names: Vec<&str> = summary.testsuites().map(|s| s.name()).collect();
    assert_eq!(names, vec!["bundle", "alpha", "beta"]);
    assert_eq!(summary.testsuite("alpha").unwrap().kind(), TestsuiteKind::Logical);
    // the suite keeps its own testcases
    assert!(summary.testsuite("bundle").unwrap().testcase("loose").is_some());
    assert_eq!(summary.testcase_count(), 3);

    assert!(!summary.split("missing").unwrap());
}

#[test]
fn test_split_removes_emptied_suite() {
    let mut summary = TestsuiteSummary::new("all").unwrap();
    let wrapper = summary.add_testsuite(Testsuite::new("wrapper").unwrap()).unwrap();
    wrapper
        .add_testsuite(Testsuite::new("inner").unwrap())
        .unwrap()
        .add_testcase(Testcase::new("t").unwrap())
        .unwrap();

    assert!(summary.split("wrapper").unwrap());
    assert!(summary.testsuite("wrapper").is_none());
    assert!(summary.testsuite("inner").is_some());
}

#[test]
fn test_lift_conflict_is_an_error() {
    let mut summary = TestsuiteSummary::new("all").unwrap();
    summary.add_testsuite(Testsuite::new("inner").unwrap()).unwrap();
    let wrapper = summary.add_testsuite(Testsuite::new("wrapper").unwrap()).unwrap();
    wrapper.add_testsuite(Testsuite::new("first").unwrap()).unwrap();
    wrapper.add_testsuite(Testsuite::new("inner").unwrap()).unwrap();
    wrapper.add_testsuite(Testsuite::new("last").unwrap()).unwrap();
    let before = summary.clone();

    let err = summary.split("wrapper").unwrap_err();
    assert!(matches!(err, UnittestError::DuplicateName { ref name, .. } if name == "inner"));
    assert_eq!(summary, before);
}

#[test]
fn test_failed_split_keeps_testcases() {
    let mut summary = TestsuiteSummary::new("all").unwrap();
    summary
        .add_testsuite(Testsuite::new("a").unwrap())
        .unwrap()
        .add_testsuite(Testsuite::new("x").unwrap())
        .unwrap()
        .add_testcase(Testcase::new("t1").unwrap())
        .unwrap();
    summary
        .add_testsuite(Testsuite::new("x").unwrap())
        .unwrap()
        .add_testcase(Testcase::new("t2").unwrap())
        .unwrap();
    let before = summary.clone();

    assert!(summary.split("a").is_err());
    assert!(summary.reduce_depth("a").is_err());
    assert_eq!(summary, before);
    assert_eq!(summary.iterate_testcases().count(), 2);
    summary.aggregate(false).unwrap();
    assert_eq!(summary.testcase_count(), 2);
}

#[test]
fn test_dunder_init_conflict_leaves_summary_unchanged() {
    let mut summary = TestsuiteSummary::new("all").unwrap();
    summary
        .add_testsuite(Testsuite::of_kind("ok", TestsuiteKind::Package).unwrap())
        .unwrap()
        .add_testsuite(Testsuite::of_kind("__init__", TestsuiteKind::Module).unwrap())
        .unwrap()
        .add_testcase(Testcase::new("test_import").unwrap())
        .unwrap();
    let clash = summary
        .add_testsuite(Testsuite::of_kind("pkg", TestsuiteKind::Package).unwrap())
        .unwrap();
    clash.add_testcase(Testcase::new("test_import").unwrap()).unwrap();
    clash
        .add_testsuite(Testsuite::of_kind("__init__", TestsuiteKind::Module).unwrap())
        .unwrap()
        .add_testcase(Testcase::new("test_import").unwrap())
        .unwrap();
    let before = summary.clone();

    assert!(summary.rewrite_dunder_init().is_err());
    assert_eq!(summary, before);
    assert!(summary.find(&["ok", "__init__"]).is_some());
}
