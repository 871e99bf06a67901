use edaa_reports_core::unittest::{Entity, IterationScheme, TestEntity};
use edaa_reports_core::{
    Testcase, TestcaseStatus, Testsuite, TestsuiteStatus, TestsuiteSummary, UnittestError,
};
use proptest::prelude::*;

#[test]
fn test_failed_testcase_fails_suite() {
    let mut suite = Testsuite::new("S").unwrap();
    suite
        .add_testcases([
            Testcase::new("T1").unwrap().with_status(TestcaseStatus::PASSED),
            Testcase::new("T2").unwrap().with_status(TestcaseStatus::FAILED),
        ])
        .unwrap();

    let aggregate = suite.aggregate(true).unwrap();
    assert_eq!(aggregate.status, TestsuiteStatus::FAILED);
    assert_eq!(aggregate.testcase_count, 2);
    assert_eq!(suite.status(), TestsuiteStatus::FAILED);
    assert_eq!(suite.total_duration(), None);
}

#[test]
fn test_names_unique_per_parent() {
    let mut summary = TestsuiteSummary::new("summary").unwrap();
    let first = summary.add_testsuite(Testsuite::new("first").unwrap()).unwrap();
    first.add_testcase(Testcase::new("A").unwrap()).unwrap();
    let err = first.add_testcase(Testcase::new("A").unwrap()).unwrap_err();
    assert!(matches!(err, UnittestError::DuplicateName { kind: "testcase", .. }));

    let second = summary.add_testsuite(Testsuite::new("second").unwrap()).unwrap();
    second.add_testcase(Testcase::new("A").unwrap()).unwrap();

    let err = summary.add_testsuite(Testsuite::new("second").unwrap()).unwrap_err();
    assert!(matches!(err, UnittestError::DuplicateName { kind: "testsuite", .. }));
}

#[test]
fn test_invalid_names() {
    assert!(matches!(Testcase::new(""), Err(UnittestError::InvalidName { .. })));
    assert!(matches!(Testsuite::new(""), Err(UnittestError::InvalidName { .. })));
    assert!(TestsuiteSummary::new("").is_err());
}

#[test]
fn test_annotations_on_entities() {
    let mut testcase = Testcase::new("t").unwrap().with_annotation("owner", "ci");
    testcase.annotations_mut().set("seed", "42");

    let annotations = testcase.annotations();
    assert_eq!(annotations.get("owner"), Some("ci"));
    assert!(annotations.contains("seed"));
    assert_eq!(annotations.len(), 2);
    assert_eq!(
        annotations.iter().collect::<Vec<_>>(),
        vec![("owner", "ci"), ("seed", "42")]
    );

    assert_eq!(testcase.annotations_mut().delete("owner"), Some("ci".to_string()));
    assert!(!testcase.annotations().contains("owner"));
}

#[test]
fn test_summary_copy_is_independent() {
    let mut summary = TestsuiteSummary::new("summary").unwrap();
    summary
        .add_testsuite(Testsuite::new("S").unwrap())
        .unwrap()
        .add_testcase(Testcase::new("t").unwrap().with_status(TestcaseStatus::PASSED))
        .unwrap();

    let mut copy = summary.copy();
    copy.testsuite_mut("S")
        .unwrap()
        .testcase_mut("t")
        .unwrap()
        .set_status(TestcaseStatus::FAILED);

    let original = summary.testsuite("S").unwrap().testcase("t").unwrap();
    assert_eq!(original.status(), TestcaseStatus::PASSED);
}

#[test]
fn test_error_modifier_propagates() {
    let mut summary = TestsuiteSummary::new("summary").unwrap();
    let outer = summary.add_testsuite(Testsuite::new("outer").unwrap()).unwrap();
    outer
        .add_testcase(Testcase::new("ok").unwrap().with_status(TestcaseStatus::PASSED))
        .unwrap();
    outer
        .add_testsuite(Testsuite::new("inner").unwrap())
        .unwrap()
        .add_testcase(
            Testcase::new("crash")
                .unwrap()
                .with_status(TestcaseStatus::PASSED | TestcaseStatus::ERRORED),
        )
        .unwrap();

    summary.aggregate(false).unwrap();
    let expected = TestsuiteStatus::PASSED | TestsuiteStatus::ERRORED;
    assert_eq!(summary.find(&["outer", "inner"]).unwrap().status(), expected);
    assert_eq!(summary.testsuite("outer").unwrap().status(), expected);
    assert_eq!(summary.status(), expected);
    assert!(!summary.status().is_success());
    assert_eq!(summary.counters().errored, 1);
}

#[test]
fn test_default_iteration_order() {
    let mut summary = TestsuiteSummary::new("summary").unwrap();
    let suite = summary.add_testsuite(Testsuite::new("S").unwrap()).unwrap();
    suite.add_testcase(Testcase::new("t1").unwrap()).unwrap();
    suite
        .add_testsuite(Testsuite::new("N").unwrap())
        .unwrap()
        .add_testcase(Testcase::new("t2").unwrap())
        .unwrap();

    let entities: Vec<_> = summary.iterate(IterationScheme::DEFAULT).collect();
    let names: Vec<&str> = entities.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["S", "t1", "N", "t2"]);
    assert!(matches!(entities[1], TestEntity::Testcase(_)));
    assert_eq!(summary.iterate_testcases().count(), 2);
}

proptest! {
    /// A suite counts its direct testcases plus those of its child suites.
    #[test]
    fn testcase_count_sums_children(placements in prop::collection::vec((0usize..3, prop::option::of(0usize..3)), 0..30)) {
        let mut summary = TestsuiteSummary::new("summary").unwrap();
        for (index, (outer, inner)) in placements.iter().enumerate() {
            let mut suite = summary.ensure_testsuite(&format!("outer{outer}"), Default::default()).unwrap();
            if let Some(inner) = inner {
                suite = suite.ensure_testsuite(&format!("inner{inner}"), Default::default()).unwrap();
            }
            suite.add_testcase(Testcase::new(format!("t{index}")).unwrap()).unwrap();
        }
        summary.aggregate(true).unwrap();

        prop_assert_eq!(summary.testcase_count(), placements.len() as u64);
        for suite in summary.testsuites() {
            let nested: u64 = suite.testsuites().map(|s| s.testcase_count()).sum();
            prop_assert_eq!(suite.testcase_count(), nested + suite.testcases().count() as u64);
        }
    }
}
