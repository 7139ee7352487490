use std::sync::Arc;

use super::common::{
    build_service, directory, row, standard_rules, UnavailableDirectory, UnavailableResultStore,
    ISSUE_TYPE,
};
use crate::workflows::assessment::domain::{BeneficiaryId, PriorityLabel, SuggestedPriority};
use crate::workflows::assessment::memory::{MemoryResultStore, MemoryRuleStore};
use crate::workflows::assessment::service::{AssessmentImportError, AssessmentImportService};

#[test]
fn import_scores_normalizes_and_classifies_each_row() {
    let (service, results) = build_service();

    service
        .import_rows(
            vec![row("1000000001", "35/100"), row("1000000002", "70/100")],
            ISSUE_TYPE,
            None,
        )
        .expect("import succeeds");

    let written = results.results();
    assert_eq!(written.len(), 2);

    let first = &written[0];
    assert_eq!(first.beneficiary_id, BeneficiaryId(11));
    assert_eq!(first.score, 35);
    assert_eq!(first.max_score, 100);
    assert_eq!(first.normalized_score, 35.0);
    assert_eq!(
        first.priority_suggested,
        SuggestedPriority::Defined(PriorityLabel::Low)
    );
    assert!(first.is_latest);
    assert!(first.priority_final.is_none());
    assert!(first.justification.is_none());

    // 70 sits on the medium/high boundary and must classify medium.
    let second = &written[1];
    assert_eq!(second.normalized_score, 70.0);
    assert_eq!(
        second.priority_suggested,
        SuggestedPriority::Defined(PriorityLabel::Medium)
    );
}

#[test]
fn malformed_score_coerces_to_zero_and_still_writes() {
    let (service, results) = build_service();

    service
        .import_rows(vec![row("1000000001", "abc")], ISSUE_TYPE, None)
        .expect("import succeeds");

    let written = results.results();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].score, 0);
    assert_eq!(written[0].max_score, 0);
    assert_eq!(written[0].normalized_score, 0.0);
    // Score 0 falls inside the low range, so the row classifies rather than
    // falling to the sentinel.
    assert_eq!(
        written[0].priority_suggested,
        SuggestedPriority::Defined(PriorityLabel::Low)
    );
}

#[test]
fn unknown_beneficiary_skips_row_without_aborting() {
    let (service, results) = build_service();

    service
        .import_rows(
            vec![
                row("9999999999", "50/100"),
                row("", "40/100"),
                row("1000000003", "80/100"),
            ],
            ISSUE_TYPE,
            None,
        )
        .expect("import continues past unknown rows");

    let written = results.results();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].beneficiary_id, BeneficiaryId(13));
}

#[test]
fn uncovered_score_persists_the_undefined_sentinel() {
    let results = Arc::new(MemoryResultStore::default());
    let service = AssessmentImportService::new(
        Arc::new(directory()),
        Arc::new(MemoryRuleStore::new(vec![super::common::rule(
            1,
            0,
            40,
            PriorityLabel::Low,
        )])),
        results.clone(),
    );

    service
        .import_rows(vec![row("1000000001", "95/100")], ISSUE_TYPE, None)
        .expect("import succeeds");

    let written = results.results();
    assert_eq!(written[0].priority_suggested, SuggestedPriority::Undefined);
    assert_eq!(written[0].priority_suggested.label(), "Undefined");
}

#[test]
fn reimporting_duplicates_rows_but_keeps_one_latest_per_pair() {
    let (service, results) = build_service();
    let rows = vec![
        row("1000000001", "35/100"),
        row("1000000002", "55/100"),
        row("1000000003", "90/100"),
    ];

    service
        .import_rows(rows.clone(), ISSUE_TYPE, None)
        .expect("first import");
    service
        .import_rows(rows, ISSUE_TYPE, None)
        .expect("second import");

    // Append-only: the second run duplicates every row.
    let written = results.results();
    assert_eq!(written.len(), 6);

    for beneficiary in [BeneficiaryId(11), BeneficiaryId(12), BeneficiaryId(13)] {
        let flagged: Vec<_> = written
            .iter()
            .filter(|result| result.beneficiary_id == beneficiary && result.is_latest)
            .collect();
        assert_eq!(flagged.len(), 1, "exactly one latest row per beneficiary");
    }

    let latest = results
        .latest_for(BeneficiaryId(11), ISSUE_TYPE)
        .expect("latest row present");
    assert_eq!(latest.id, written[3].id, "second run's row is the latest");
}

#[test]
fn store_failure_aborts_the_batch() {
    let service = AssessmentImportService::new(
        Arc::new(directory()),
        Arc::new(MemoryRuleStore::new(standard_rules())),
        Arc::new(UnavailableResultStore),
    );

    let error = service
        .import_rows(vec![row("1000000001", "35/100")], ISSUE_TYPE, None)
        .expect_err("write failure is fatal");
    assert!(matches!(error, AssessmentImportError::Store(_)));
}

#[test]
fn directory_failure_aborts_the_batch() {
    let service = AssessmentImportService::new(
        Arc::new(UnavailableDirectory),
        Arc::new(MemoryRuleStore::new(standard_rules())),
        Arc::new(MemoryResultStore::default()),
    );

    let error = service
        .import_rows(vec![row("1000000001", "35/100")], ISSUE_TYPE, None)
        .expect_err("lookup failure is fatal");
    assert!(matches!(error, AssessmentImportError::Directory(_)));
}

#[test]
fn identity_strings_are_matched_verbatim() {
    let (service, results) = build_service();

    // The resolver itself never normalizes: a padded identity that reaches it
    // (sheet intake trims cells, direct callers may not) misses the lookup.
    service
        .import_rows(vec![row("1000000001 ", "35/100")], ISSUE_TYPE, None)
        .expect("import succeeds");

    assert!(results.results().is_empty());
}
