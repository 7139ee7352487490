use std::sync::Arc;

use crate::workflows::assessment::domain::{
    AssessmentResult, IssueTypeId, NewAssessmentResult, PriorityLabel,
};
use crate::workflows::assessment::memory::{MemoryDirectory, MemoryResultStore, MemoryRuleStore};
use crate::workflows::assessment::repository::{
    AssessmentResultStore, BeneficiaryDirectory, DirectoryError, StoreError,
};
use crate::workflows::assessment::rules::PriorityRule;
use crate::workflows::assessment::service::AssessmentImportService;
use crate::workflows::assessment::sheet::ScoreSheetRow;
use crate::workflows::assessment::{BeneficiaryId, RuleId};

pub(super) const ISSUE_TYPE: IssueTypeId = IssueTypeId(7);

pub(super) fn rule(id: i64, min: i64, max: i64, priority: PriorityLabel) -> PriorityRule {
    PriorityRule {
        id: RuleId(id),
        issue_type_id: ISSUE_TYPE,
        min_score: min,
        max_score: max,
        priority,
        is_active: true,
    }
}

/// The low/medium/high ladder the case managers configure for issue type 7.
pub(super) fn standard_rules() -> Vec<PriorityRule> {
    vec![
        rule(1, 0, 40, PriorityLabel::Low),
        rule(2, 41, 70, PriorityLabel::Medium),
        rule(3, 71, 100, PriorityLabel::High),
    ]
}

pub(super) fn directory() -> MemoryDirectory {
    MemoryDirectory::new([
        ("1000000001".to_string(), BeneficiaryId(11)),
        ("1000000002".to_string(), BeneficiaryId(12)),
        ("1000000003".to_string(), BeneficiaryId(13)),
    ])
}

pub(super) fn row(national_id: &str, raw_score: &str) -> ScoreSheetRow {
    ScoreSheetRow {
        national_id: national_id.to_string(),
        raw_score: raw_score.to_string(),
    }
}

pub(super) fn build_service() -> (
    Arc<AssessmentImportService<MemoryDirectory, MemoryRuleStore, MemoryResultStore>>,
    Arc<MemoryResultStore>,
) {
    let results = Arc::new(MemoryResultStore::default());
    let service = Arc::new(AssessmentImportService::new(
        Arc::new(directory()),
        Arc::new(MemoryRuleStore::new(standard_rules())),
        results.clone(),
    ));
    (service, results)
}

pub(super) struct UnavailableResultStore;

impl AssessmentResultStore for UnavailableResultStore {
    fn insert(&self, _result: NewAssessmentResult) -> Result<AssessmentResult, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct UnavailableDirectory;

impl BeneficiaryDirectory for UnavailableDirectory {
    fn resolve(&self, _national_id: &str) -> Result<Option<BeneficiaryId>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }
}
