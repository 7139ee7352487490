use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{
    AssessmentResult, BeneficiaryId, IssueTypeId, NewAssessmentResult, SuggestedPriority, UserId,
};
use super::rules::PriorityRule;

/// Lookup boundary to the beneficiary directory. The pipeline only reads;
/// beneficiary data is owned elsewhere.
///
/// Resolution is exact-match on the identity string exactly as typed in the
/// sheet: no trimming, no fuzzy matching. `Ok(None)` means "skip this row",
/// not a failure.
pub trait BeneficiaryDirectory: Send + Sync {
    fn resolve(&self, national_id: &str) -> Result<Option<BeneficiaryId>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("beneficiary directory unavailable: {0}")]
    Unavailable(String),
}

/// Read boundary to the externally managed rule configuration. Implementations
/// may return rules in any order and may include inactive entries; snapshot
/// loading applies the filtering and ordering contract.
pub trait PriorityRuleStore: Send + Sync {
    fn rules_for(&self, issue_type_id: IssueTypeId) -> Result<Vec<PriorityRule>, StoreError>;
}

/// Append-only sink for assessment results.
///
/// `insert` must assign the id, mark the new row latest, and clear the latest
/// flag on every prior row for the same `(beneficiary_id, issue_type_id)` pair
/// within the same operation, so at most one row per pair carries the flag.
/// Existing rows are otherwise never updated or deleted.
pub trait AssessmentResultStore: Send + Sync {
    fn insert(&self, result: NewAssessmentResult) -> Result<AssessmentResult, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("referenced {entity} no longer exists")]
    MissingReference { entity: &'static str },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persists one result per successfully resolved row. Each write is an
/// independent insert; there is no batching across rows.
pub struct ResultWriter<S> {
    store: Arc<S>,
}

impl<S: AssessmentResultStore> ResultWriter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn write(
        &self,
        beneficiary_id: BeneficiaryId,
        issue_type_id: IssueTypeId,
        score: i64,
        max_score: i64,
        normalized_score: f64,
        priority_suggested: SuggestedPriority,
        assessed_at: DateTime<Utc>,
        assessed_by: Option<UserId>,
    ) -> Result<AssessmentResult, StoreError> {
        self.store.insert(NewAssessmentResult {
            beneficiary_id,
            issue_type_id,
            score,
            max_score,
            normalized_score,
            priority_suggested,
            assessed_at,
            assessed_by,
        })
    }
}
