//! In-memory implementations of the pipeline's storage boundaries.
//!
//! These back the offline CLI and the test suites. Production deployments
//! bind the traits to the case-management database instead; nothing in the
//! pipeline depends on this module.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use serde::Deserialize;
use thiserror::Error;

use super::domain::{
    AssessmentResult, BeneficiaryId, IssueTypeId, NewAssessmentResult, PriorityLabel, ResultId,
    RuleId,
};
use super::repository::{
    AssessmentResultStore, BeneficiaryDirectory, DirectoryError, PriorityRuleStore, StoreError,
};
use super::rules::PriorityRule;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown priority label '{value}' in seed file")]
    UnknownPriority { value: String },
}

/// Exact-match national-id directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entries: HashMap<String, BeneficiaryId>,
}

impl MemoryDirectory {
    pub fn new(entries: impl IntoIterator<Item = (String, BeneficiaryId)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Seed from a two-column CSV (`national_id,beneficiary_id`).
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        #[derive(Debug, Deserialize)]
        struct DirectoryRow {
            national_id: String,
            beneficiary_id: i64,
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut entries = HashMap::new();
        for record in reader.deserialize::<DirectoryRow>() {
            let row = record?;
            entries.insert(row.national_id, BeneficiaryId(row.beneficiary_id));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BeneficiaryDirectory for MemoryDirectory {
    fn resolve(&self, national_id: &str) -> Result<Option<BeneficiaryId>, DirectoryError> {
        Ok(self.entries.get(national_id).copied())
    }
}

/// Rule configuration held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: Mutex<Vec<PriorityRule>>,
}

impl MemoryRuleStore {
    pub fn new(rules: Vec<PriorityRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }

    /// Seed from a CSV with columns
    /// `id,issue_type_id,min_score,max_score,priority,is_active`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        #[derive(Debug, Deserialize)]
        struct RuleRow {
            id: i64,
            issue_type_id: i64,
            min_score: i64,
            max_score: i64,
            priority: String,
            is_active: bool,
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut rules = Vec::new();
        for record in reader.deserialize::<RuleRow>() {
            let row = record?;
            let priority = PriorityLabel::parse(&row.priority).ok_or_else(|| {
                SeedError::UnknownPriority {
                    value: row.priority.clone(),
                }
            })?;
            rules.push(PriorityRule {
                id: RuleId(row.id),
                issue_type_id: IssueTypeId(row.issue_type_id),
                min_score: row.min_score,
                max_score: row.max_score,
                priority,
                is_active: row.is_active,
            });
        }

        Ok(Self::new(rules))
    }

    pub fn push(&self, rule: PriorityRule) {
        self.rules.lock().expect("rule mutex poisoned").push(rule);
    }
}

impl PriorityRuleStore for MemoryRuleStore {
    fn rules_for(&self, issue_type_id: IssueTypeId) -> Result<Vec<PriorityRule>, StoreError> {
        let rules = self.rules.lock().expect("rule mutex poisoned");
        Ok(rules
            .iter()
            .filter(|rule| rule.issue_type_id == issue_type_id)
            .cloned()
            .collect())
    }
}

/// Append-only result store with latest-flag reconciliation.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    sequence: AtomicI64,
    results: Mutex<Vec<AssessmentResult>>,
}

impl MemoryResultStore {
    pub fn results(&self) -> Vec<AssessmentResult> {
        self.results.lock().expect("result mutex poisoned").clone()
    }

    pub fn latest_for(
        &self,
        beneficiary_id: BeneficiaryId,
        issue_type_id: IssueTypeId,
    ) -> Option<AssessmentResult> {
        self.results
            .lock()
            .expect("result mutex poisoned")
            .iter()
            .find(|result| {
                result.is_latest
                    && result.beneficiary_id == beneficiary_id
                    && result.issue_type_id == issue_type_id
            })
            .cloned()
    }
}

impl AssessmentResultStore for MemoryResultStore {
    fn insert(&self, result: NewAssessmentResult) -> Result<AssessmentResult, StoreError> {
        let mut results = self.results.lock().expect("result mutex poisoned");

        // Same operation as the insert: demote every prior row for the pair.
        for prior in results.iter_mut() {
            if prior.beneficiary_id == result.beneficiary_id
                && prior.issue_type_id == result.issue_type_id
            {
                prior.is_latest = false;
            }
        }

        let id = ResultId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let stored = AssessmentResult {
            id,
            beneficiary_id: result.beneficiary_id,
            issue_type_id: result.issue_type_id,
            score: result.score,
            max_score: result.max_score,
            normalized_score: result.normalized_score,
            priority_suggested: result.priority_suggested,
            priority_final: None,
            justification: None,
            is_latest: true,
            assessed_at: result.assessed_at,
            assessed_by: result.assessed_by,
        };
        results.push(stored.clone());

        Ok(stored)
    }
}
