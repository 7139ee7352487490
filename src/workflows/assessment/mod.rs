//! Assessment scoring and priority-classification pipeline.
//!
//! One import task covers one uploaded score sheet for one issue type: the
//! active rule set is snapshotted once, every row is matched to a beneficiary,
//! its `"<actual>/<max>"` score is parsed and normalized to 0-100, and the
//! actual score is classified against the snapshot's inclusive ranges. One
//! append-only [`AssessmentResult`] is written per resolved row.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod rules;
pub mod score;
pub mod service;
pub mod sheet;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentResult, BeneficiaryId, IssueTypeId, NewAssessmentResult, PriorityLabel, ResultId,
    RuleId, SuggestedPriority, UserId,
};
pub use memory::{MemoryDirectory, MemoryResultStore, MemoryRuleStore, SeedError};
pub use repository::{
    AssessmentResultStore, BeneficiaryDirectory, DirectoryError, PriorityRuleStore, ResultWriter,
    StoreError,
};
pub use rules::{PriorityRule, RuleSnapshot};
pub use score::{normalize, parse_raw_score};
pub use service::{AssessmentImportError, AssessmentImportService};
pub use sheet::{ScoreSheetRow, SheetError};
