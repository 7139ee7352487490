use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for a beneficiary known to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeneficiaryId(pub i64);

/// Identifier wrapper for the issue type an assessment batch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IssueTypeId(pub i64);

/// Identifier wrapper for a configured priority rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub i64);

/// Identifier assigned by the result store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultId(pub i64);

/// Identifier of the case worker an import run is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Closed set of priority levels case managers configure rules against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLabel {
    Low,
    Medium,
    High,
    Critical,
}

impl PriorityLabel {
    pub const fn label(self) -> &'static str {
        match self {
            PriorityLabel::Low => "low",
            PriorityLabel::Medium => "medium",
            PriorityLabel::High => "high",
            PriorityLabel::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(PriorityLabel::Low),
            "medium" => Some(PriorityLabel::Medium),
            "high" => Some(PriorityLabel::High),
            "critical" => Some(PriorityLabel::Critical),
            _ => None,
        }
    }
}

/// Classification produced for a scored row. `Undefined` is the sentinel used
/// when no active rule range contains the score; it is a valid outcome, not an
/// error, and is persisted as-is for a reviewer to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedPriority {
    Defined(PriorityLabel),
    Undefined,
}

impl SuggestedPriority {
    pub const fn label(self) -> &'static str {
        match self {
            SuggestedPriority::Defined(priority) => priority.label(),
            SuggestedPriority::Undefined => "Undefined",
        }
    }
}

/// Append-only record produced for every sheet row whose beneficiary resolves.
///
/// `priority_final` and `justification` stay empty here; a human reviewer sets
/// them later through the case-management surface, outside this pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub id: ResultId,
    pub beneficiary_id: BeneficiaryId,
    pub issue_type_id: IssueTypeId,
    pub score: i64,
    pub max_score: i64,
    pub normalized_score: f64,
    pub priority_suggested: SuggestedPriority,
    pub priority_final: Option<PriorityLabel>,
    pub justification: Option<String>,
    pub is_latest: bool,
    pub assessed_at: DateTime<Utc>,
    pub assessed_by: Option<UserId>,
}

/// Insert payload for the result store; `id` and the latest-flag bookkeeping
/// are the store's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssessmentResult {
    pub beneficiary_id: BeneficiaryId,
    pub issue_type_id: IssueTypeId,
    pub score: i64,
    pub max_score: i64,
    pub normalized_score: f64,
    pub priority_suggested: SuggestedPriority,
    pub assessed_at: DateTime<Utc>,
    pub assessed_by: Option<UserId>,
}
