use serde::{Deserialize, Serialize};

use super::domain::{IssueTypeId, PriorityLabel, RuleId, SuggestedPriority};
use super::repository::{PriorityRuleStore, StoreError};

/// A configured inclusive score range for one issue type mapped to a priority
/// level. Rules are authored by case managers through the external
/// configuration store and are read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRule {
    pub id: RuleId,
    pub issue_type_id: IssueTypeId,
    pub min_score: i64,
    pub max_score: i64,
    pub priority: PriorityLabel,
    pub is_active: bool,
}

impl PriorityRule {
    pub fn contains(&self, score: i64) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

/// Immutable set of active rules for one issue type, fixed at the start of an
/// import task. Concurrent rule edits never affect an in-flight batch.
///
/// Ranges are not required to be disjoint. The snapshot keeps rules in
/// ascending id order and `classify` returns the first match, so overlapping
/// ranges resolve deterministically to the lowest-id rule. That tie-break is a
/// documented contract, not incidental behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSnapshot {
    issue_type_id: IssueTypeId,
    rules: Vec<PriorityRule>,
}

impl RuleSnapshot {
    /// Take the snapshot for one issue type: fetch the stored rules, drop
    /// inactive ones, and fix the evaluation order.
    pub fn load<R: PriorityRuleStore + ?Sized>(
        store: &R,
        issue_type_id: IssueTypeId,
    ) -> Result<Self, StoreError> {
        let mut rules: Vec<PriorityRule> = store
            .rules_for(issue_type_id)?
            .into_iter()
            .filter(|rule| rule.is_active && rule.issue_type_id == issue_type_id)
            .collect();
        rules.sort_by_key(|rule| rule.id);

        Ok(Self {
            issue_type_id,
            rules,
        })
    }

    /// Build a snapshot directly from a rule list (tests and offline tools).
    pub fn from_rules(issue_type_id: IssueTypeId, mut rules: Vec<PriorityRule>) -> Self {
        rules.retain(|rule| rule.is_active && rule.issue_type_id == issue_type_id);
        rules.sort_by_key(|rule| rule.id);
        Self {
            issue_type_id,
            rules,
        }
    }

    pub fn issue_type_id(&self) -> IssueTypeId {
        self.issue_type_id
    }

    pub fn rules(&self) -> &[PriorityRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classify an actual score. Bounds are inclusive on both ends; a score
    /// exactly on a boundary matches that rule. Returns the `Undefined`
    /// sentinel when no active range contains the score.
    pub fn classify(&self, score: i64) -> SuggestedPriority {
        self.rules
            .iter()
            .find(|rule| rule.contains(score))
            .map(|rule| SuggestedPriority::Defined(rule.priority))
            .unwrap_or(SuggestedPriority::Undefined)
    }
}
