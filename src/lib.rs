//! Assessment scoring and priority-classification pipeline.
//!
//! Bulk-uploaded assessment sheets are matched to known beneficiaries, scored,
//! normalized to a 0-100 scale, and classified into a priority level using the
//! score-range rules configured for the target issue type. The resulting
//! records feed the triage queue case workers use to decide intervention
//! urgency.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
