use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::domain::{IssueTypeId, UserId};
use super::repository::{
    AssessmentResultStore, BeneficiaryDirectory, DirectoryError, PriorityRuleStore, ResultWriter,
    StoreError,
};
use super::rules::RuleSnapshot;
use super::score::{normalize, parse_raw_score};
use super::sheet::{self, ScoreSheetRow, SheetError};

/// Errors that abort an import task. Row-level anomalies (malformed scores,
/// unknown beneficiaries, uncovered scores) are recovered in place and never
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentImportError {
    #[error("could not load priority rules: {0}")]
    Rules(#[source] StoreError),
    #[error("failed to read score sheet: {0}")]
    Sheet(#[from] SheetError),
    #[error("beneficiary lookup failed: {0}")]
    Directory(#[from] DirectoryError),
    #[error("failed to persist assessment result: {0}")]
    Store(#[source] StoreError),
    #[error("failed to remove imported sheet: {0}")]
    Cleanup(#[source] std::io::Error),
}

/// Orchestrates one batch import: snapshot the rules once, stream the sheet,
/// and run each row through resolve -> parse -> normalize -> classify -> write.
///
/// Each task holds its own rule snapshot and shares no mutable state with
/// concurrent tasks; rows are processed strictly sequentially in file order.
pub struct AssessmentImportService<D, R, S> {
    directory: Arc<D>,
    rules: Arc<R>,
    writer: ResultWriter<S>,
}

impl<D, R, S> AssessmentImportService<D, R, S>
where
    D: BeneficiaryDirectory + 'static,
    R: PriorityRuleStore + 'static,
    S: AssessmentResultStore + 'static,
{
    pub fn new(directory: Arc<D>, rules: Arc<R>, results: Arc<S>) -> Self {
        Self {
            directory,
            rules,
            writer: ResultWriter::new(results),
        }
    }

    /// Run one import over an uploaded sheet file.
    ///
    /// The source file is deleted once the row stream is exhausted, whether or
    /// not rows were skipped. If the task aborts before that point the file is
    /// left in place for the task runtime's retry policy, and rows already
    /// written stay written.
    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
        issue_type_id: IssueTypeId,
        assessed_by: Option<UserId>,
    ) -> Result<(), AssessmentImportError> {
        let path = path.as_ref();
        let snapshot = RuleSnapshot::load(self.rules.as_ref(), issue_type_id)
            .map_err(AssessmentImportError::Rules)?;
        let rows = sheet::read_path(path)?;

        self.run_rows(&snapshot, rows, assessed_by)?;

        std::fs::remove_file(path).map_err(AssessmentImportError::Cleanup)?;
        Ok(())
    }

    /// Run one import over rows that were already read (in-process callers and
    /// tests). No file bookkeeping applies.
    pub fn import_rows(
        &self,
        rows: Vec<ScoreSheetRow>,
        issue_type_id: IssueTypeId,
        assessed_by: Option<UserId>,
    ) -> Result<(), AssessmentImportError> {
        let snapshot = RuleSnapshot::load(self.rules.as_ref(), issue_type_id)
            .map_err(AssessmentImportError::Rules)?;
        self.run_rows(&snapshot, rows, assessed_by)
    }

    /// Submit an import to the runtime and return immediately. Failures are
    /// logged for the scheduler; the join handle is its retry/alerting hook.
    pub fn spawn(
        self: Arc<Self>,
        path: PathBuf,
        issue_type_id: IssueTypeId,
        assessed_by: Option<UserId>,
    ) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || {
            if let Err(error) = self.import_path(&path, issue_type_id, assessed_by) {
                error!(%error, path = %path.display(), "assessment import aborted");
            }
        })
    }

    fn run_rows(
        &self,
        snapshot: &RuleSnapshot,
        rows: Vec<ScoreSheetRow>,
        assessed_by: Option<UserId>,
    ) -> Result<(), AssessmentImportError> {
        let issue_type_id = snapshot.issue_type_id();
        let total = rows.len();
        let mut written = 0usize;

        for row in rows {
            // Unknown beneficiary is a skip signal, not a batch failure.
            let Some(beneficiary_id) = self.directory.resolve(&row.national_id)? else {
                debug!(national_id = %row.national_id, "no matching beneficiary, row skipped");
                continue;
            };

            let (score, max_score) = parse_raw_score(&row.raw_score);
            let normalized_score = normalize(score, max_score);
            let priority_suggested = snapshot.classify(score);

            self.writer
                .write(
                    beneficiary_id,
                    issue_type_id,
                    score,
                    max_score,
                    normalized_score,
                    priority_suggested,
                    Utc::now(),
                    assessed_by,
                )
                .map_err(AssessmentImportError::Store)?;
            written += 1;
        }

        info!(
            issue_type = issue_type_id.0,
            rows = total,
            written,
            "assessment import completed"
        );
        Ok(())
    }
}
