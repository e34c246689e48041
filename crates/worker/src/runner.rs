//! The DLQ recovery runner.
//!
//! Files are handled one at a time, in the order given. Each file ends in
//! exactly one [`FileOutcome`]:
//!
//! - recovered (inserted, already in the store, or previewed in dry-run)
//! - rejected by validation: untouched, no retry metadata
//! - exhausted by the retry cutoff: untouched, store not contacted
//! - failed operationally: retry counter and timestamp written back
//!
//! Dry-run never writes or moves anything.

use std::path::{Path, PathBuf};

use chrono::Utc;

use clinicflow_core::{derive_booking, DlqRecord};
use clinicflow_db::BookingStore;

use crate::config::RecoveryConfig;
use crate::error::RecoveryError;
use crate::queue::DlqDirectory;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to a single DLQ file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Inserted into the store and moved to the processed directory.
    Inserted { id: Option<serde_json::Value> },
    /// The store already had a booking for this session id.
    AlreadyRecovered { session_id: String },
    /// Dry-run: the booking would have been inserted.
    DryRun,
    /// Skipped because the retry cutoff was reached.
    Exhausted { attempts: u32 },
    /// The record cannot become a valid booking.
    Rejected { reason: String },
    /// Recovery failed; `attempts` is the new retry count if it was recorded.
    Failed {
        error: String,
        attempts: Option<u32>,
    },
}

impl FileOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(
            self,
            FileOutcome::Inserted { .. } | FileOutcome::AlreadyRecovered { .. } | FileOutcome::DryRun
        )
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoverySummary {
    pub recovered: usize,
    pub failed: usize,
    pub exhausted: usize,
}

impl RecoverySummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Exhausted { .. } => self.exhausted += 1,
            o if o.is_recovered() => self.recovered += 1,
            _ => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.recovered + self.failed + self.exhausted
    }
}

// ---------------------------------------------------------------------------
// RecoveryRunner
// ---------------------------------------------------------------------------

/// Replays DLQ records into a [`BookingStore`].
pub struct RecoveryRunner<S> {
    store: S,
    queue: DlqDirectory,
    config: RecoveryConfig,
}

impl<S: BookingStore> RecoveryRunner<S> {
    pub fn new(store: S, config: RecoveryConfig) -> Self {
        let queue = DlqDirectory::new(&config.dlq_dir, &config.processed_dir);
        Self {
            store,
            queue,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Files to process: the single override if it still exists, otherwise
    /// every pending file in the DLQ directory.
    pub fn candidates(&self, single_file: Option<&Path>) -> Result<Vec<PathBuf>, RecoveryError> {
        match single_file {
            Some(path) if path.is_file() => Ok(vec![path.to_path_buf()]),
            Some(path) => {
                tracing::warn!(file = %path.display(), "DLQ file not found, nothing to do");
                Ok(Vec::new())
            }
            None => self.queue.pending_files(),
        }
    }

    /// Process `files` sequentially and tally the outcomes.
    pub async fn run(&self, files: &[PathBuf]) -> RecoverySummary {
        let mut summary = RecoverySummary::default();
        for path in files {
            let outcome = self.process_file(path).await;
            summary.record(&outcome);
        }
        summary
    }

    /// Recover one DLQ file.
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!(file = %file, "Processing DLQ record");

        let mut record = match DlqDirectory::read_record(path) {
            Ok(record) => record,
            Err(e) => {
                // Unreadable files cannot carry retry metadata.
                tracing::error!(file = %file, error = %e, "Cannot read DLQ record");
                return FileOutcome::Failed {
                    error: e.to_string(),
                    attempts: None,
                };
            }
        };

        if record.is_exhausted(self.config.max_retry_attempts) {
            tracing::warn!(
                file = %file,
                attempts = record.recovery_attempts,
                "Retry limit reached, skipping"
            );
            return FileOutcome::Exhausted {
                attempts: record.recovery_attempts,
            };
        }

        match self.recover(path, &record).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_validation() => {
                tracing::error!(file = %file, error = %e, "Record rejected");
                FileOutcome::Rejected {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(file = %file, error = %e, "Recovery failed");
                let attempts = if self.config.dry_run {
                    None
                } else {
                    self.record_failure(path, &mut record, &file)
                };
                FileOutcome::Failed {
                    error: e.to_string(),
                    attempts,
                }
            }
        }
    }

    // ---- private helpers ----

    async fn recover(&self, path: &Path, record: &DlqRecord) -> Result<FileOutcome, RecoveryError> {
        let booking = derive_booking(record, &self.config.booking_fields)?;
        booking.validate()?;

        if let Some(session_id) = booking.stripe_session_id() {
            if self.store.find_by_session_id(session_id).await?.is_some() {
                tracing::info!(session_id, "Booking already exists in store");
                if !self.config.dry_run {
                    let dest = self.queue.mark_processed(path)?;
                    tracing::info!(dest = %dest.display(), "Moved to processed");
                }
                return Ok(FileOutcome::AlreadyRecovered {
                    session_id: session_id.to_string(),
                });
            }
        }

        tracing::info!(
            customer_email = booking.customer_email().unwrap_or_default(),
            service = booking.service_name().unwrap_or("-"),
            start_time = booking.start_time().unwrap_or("-"),
            "Recovering booking"
        );

        if self.config.dry_run {
            tracing::info!(
                payload = %serde_json::Value::Object(booking.as_object().clone()),
                "DRY RUN - would insert booking"
            );
            return Ok(FileOutcome::DryRun);
        }

        let row = self
            .store
            .insert(&booking)
            .await?
            .ok_or(RecoveryError::EmptyInsert)?;
        tracing::info!(id = ?row.id, "Inserted booking");

        let dest = self.queue.mark_processed(path)?;
        tracing::info!(dest = %dest.display(), "Moved to processed");

        Ok(FileOutcome::Inserted { id: row.id })
    }

    fn record_failure(&self, path: &Path, record: &mut DlqRecord, file: &str) -> Option<u32> {
        match DlqDirectory::mark_failed(path, record, Utc::now()) {
            Ok(attempts) => {
                tracing::warn!(file, attempts, "Retry count updated");
                Some(attempts)
            }
            Err(e) => {
                tracing::error!(file, error = %e, "Failed to record retry metadata");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_by_category() {
        let mut summary = RecoverySummary::default();
        for outcome in [
            FileOutcome::Inserted { id: None },
            FileOutcome::AlreadyRecovered {
                session_id: "cs_1".into(),
            },
            FileOutcome::DryRun,
            FileOutcome::Exhausted { attempts: 3 },
            FileOutcome::Rejected {
                reason: "missing customer_email".into(),
            },
            FileOutcome::Failed {
                error: "timeout".into(),
                attempts: Some(1),
            },
        ] {
            summary.record(&outcome);
        }

        assert_eq!(
            summary,
            RecoverySummary {
                recovered: 3,
                failed: 2,
                exhausted: 1,
            }
        );
        assert_eq!(summary.total(), 6);
    }
}
