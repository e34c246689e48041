use std::path::PathBuf;

use clinicflow_core::BookingFields;

/// Default DLQ directory written by the booking automation host.
pub const DEFAULT_DLQ_DIR: &str = "/home/n8n/dlq";

/// Subdirectory of the DLQ directory that receives recovered files.
pub const PROCESSED_SUBDIR: &str = "processed";

/// Records that have failed this many recoveries are skipped.
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;

/// Settings for one recovery run.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Directory scanned for `failed-*.json`.
    pub dlq_dir: PathBuf,
    /// Destination of successfully recovered files.
    pub processed_dir: PathBuf,
    /// Retry cutoff; `None` retries forever.
    pub max_retry_attempts: Option<u32>,
    /// Report what would happen without inserting or touching files.
    pub dry_run: bool,
    /// Keys allowed into the store insert payload.
    pub booking_fields: BookingFields,
}

impl RecoveryConfig {
    /// Defaults for `dlq_dir`: processed files go to `<dlq_dir>/processed`.
    pub fn new(dlq_dir: impl Into<PathBuf>) -> Self {
        let dlq_dir = dlq_dir.into();
        Self {
            processed_dir: dlq_dir.join(PROCESSED_SUBDIR),
            dlq_dir,
            max_retry_attempts: Some(DEFAULT_MAX_RETRY_ATTEMPTS),
            dry_run: false,
            booking_fields: BookingFields::default(),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// `0` disables the cutoff.
    pub fn with_max_retry_attempts(mut self, max: u32) -> Self {
        self.max_retry_attempts = (max > 0).then_some(max);
        self
    }

    pub fn with_booking_fields(mut self, fields: BookingFields) -> Self {
        self.booking_fields = fields;
        self
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DLQ_DIR)
    }
}
