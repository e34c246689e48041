//! Command-line interface of the `dlq-recovery` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{RecoveryConfig, DEFAULT_DLQ_DIR, DEFAULT_MAX_RETRY_ATTEMPTS};

/// Recover failed bookings from the dead-letter queue.
#[derive(Debug, Parser)]
#[command(name = "dlq-recovery", version)]
pub struct Cli {
    /// Preview recoveries without inserting or touching any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Process a single file instead of every pending file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Directory holding `failed-*.json` records.
    #[arg(long, env = "DLQ_DIR", default_value = DEFAULT_DLQ_DIR)]
    pub dlq_dir: PathBuf,

    /// Skip records that already failed this many recoveries (0 = no limit).
    #[arg(long, env = "DLQ_MAX_RETRY_ATTEMPTS", default_value_t = DEFAULT_MAX_RETRY_ATTEMPTS)]
    pub max_retry_attempts: u32,
}

impl Cli {
    pub fn recovery_config(&self) -> RecoveryConfig {
        RecoveryConfig::new(&self.dlq_dir)
            .with_dry_run(self.dry_run)
            .with_max_retry_attempts(self.max_retry_attempts)
    }
}
