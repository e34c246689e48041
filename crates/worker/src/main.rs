//! `dlq-recovery` -- replays dead-lettered bookings into the booking store.
//!
//! Scans the DLQ directory for `failed-*.json`, rebuilds each booking and
//! inserts it. Recovered files move to `<dlq_dir>/processed`; failures get
//! their retry counter bumped and stay in place for the next run.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default          | Description                          |
//! |--------------------------|----------|------------------|--------------------------------------|
//! | `SUPABASE_URL`           | yes      | --               | Store URL (fallback `VITE_SUPABASE_URL`) |
//! | `SUPABASE_SERVICE_KEY`   | yes      | --               | Service key (fallback `SUPABASE_SERVICE_ROLE_KEY`) |
//! | `BOOKINGS_TABLE`         | no       | `bookings`       | Target table                         |
//! | `STORE_TIMEOUT_SECS`     | no       | `30`             | HTTP timeout per store request       |
//! | `DLQ_DIR`                | no       | `/home/n8n/dlq`  | DLQ directory (`--dlq-dir`)          |
//! | `DLQ_MAX_RETRY_ATTEMPTS` | no       | `3`              | Retry cutoff, `0` disables (`--max-retry-attempts`) |

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinicflow_db::{RestBookingStore, StoreConfig};
use clinicflow_worker::cli::Cli;
use clinicflow_worker::RecoveryRunner;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinicflow_worker=info,clinicflow_db=info,dlq_recovery=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.recovery_config();

    tracing::info!(
        dlq_dir = %config.dlq_dir.display(),
        dry_run = config.dry_run,
        max_retry_attempts = ?config.max_retry_attempts,
        "Starting DLQ recovery",
    );

    // --- Booking store ---
    let store_config = StoreConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Booking store is not configured");
        std::process::exit(1);
    });
    let store = RestBookingStore::new(&store_config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build booking store client");
        std::process::exit(1);
    });
    tracing::info!(url = %store_config.url, table = %store_config.table, "Booking store configured");

    // --- Recovery ---
    let runner = RecoveryRunner::new(store, config);

    let files = runner.candidates(cli.file.as_deref()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to list DLQ files");
        std::process::exit(1);
    });

    if files.is_empty() {
        tracing::info!("No pending DLQ files found");
        return;
    }
    tracing::info!(count = files.len(), "Found DLQ files to process");

    let summary = runner.run(&files).await;

    tracing::info!(
        recovered = summary.recovered,
        failed = summary.failed,
        exhausted = summary.exhausted,
        dry_run = runner.config().dry_run,
        "DLQ recovery finished",
    );
}
