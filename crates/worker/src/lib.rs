//! `clinicflow-worker` library crate.
//!
//! Re-exports the recovery modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod cli;
pub mod config;
pub mod error;
pub mod queue;
pub mod runner;

pub use config::RecoveryConfig;
pub use error::RecoveryError;
pub use queue::DlqDirectory;
pub use runner::{FileOutcome, RecoveryRunner, RecoverySummary};
