use std::path::PathBuf;

use clinicflow_core::CoreError;
use clinicflow_db::StoreError;

/// Errors raised while recovering a single DLQ file.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed DLQ record {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot encode DLQ record {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store accepted the insert but returned no row.
    #[error("Insert returned no data")]
    EmptyInsert,
}

impl RecoveryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecoveryError::Io {
            path: path.into(),
            source,
        }
    }

    /// Validation failures are final for this run and carry no retry metadata.
    pub fn is_validation(&self) -> bool {
        matches!(self, RecoveryError::Core(CoreError::Validation(_)))
    }
}
