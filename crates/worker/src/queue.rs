//! On-disk DLQ directory handling.
//!
//! Pending records live directly in the DLQ directory as `failed-*.json`.
//! Recovered files are moved into the processed directory; files that fail
//! recovery are rewritten in place with updated retry metadata.

use std::fs;
use std::path::{Path, PathBuf};

use clinicflow_core::types::Timestamp;
use clinicflow_core::DlqRecord;

use crate::error::RecoveryError;

/// The pending and processed locations of one DLQ.
#[derive(Debug, Clone)]
pub struct DlqDirectory {
    root: PathBuf,
    processed: PathBuf,
}

impl DlqDirectory {
    pub fn new(root: impl Into<PathBuf>, processed: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            processed: processed.into(),
        }
    }

    /// Pending `failed-*.json` files in lexical order.
    ///
    /// A missing DLQ directory has nothing pending.
    pub fn pending_files(&self) -> Result<Vec<PathBuf>, RecoveryError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(dir = %self.root.display(), "DLQ directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RecoveryError::io(&self.root, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RecoveryError::io(&self.root, e))?;
            let path = entry.path();
            let is_match = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(DlqRecord::is_pending_file_name);
            if is_match && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read and parse one DLQ record.
    pub fn read_record(path: &Path) -> Result<DlqRecord, RecoveryError> {
        let raw = fs::read_to_string(path).map_err(|e| RecoveryError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| RecoveryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Move a recovered file into the processed directory.
    ///
    /// Returns the destination path.
    pub fn mark_processed(&self, path: &Path) -> Result<PathBuf, RecoveryError> {
        fs::create_dir_all(&self.processed).map_err(|e| RecoveryError::io(&self.processed, e))?;

        let file_name = path.file_name().ok_or_else(|| {
            RecoveryError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
        let dest = self.processed.join(file_name);

        if let Err(rename_err) = fs::rename(path, &dest) {
            // rename cannot cross filesystems; fall back to copy + remove.
            fs::copy(path, &dest).map_err(|_| RecoveryError::io(path, rename_err))?;
            fs::remove_file(path).map_err(|e| RecoveryError::io(path, e))?;
        }

        Ok(dest)
    }

    /// Record a failed recovery attempt in the file itself.
    ///
    /// Returns the new attempt count.
    pub fn mark_failed(
        path: &Path,
        record: &mut DlqRecord,
        at: Timestamp,
    ) -> Result<u32, RecoveryError> {
        record.record_failed_attempt(at);

        let json = serde_json::to_string_pretty(record).map_err(|source| RecoveryError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| RecoveryError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| RecoveryError::io(path, e))?;

        Ok(record.recovery_attempts)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn pending_files_are_filtered_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = DlqDirectory::new(tmp.path(), tmp.path().join("processed"));

        write(tmp.path(), "failed-b.json", "{}");
        write(tmp.path(), "failed-a.json", "{}");
        write(tmp.path(), "notes.json", "{}");
        write(tmp.path(), "failed-c.json.tmp", "{}");
        fs::create_dir(tmp.path().join("processed")).unwrap();
        write(&tmp.path().join("processed"), "failed-0.json", "{}");

        let names: Vec<String> = queue
            .pending_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["failed-a.json", "failed-b.json"]);
    }

    #[test]
    fn missing_directory_has_nothing_pending() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = DlqDirectory::new(tmp.path().join("absent"), tmp.path().join("processed"));

        assert!(queue.pending_files().unwrap().is_empty());
    }

    #[test]
    fn mark_processed_moves_file() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = DlqDirectory::new(tmp.path(), tmp.path().join("processed"));
        let path = write(tmp.path(), "failed-1.json", r#"{"booking_data":{}}"#);

        let dest = queue.mark_processed(&path).unwrap();

        assert!(!path.exists());
        assert_eq!(dest, tmp.path().join("processed").join("failed-1.json"));
        assert_eq!(fs::read_to_string(dest).unwrap(), r#"{"booking_data":{}}"#);
    }

    #[test]
    fn mark_failed_rewrites_with_retry_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "failed-1.json",
            r#"{"booking_data":{},"recovery_attempts":1,"error":"timeout"}"#,
        );
        let mut record = DlqDirectory::read_record(&path).unwrap();

        let attempts = DlqDirectory::mark_failed(&path, &mut record, Utc::now()).unwrap();

        assert_eq!(attempts, 2);
        let rewritten: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rewritten["recovery_attempts"], json!(2));
        assert_eq!(rewritten["error"], json!("timeout"));
        assert!(rewritten["last_recovery_attempt"].is_string());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn read_record_reports_malformed_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "failed-1.json", "{not json");

        let err = DlqDirectory::read_record(&path).unwrap_err();
        assert!(matches!(err, RecoveryError::Parse { .. }));
    }
}
