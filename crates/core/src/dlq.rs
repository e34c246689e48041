//! Dead-letter-queue record as written by the booking automation.
//!
//! The upstream workflow is not strict about value types, so any JSON object
//! reads as a record: a non-numeric retry counter counts as zero and
//! `booking_data` that is not an object counts as empty. Unknown top-level
//! keys are captured in [`DlqRecord::extra`] and written back with their
//! values and relative order when the record is rewritten after a failed
//! recovery. Explicit `null`s on `booking_data` and `original_input` are
//! kept as well.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{JsonObject, Timestamp};

/// Filename prefix of pending DLQ records.
pub const DLQ_FILE_PREFIX: &str = "failed-";

/// Filename extension of pending DLQ records.
pub const DLQ_FILE_EXTENSION: &str = "json";

const BOOKING_DATA: &str = "booking_data";
const ORIGINAL_INPUT: &str = "original_input";
const RECOVERY_ATTEMPTS: &str = "recovery_attempts";
const LAST_RECOVERY_ATTEMPT: &str = "last_recovery_attempt";

/// One failed booking-ingestion attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonObject")]
pub struct DlqRecord {
    /// Canonical booking fields, when the upstream step got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_data: Option<Value>,

    /// Raw upstream payload, usually a Stripe checkout webhook event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_input: Option<Value>,

    pub recovery_attempts: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_recovery_attempt: Option<String>,

    #[serde(flatten)]
    pub extra: JsonObject,
}

impl From<JsonObject> for DlqRecord {
    fn from(object: JsonObject) -> Self {
        let mut record = DlqRecord::default();
        for (key, value) in object {
            match key.as_str() {
                BOOKING_DATA => record.booking_data = Some(value),
                ORIGINAL_INPUT => record.original_input = Some(value),
                RECOVERY_ATTEMPTS => record.recovery_attempts = attempt_count(&value),
                LAST_RECOVERY_ATTEMPT => {
                    record.last_recovery_attempt = value.as_str().map(str::to_string)
                }
                _ => {
                    record.extra.insert(key, value);
                }
            }
        }
        record
    }
}

/// Retry counter as written upstream. Anything that is not a non-negative
/// number (or a string holding one) counts as no attempts yet.
fn attempt_count(value: &Value) -> u32 {
    let count = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    count.map_or(0, |c| u32::try_from(c).unwrap_or(u32::MAX))
}

impl DlqRecord {
    /// Returns `true` if `name` looks like a pending DLQ file (`failed-*.json`).
    pub fn is_pending_file_name(name: &str) -> bool {
        name.strip_prefix(DLQ_FILE_PREFIX)
            .and_then(|rest| rest.strip_suffix(DLQ_FILE_EXTENSION))
            .is_some_and(|stem| stem.ends_with('.'))
    }

    /// Non-empty direct booking data, if any.
    pub fn direct_booking_data(&self) -> Option<&JsonObject> {
        self.booking_data
            .as_ref()
            .and_then(Value::as_object)
            .filter(|data| !data.is_empty())
    }

    /// Raw upstream payload, `null` when absent.
    pub fn original_input(&self) -> &Value {
        static NULL: Value = Value::Null;
        self.original_input.as_ref().unwrap_or(&NULL)
    }

    /// Whether the retry counter has reached `max_attempts`.
    ///
    /// `None` disables the cutoff.
    pub fn is_exhausted(&self, max_attempts: Option<u32>) -> bool {
        max_attempts.is_some_and(|max| self.recovery_attempts >= max)
    }

    /// Bump the retry counter and stamp the attempt time.
    pub fn record_failed_attempt(&mut self, at: Timestamp) {
        self.recovery_attempts = self.recovery_attempts.saturating_add(1);
        self.last_recovery_attempt = Some(at.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let record: DlqRecord = serde_json::from_value(json!({})).unwrap();

        assert_eq!(record.booking_data, None);
        assert!(record.original_input().is_null());
        assert_eq!(record.recovery_attempts, 0);
        assert_eq!(record.last_recovery_attempt, None);
    }

    #[test]
    fn unknown_keys_survive_rewrite() {
        let record: DlqRecord = serde_json::from_value(json!({
            "booking_data": {},
            "workflow": "stripe-confirmation",
            "error": "duplicate key value violates unique constraint",
        }))
        .unwrap();

        let rewritten = serde_json::to_value(&record).unwrap();
        assert_eq!(rewritten["error"], "duplicate key value violates unique constraint");
        assert_eq!(rewritten["workflow"], "stripe-confirmation");
        assert_eq!(rewritten["booking_data"], json!({}));
        assert_eq!(rewritten["recovery_attempts"], 0);

        let keys: Vec<&str> = record.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["workflow", "error"]);
    }

    #[test]
    fn explicit_nulls_survive_rewrite() {
        let record: DlqRecord =
            serde_json::from_str(r#"{"booking_data":null,"original_input":null}"#).unwrap();

        let rewritten = serde_json::to_value(&record).unwrap();
        let object = rewritten.as_object().unwrap();
        assert_eq!(object.get("booking_data"), Some(&Value::Null));
        assert_eq!(object.get("original_input"), Some(&Value::Null));
        assert!(!object.contains_key("last_recovery_attempt"));
    }

    #[test]
    fn loose_retry_counters_are_tolerated() {
        let cases = [
            (json!(null), 0),
            (json!(1.0), 1),
            (json!(-2), 0),
            (json!("4"), 4),
            (json!("often"), 0),
            (json!([1]), 0),
            (json!(2), 2),
        ];
        for (raw, expected) in cases {
            let record: DlqRecord =
                serde_json::from_value(json!({ "recovery_attempts": raw.clone() })).unwrap();
            assert_eq!(record.recovery_attempts, expected, "input {raw}");
        }
    }

    #[test]
    fn non_string_last_attempt_is_ignored() {
        let record: DlqRecord =
            serde_json::from_value(json!({ "last_recovery_attempt": 1767225600 })).unwrap();
        assert_eq!(record.last_recovery_attempt, None);
    }

    #[test]
    fn non_object_document_is_not_a_record() {
        assert!(serde_json::from_value::<DlqRecord>(json!([{"booking_data": {}}])).is_err());
    }

    #[test]
    fn failed_attempt_increments_counter_and_stamps_time() {
        let mut record = DlqRecord {
            recovery_attempts: 2,
            ..Default::default()
        };
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 4, 9, 30, 0).unwrap();

        record.record_failed_attempt(at);

        assert_eq!(record.recovery_attempts, 3);
        assert_eq!(
            record.last_recovery_attempt.as_deref(),
            Some("2026-03-04T09:30:00.000Z")
        );
    }

    #[test]
    fn exhaustion_respects_optional_limit() {
        let record = DlqRecord {
            recovery_attempts: 3,
            ..Default::default()
        };

        assert!(record.is_exhausted(Some(3)));
        assert!(!record.is_exhausted(Some(4)));
        assert!(!record.is_exhausted(None));
    }

    #[test]
    fn empty_or_non_object_booking_data_is_not_direct_data() {
        for booking_data in [json!({}), json!([]), json!(null), json!("n/a")] {
            let record = DlqRecord {
                booking_data: Some(booking_data),
                ..Default::default()
            };
            assert!(record.direct_booking_data().is_none());
        }
    }

    #[test]
    fn pending_file_names() {
        assert!(DlqRecord::is_pending_file_name("failed-2026-01-01T10-00.json"));
        assert!(DlqRecord::is_pending_file_name("failed-.json"));
        assert!(!DlqRecord::is_pending_file_name("failed-abc.json.bak"));
        assert!(!DlqRecord::is_pending_file_name("done-abc.json"));
        assert!(!DlqRecord::is_pending_file_name("failed-abcjson"));
    }
}
