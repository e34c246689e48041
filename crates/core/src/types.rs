/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Loose JSON object, as written by the upstream automation.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
