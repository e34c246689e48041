//! Booking store connection settings.

use std::fmt;
use std::time::Duration;

use crate::error::StoreError;

/// Default table that receives recovered bookings.
pub const DEFAULT_TABLE: &str = "bookings";

/// Default per-request HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const URL_VAR: &str = "SUPABASE_URL";
const URL_FALLBACK_VAR: &str = "VITE_SUPABASE_URL";
const KEY_VAR: &str = "SUPABASE_SERVICE_KEY";
const KEY_FALLBACK_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Connection settings for the REST booking store.
#[derive(Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Service credential; sent as both `apikey` and bearer token.
    pub service_key: String,
    pub table: String,
    pub timeout: Duration,
}

impl StoreConfig {
    /// Load configuration from the process environment.
    ///
    /// | Variable               | Fallback                    | Default    |
    /// |------------------------|-----------------------------|------------|
    /// | `SUPABASE_URL`         | `VITE_SUPABASE_URL`         | required   |
    /// | `SUPABASE_SERVICE_KEY` | `SUPABASE_SERVICE_ROLE_KEY` | required   |
    /// | `BOOKINGS_TABLE`       | —                           | `bookings` |
    /// | `STORE_TIMEOUT_SECS`   | —                           | `30`       |
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (url_var, url) = [URL_VAR, URL_FALLBACK_VAR]
            .into_iter()
            .find_map(|name| non_empty(name).map(|value| (name, value)))
            .ok_or(StoreError::MissingCredentials {
                primary: URL_VAR,
                fallback: URL_FALLBACK_VAR,
            })?;
        let service_key = non_empty(KEY_VAR)
            .or_else(|| non_empty(KEY_FALLBACK_VAR))
            .ok_or(StoreError::MissingCredentials {
                primary: KEY_VAR,
                fallback: KEY_FALLBACK_VAR,
            })?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(StoreError::InvalidConfig(format!(
                "{url_var} must be an http(s) URL, got '{url}'"
            )));
        }

        let table = non_empty("BOOKINGS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());

        let timeout_secs = match non_empty("STORE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    StoreError::InvalidConfig(format!(
                        "STORE_TIMEOUT_SECS must be a positive whole number of seconds, got '{raw}'"
                    ))
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            service_key,
            table,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Full REST endpoint of the bookings table.
    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish()
    }
}
