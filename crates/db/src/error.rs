/// Errors from the booking store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Neither the primary nor the fallback variable is set.
    #[error("Missing store credentials: set {primary} (or {fallback})")]
    MissingCredentials {
        primary: &'static str,
        fallback: &'static str,
    },

    /// A configuration value is present but unusable.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-2xx status code.
    #[error("Store API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl StoreError {
    /// Configuration problems abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::MissingCredentials { .. } | StoreError::InvalidConfig(_)
        )
    }
}
