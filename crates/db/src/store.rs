//! The booking store seam used by the recovery runner.

use async_trait::async_trait;
use clinicflow_core::Booking;
use serde::Deserialize;

use crate::error::StoreError;

/// A booking row as returned by the store. Only the id is read back.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoredBooking {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// Persistent booking storage.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Look up an existing booking by its Stripe checkout session id.
    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredBooking>, StoreError>;

    /// Insert `booking` and return the stored row.
    ///
    /// `Ok(None)` means the store accepted the request but returned no row.
    async fn insert(&self, booking: &Booking) -> Result<Option<StoredBooking>, StoreError>;
}
