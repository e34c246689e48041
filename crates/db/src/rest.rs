//! PostgREST-backed [`BookingStore`].
//!
//! Talks to the hosted database's REST endpoint for the bookings table:
//! a filtered `GET` for idempotency lookups and a `POST` with
//! `Prefer: return=representation` for inserts.

use async_trait::async_trait;
use clinicflow_core::booking::STRIPE_SESSION_ID;
use clinicflow_core::Booking;
use reqwest::Method;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::{BookingStore, StoredBooking};

/// HTTP client for one bookings table.
pub struct RestBookingStore {
    client: reqwest::Client,
    table_url: String,
    service_key: String,
}

impl RestBookingStore {
    /// Build a store with its own HTTP client using the configured timeout.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build a store reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &StoreConfig) -> Self {
        Self {
            client,
            table_url: config.table_url(),
            service_key: config.service_key.clone(),
        }
    }

    // ---- private helpers ----

    fn request(&self, method: Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Ensure the response has a success status code, otherwise capture the
    /// status and body in a [`StoreError::Api`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Decode a PostgREST row array and keep the first row.
    async fn first_row(response: reqwest::Response) -> Result<Option<StoredBooking>, StoreError> {
        let response = Self::ensure_success(response).await?;
        let rows: Vec<StoredBooking> = response.json().await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl BookingStore for RestBookingStore {
    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredBooking>, StoreError> {
        tracing::debug!(session_id, "Looking up booking by session id");

        let response = self
            .request(Method::GET)
            .query(&[
                ("select", "id".to_string()),
                (STRIPE_SESSION_ID, format!("eq.{session_id}")),
            ])
            .send()
            .await?;

        Self::first_row(response).await
    }

    async fn insert(&self, booking: &Booking) -> Result<Option<StoredBooking>, StoreError> {
        tracing::debug!(fields = booking.as_object().len(), "Inserting booking");

        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(booking)
            .send()
            .await?;

        Self::first_row(response).await
    }
}
