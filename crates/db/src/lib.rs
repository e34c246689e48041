//! Booking store access for DLQ recovery.
//!
//! - [`BookingStore`] — the async seam the runner depends on.
//! - [`RestBookingStore`] — the hosted-database REST implementation.
//! - [`StoreConfig`] — credentials and endpoint settings from the environment.

pub mod config;
pub mod error;
pub mod rest;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use rest::RestBookingStore;
pub use store::{BookingStore, StoredBooking};
