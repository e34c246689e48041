//! Domain types for recovering dead-lettered clinic bookings.
//!
//! - [`booking`] — the booking allow-list and the [`Booking`] record.
//! - [`dlq`] — the on-disk [`DlqRecord`] format.
//! - [`reconstruct`] — mapping a DLQ record to a booking.

pub mod booking;
pub mod dlq;
pub mod error;
pub mod reconstruct;
pub mod types;

pub use booking::{Booking, BookingFields};
pub use dlq::DlqRecord;
pub use error::CoreError;
pub use reconstruct::derive_booking;
