//! Booking derivation from a DLQ record.
//!
//! Precedence, highest first:
//!
//! 1. Non-empty `booking_data` on the record is used as-is. Nothing is
//!    merged in from the webhook payload.
//! 2. Otherwise fields are rebuilt from the Stripe checkout session at
//!    `original_input.data.object`:
//!    - customer name/email/phone: `customer_details.*`, then
//!      `metadata.customer_*`
//!    - `service_id` and `service_name` from `metadata.service_id` and
//!      `metadata.serviceName`
//!    - `start_time`/`end_time` from `metadata.booking_date` +
//!      `metadata.booking_time`, one hour apart
//!    - payment fields from the session object itself
//!    - `status` is always `"confirmed"`
//!
//! The result is then passed through the [`BookingFields`] allow-list.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::booking::{
    Booking, BookingFields, AMOUNT_CENTS, CLIENT_REFERENCE, CURRENCY, CUSTOMER_EMAIL,
    CUSTOMER_NAME, CUSTOMER_PHONE, END_TIME, PAYMENT_INTENT_ID, SERVICE_ID, SERVICE_NAME,
    START_TIME, STATUS, STRIPE_SESSION_ID,
};
use crate::dlq::DlqRecord;
use crate::error::CoreError;
use crate::types::JsonObject;

/// Status assigned to bookings rebuilt from a paid checkout session.
pub const RECONSTRUCTED_STATUS: &str = "confirmed";

/// Length of an appointment when only the start is known.
pub const DEFAULT_APPOINTMENT_MINUTES: i64 = 60;

/// Output convention for reconstructed timestamps (`2026-01-01T10:00:00Z`).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Derive the booking to insert for `record`, filtered through `fields`.
///
/// The caller is responsible for [`Booking::validate`].
pub fn derive_booking(record: &DlqRecord, fields: &BookingFields) -> Result<Booking, CoreError> {
    let data = match record.direct_booking_data() {
        Some(direct) => direct.clone(),
        None => reconstruct_from_webhook(record.original_input())?,
    };
    Ok(fields.filter(data))
}

/// Rebuild booking fields from a Stripe `checkout.session.completed` event.
///
/// Missing sub-objects are treated as empty, so an unrelated payload yields
/// a booking with only `status` set.
pub fn reconstruct_from_webhook(original_input: &Value) -> Result<JsonObject, CoreError> {
    let session = original_input.pointer("/data/object");
    let metadata = session.and_then(|s| s.get("metadata"));
    let customer = session.and_then(|s| s.get("customer_details"));

    let mut booking = JsonObject::new();

    put(
        &mut booking,
        CUSTOMER_NAME,
        first_present(field(customer, "name"), field(metadata, "customer_name")),
    );
    put(
        &mut booking,
        CUSTOMER_EMAIL,
        first_present(field(customer, "email"), field(metadata, "customer_email")),
    );
    put(
        &mut booking,
        CUSTOMER_PHONE,
        first_present(field(customer, "phone"), field(metadata, "customer_phone")),
    );
    put(&mut booking, SERVICE_ID, field(metadata, "service_id"));
    put(&mut booking, SERVICE_NAME, field(metadata, "serviceName"));
    booking.insert(STATUS.to_string(), Value::from(RECONSTRUCTED_STATUS));

    if let (Some(date), Some(time)) = (
        text(field(metadata, "booking_date")),
        text(field(metadata, "booking_time")),
    ) {
        let (start, end) = booking_window(date, time)?;
        booking.insert(START_TIME.to_string(), Value::from(start));
        booking.insert(END_TIME.to_string(), Value::from(end));
    }

    put(&mut booking, STRIPE_SESSION_ID, field(session, "id"));
    put(&mut booking, PAYMENT_INTENT_ID, field(session, "payment_intent").filter(|v| v.is_string()));
    put(&mut booking, AMOUNT_CENTS, field(session, "amount_total"));
    put(&mut booking, CURRENCY, field(session, "currency"));
    put(&mut booking, CLIENT_REFERENCE, field(session, "client_reference_id"));

    Ok(booking)
}

/// Compute `(start_time, end_time)` from a `YYYY-MM-DD` date and an
/// `HH:MM` (or `HH:MM:SS`) time, both in UTC.
///
/// # Examples
///
/// ```
/// use clinicflow_core::reconstruct::booking_window;
///
/// let (start, end) = booking_window("2026-01-01", "10:00").unwrap();
/// assert_eq!(start, "2026-01-01T10:00:00Z");
/// assert_eq!(end, "2026-01-01T11:00:00Z");
/// ```
pub fn booking_window(date: &str, time: &str) -> Result<(String, String), CoreError> {
    let invalid = || CoreError::InvalidTimestamp {
        date: date.to_string(),
        time: time.to_string(),
    };

    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let clock = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|_| invalid())?;

    let start = NaiveDateTime::new(day, clock);
    let end = start + Duration::minutes(DEFAULT_APPOINTMENT_MINUTES);

    Ok((
        start.format(TIMESTAMP_FORMAT).to_string(),
        end.format(TIMESTAMP_FORMAT).to_string(),
    ))
}

// ---- private helpers ----

fn field<'a>(parent: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    parent.and_then(|p| p.get(key)).filter(|v| is_present(v))
}

/// Null and empty strings count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn first_present<'a>(primary: Option<&'a Value>, fallback: Option<&'a Value>) -> Option<&'a Value> {
    primary.or(fallback)
}

fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

fn put(booking: &mut JsonObject, key: &str, value: Option<&Value>) {
    if let Some(value) = value {
        booking.insert(key.to_string(), value.clone());
    }
}
