//! Canonical booking record and the field allow-list applied before insert.
//!
//! A [`Booking`] can only be produced by [`BookingFields::filter`], so every
//! booking that reaches the store carries allow-listed, non-null keys only.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::types::JsonObject;

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

pub const CUSTOMER_NAME: &str = "customer_name";
pub const CUSTOMER_EMAIL: &str = "customer_email";
pub const CUSTOMER_PHONE: &str = "customer_phone";
pub const SERVICE_ID: &str = "service_id";
pub const SERVICE_NAME: &str = "service_name";
pub const START_TIME: &str = "start_time";
pub const END_TIME: &str = "end_time";
pub const STATUS: &str = "status";
pub const AMOUNT_PAID: &str = "amount_paid";
/// Idempotency key used to detect bookings that already reached the store.
pub const STRIPE_SESSION_ID: &str = "stripe_session_id";
pub const PAYMENT_INTENT_ID: &str = "payment_intent_id";
pub const AMOUNT_CENTS: &str = "amount_cents";
pub const CURRENCY: &str = "currency";
pub const CLIENT_REFERENCE: &str = "client_reference";

/// Columns of the `bookings` table that recovery is allowed to write.
pub const DEFAULT_BOOKING_FIELDS: [&str; 14] = [
    CUSTOMER_NAME,
    CUSTOMER_EMAIL,
    CUSTOMER_PHONE,
    SERVICE_ID,
    SERVICE_NAME,
    START_TIME,
    END_TIME,
    STATUS,
    AMOUNT_PAID,
    STRIPE_SESSION_ID,
    PAYMENT_INTENT_ID,
    AMOUNT_CENTS,
    CURRENCY,
    CLIENT_REFERENCE,
];

// ---------------------------------------------------------------------------
// BookingFields
// ---------------------------------------------------------------------------

/// Allow-list of booking keys that may be sent to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFields {
    names: BTreeSet<String>,
}

impl BookingFields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Keep only allow-listed keys with non-null values.
    pub fn filter(&self, data: JsonObject) -> Booking {
        Booking(
            data.into_iter()
                .filter(|(key, value)| self.contains(key) && !value.is_null())
                .collect(),
        )
    }
}

impl Default for BookingFields {
    fn default() -> Self {
        Self::new(DEFAULT_BOOKING_FIELDS)
    }
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// A booking ready for insertion. Serializes as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Booking(JsonObject);

impl Booking {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.text(CUSTOMER_EMAIL)
    }

    pub fn stripe_session_id(&self) -> Option<&str> {
        self.text(STRIPE_SESSION_ID)
    }

    pub fn service_name(&self) -> Option<&str> {
        self.text(SERVICE_NAME)
    }

    pub fn start_time(&self) -> Option<&str> {
        self.text(START_TIME)
    }

    /// Ensure the one required field is present.
    ///
    /// A blank string counts as missing.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.customer_email() {
            Some(_) => Ok(()),
            None => Err(CoreError::Validation(format!(
                "missing {CUSTOMER_EMAIL}, cannot recover"
            ))),
        }
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn filter_drops_unknown_keys_and_nulls() {
        let booking = BookingFields::default().filter(object(json!({
            "customer_email": "ana@example.com",
            "customer_phone": null,
            "service_name": "Cleaning",
            "internal_note": "do not send",
            "id": 44,
        })));

        let keys: Vec<&str> = booking.as_object().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["customer_email", "service_name"]);
    }

    #[test]
    fn custom_allow_list_is_respected() {
        let fields = BookingFields::new(["customer_email"]);
        let booking = fields.filter(object(json!({
            "customer_email": "ana@example.com",
            "service_name": "Cleaning",
        })));

        assert_eq!(booking.as_object().len(), 1);
        assert!(!fields.contains(SERVICE_NAME));
    }

    #[test]
    fn validate_requires_customer_email() {
        let fields = BookingFields::default();

        let ok = fields.filter(object(json!({ "customer_email": "ana@example.com" })));
        assert!(ok.validate().is_ok());

        let missing = fields.filter(object(json!({ "customer_name": "Ana" })));
        assert_matches!(missing.validate(), Err(CoreError::Validation(_)));

        let blank = fields.filter(object(json!({ "customer_email": "  " })));
        assert_matches!(blank.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn session_id_must_be_a_non_empty_string() {
        let fields = BookingFields::default();

        let with_id = fields.filter(object(json!({ "stripe_session_id": "cs_test_1" })));
        assert_eq!(with_id.stripe_session_id(), Some("cs_test_1"));

        let empty = fields.filter(object(json!({ "stripe_session_id": "" })));
        assert_eq!(empty.stripe_session_id(), None);
    }

    #[test]
    fn serializes_as_flat_object() {
        let booking = BookingFields::default().filter(object(json!({
            "customer_email": "ana@example.com",
            "amount_cents": 3000,
        })));

        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(
            value,
            json!({ "customer_email": "ana@example.com", "amount_cents": 3000 })
        );
    }
}
