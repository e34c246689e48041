/// Domain-level errors raised while turning a DLQ record into a booking.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The derived booking is missing something the store requires.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A booking date/time pair from the webhook metadata could not be parsed.
    #[error("Invalid booking timestamp '{date} {time}'")]
    InvalidTimestamp { date: String, time: String },
}
