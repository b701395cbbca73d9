//! Event Codec
//!
//! Validates one `data:` record into a typed [`StreamEvent`].
//!
//! Payloads are first parsed into a raw JSON value so the `status` tag can
//! be inspected, then deserialized into the matching wire shape and checked
//! against the event invariants:
//!
//! - progress: `classified_news <= total_news`
//! - complete: every probability finite and within `[0, 1]`
//!
//! A failure here is never skipped: the lifecycle fails the whole request.

use super::frame::EventRecord;
use super::messages::{CompletePayload, ErrorPayload, ProgressPayload};
use crate::domain::events::{CompletionEvent, ErrorEvent, ProgressEvent, StreamEvent};
use crate::domain::lifecycle::FailureReason;

/// Payload validation errors.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The record has no `data:` marker.
    #[error("record is not a data record")]
    NotPayload,

    /// Payload was not JSON or did not match its shape.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// `status` field missing or not a string.
    #[error("payload has no status field")]
    MissingStatus,

    /// Unknown `status` value.
    #[error("unknown event status: {0}")]
    UnknownStatus(String),

    /// More items classified than exist.
    #[error("progress {classified}/{total} exceeds total")]
    ProgressOverflow {
        /// Classified count reported.
        classified: u64,
        /// Total count reported.
        total: u64,
    },

    /// Probability outside `[0, 1]` or not finite.
    #[error("{field} out of range: {value}")]
    ProbabilityOutOfRange {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
}

impl From<DecodeError> for FailureReason {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// JSON decoder for prediction stream records.
#[derive(Debug, Default, Clone)]
pub struct EventDecoder;

impl EventDecoder {
    /// Create a new decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode a `data:` record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not a payload record, the payload
    /// is malformed, or it violates an event invariant.
    pub fn decode(&self, record: &EventRecord) -> Result<StreamEvent, DecodeError> {
        let payload = record.payload().ok_or(DecodeError::NotPayload)?;
        self.decode_payload(payload)
    }

    /// Decode the JSON text of a payload.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_payload(&self, payload: &str) -> Result<StreamEvent, DecodeError> {
        let value: serde_json::Value = serde_json::from_str(payload.trim())?;

        let status = value
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or(DecodeError::MissingStatus)?
            .to_string();

        match status.as_str() {
            "progress" => {
                let p: ProgressPayload = serde_json::from_value(value)?;
                Self::progress(p).map(StreamEvent::Progress)
            }
            "complete" => {
                let c: CompletePayload = serde_json::from_value(value)?;
                Self::completion(c).map(StreamEvent::Complete)
            }
            "error" => {
                let e: ErrorPayload = serde_json::from_value(value)?;
                Ok(StreamEvent::Error(ErrorEvent { message: e.message }))
            }
            _ => Err(DecodeError::UnknownStatus(status)),
        }
    }

    fn progress(p: ProgressPayload) -> Result<ProgressEvent, DecodeError> {
        if p.classified_news > p.total_news {
            return Err(DecodeError::ProgressOverflow {
                classified: p.classified_news,
                total: p.total_news,
            });
        }
        Ok(ProgressEvent {
            classified_count: p.classified_news,
            total_count: p.total_news,
        })
    }

    fn completion(c: CompletePayload) -> Result<CompletionEvent, DecodeError> {
        check_probability("positive_probability", c.positive_probability)?;
        check_probability("negative_probability", c.negative_probability)?;
        check_probability("neutral_probability", c.neutral_probability)?;

        Ok(CompletionEvent {
            positive_count: c.positive_count,
            negative_count: c.negative_count,
            neutral_count: c.neutral_count,
            positive_probability: c.positive_probability,
            negative_probability: c.negative_probability,
            neutral_probability: c.neutral_probability,
            message: c.message,
        })
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), DecodeError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DecodeError::ProbabilityOutOfRange { field, value })
    }
}
