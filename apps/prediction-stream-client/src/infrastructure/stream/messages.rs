//! Wire Payloads
//!
//! Serde shapes of the JSON carried in `data:` records, discriminated by
//! the `status` field. These are converted into domain events by the codec
//! and never leave this module tree.

use serde::{Deserialize, Serialize};

/// `{"status":"progress",...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressPayload {
    /// Items classified so far.
    pub classified_news: u64,
    /// Items to classify in total.
    pub total_news: u64,
}

/// `{"status":"complete",...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletePayload {
    /// Items classified as positive.
    pub positive_count: u64,
    /// Items classified as negative.
    pub negative_count: u64,
    /// Items classified as neutral.
    pub neutral_count: u64,
    /// Aggregate positive probability.
    pub positive_probability: f64,
    /// Aggregate negative probability.
    pub negative_probability: f64,
    /// Aggregate neutral probability.
    pub neutral_probability: f64,
    /// Summary message.
    pub message: String,
}

/// `{"status":"error","message":...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Failure description.
    pub message: String,
}

/// Body of the outbound stream request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequestBody {
    /// Uppercase symbol.
    pub symbol: String,
    /// `YYYY-MM-DD`, or `null` for the latest data.
    pub date: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponseBody {
    /// Failure description.
    pub message: String,
}
