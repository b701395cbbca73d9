//! Persisted Predictions
//!
//! A prediction is the stored result of one completed request, as served
//! by the prediction list endpoint. The list is refreshed after a request
//! completes; the lifecycle itself never writes it.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closing prices observed after the prediction date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuturePrices {
    /// Price one trading day later.
    #[serde(rename = "1_day", default)]
    pub one_day: Option<Decimal>,
    /// Price two trading days later.
    #[serde(rename = "2_day", default)]
    pub two_day: Option<Decimal>,
    /// Price three trading days later.
    #[serde(rename = "3_day", default)]
    pub three_day: Option<Decimal>,
    /// Price seven trading days later.
    #[serde(rename = "7_day", default)]
    pub seven_day: Option<Decimal>,
}

/// One stored prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Database ID.
    pub id: i64,
    /// Stock symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// When the prediction applies (server-local, no offset).
    pub date_time: NaiveDateTime,
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
    /// Stock price at prediction time.
    pub stock_value: Decimal,
    /// Later closing prices, when known.
    #[serde(default)]
    pub future_prices: FuturePrices,
}

impl Prediction {
    /// Dominant sentiment label by count. Ties resolve to neutral.
    #[must_use]
    pub const fn dominant_sentiment(&self) -> &'static str {
        if self.positive_count > self.negative_count && self.positive_count > self.neutral_count
        {
            "positive"
        } else if self.negative_count > self.positive_count
            && self.negative_count > self.neutral_count
        {
            "negative"
        } else {
            "neutral"
        }
    }
}
