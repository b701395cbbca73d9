//! Prediction Stream Events
//!
//! The closed set of events a prediction stream can carry. Values of these
//! types are only produced by the stream decoder, which enforces their
//! invariants; nothing downstream inspects raw payloads.

use serde::Serialize;

/// Incremental classification progress.
///
/// Invariant: `classified_count <= total_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// News items classified so far.
    pub classified_count: u64,
    /// Total news items to classify.
    pub total_count: u64,
}

impl ProgressEvent {
    /// Fraction of items classified, in `[0, 1]`. Zero totals report `1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total_count == 0 {
            1.0
        } else {
            self.classified_count as f64 / self.total_count as f64
        }
    }
}

/// Final classification aggregate.
///
/// Probabilities are server-computed and each lies in `[0, 1]`; they are not
/// required to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionEvent {
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
    /// Human-readable summary from the server.
    pub message: String,
}

impl CompletionEvent {
    /// Total number of classified items.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.positive_count + self.negative_count + self.neutral_count
    }
}

/// Server-reported failure. Terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEvent {
    /// Failure description from the server.
    pub message: String,
}

/// One decoded stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Progress update.
    Progress(ProgressEvent),
    /// Successful completion.
    Complete(CompletionEvent),
    /// Server-side error.
    Error(ErrorEvent),
}

impl StreamEvent {
    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Progress(_) => "progress",
            Self::Complete(_) => "complete",
            Self::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_fraction() {
        let e = ProgressEvent {
            classified_count: 3,
            total_count: 12,
        };
        assert!((e.fraction() - 0.25).abs() < f64::EPSILON);

        let empty = ProgressEvent {
            classified_count: 0,
            total_count: 0,
        };
        assert!((empty.fraction() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn event_kinds() {
        let progress = StreamEvent::Progress(ProgressEvent {
            classified_count: 0,
            total_count: 1,
        });
        let error = StreamEvent::Error(ErrorEvent {
            message: "x".to_string(),
        });
        assert_eq!(progress.kind(), "progress");
        assert_eq!(error.kind(), "error");
    }
}
