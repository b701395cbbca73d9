//! Client Metrics
//!
//! Request and stream counters recorded through the `metrics` facade.
//! Nothing is exported by this crate: the embedding application installs a
//! recorder (and may call [`describe_metrics`] once afterwards). Without a
//! recorder every call here is a no-op.
//!
//! # Metrics
//!
//! - `prediction_client_requests_submitted_total`
//! - `prediction_client_requests_finished_total{outcome}`
//! - `prediction_client_fragments_received_total`
//! - `prediction_client_records_decoded_total{kind}`
//! - `prediction_client_request_duration_seconds{outcome}`

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

use crate::domain::lifecycle::LifecycleState;

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(
        "prediction_client_requests_submitted_total",
        "Prediction requests submitted"
    );
    describe_counter!(
        "prediction_client_requests_finished_total",
        "Prediction requests that reached a terminal state, by outcome"
    );
    describe_counter!(
        "prediction_client_fragments_received_total",
        "Raw stream fragments received"
    );
    describe_counter!(
        "prediction_client_records_decoded_total",
        "Payload records decoded, by event kind"
    );
    describe_histogram!(
        "prediction_client_request_duration_seconds",
        "Time from submission to terminal state"
    );
}

/// Terminal outcome label for a state.
///
/// Non-terminal states map to `"unfinished"`.
#[must_use]
pub const fn outcome_label(state: &LifecycleState) -> &'static str {
    match state {
        LifecycleState::Complete(_) => "complete",
        LifecycleState::Failed(reason) => reason.kind(),
        _ => "unfinished",
    }
}

/// Record a submission.
pub fn record_submitted() {
    counter!("prediction_client_requests_submitted_total").increment(1);
}

/// Record a received fragment.
pub fn record_fragment() {
    counter!("prediction_client_fragments_received_total").increment(1);
}

/// Record a decoded payload record.
pub fn record_decoded(kind: &'static str) {
    counter!("prediction_client_records_decoded_total", "kind" => kind).increment(1);
}

/// Record a terminal outcome and the request duration.
pub fn record_finished(state: &LifecycleState, elapsed: Duration) {
    let outcome = outcome_label(state);
    counter!("prediction_client_requests_finished_total", "outcome" => outcome).increment(1);
    histogram!("prediction_client_request_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}
