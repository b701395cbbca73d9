//! HTTP Adapters
//!
//! reqwest implementations of the transport and fetch ports:
//!
//! - [`ReqwestTransport`]: `POST {stream_url}` with a JSON body, read as a
//!   chunked byte stream
//! - [`HttpPredictionFetcher`]: `GET {list_url}` returning a JSON array

mod fetcher;
mod transport;

pub use fetcher::HttpPredictionFetcher;
pub use transport::{ReqwestTransport, build_client};

/// Error message for a non-success response body.
///
/// Prefers the JSON `message` field, then the raw body, then the canonical
/// reason phrase.
pub(crate) fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) =
        serde_json::from_str::<crate::infrastructure::stream::messages::ErrorResponseBody>(body)
    {
        return parsed.message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}
