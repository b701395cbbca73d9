//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `StreamTransport`: Opens one prediction stream per submission
//! - `FragmentSource`: Yields raw fragments of an open stream
//! - `StatePublisher`: Receives every lifecycle transition
//! - `PredictionFetcher`: Loads the persisted prediction list

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::lifecycle::{FailureReason, LifecycleTransition};
use crate::domain::prediction::Prediction;
use crate::domain::request::RequestKey;

// =============================================================================
// Transport
// =============================================================================

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided or canonical message.
        message: String,
    },

    /// The connection broke while reading the body.
    #[error("stream read failed: {0}")]
    Read(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportError> for FailureReason {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { message, .. } => Self::Transport(message),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// An open stream delivering arbitrarily-chunked bytes.
///
/// Dropping the source releases the underlying connection.
#[async_trait]
pub trait FragmentSource: Send {
    /// Next raw fragment; `None` once the stream has ended normally.
    async fn next_fragment(&mut self) -> Option<Result<Bytes, TransportError>>;
}

/// Opens prediction streams.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Open one stream scoped to `key`.
    async fn open(&self, key: &RequestKey) -> Result<Box<dyn FragmentSource>, TransportError>;
}

// =============================================================================
// State Publication
// =============================================================================

/// Sink for lifecycle transitions.
///
/// Called synchronously, once per transition, by the live lifecycle only.
pub trait StatePublisher: Send + Sync {
    /// Record one transition.
    fn publish(&self, transition: LifecycleTransition);
}

// =============================================================================
// Prediction List
// =============================================================================

/// Prediction list retrieval failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Request failed before a response arrived.
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success status.
    #[error("server returned {0}")]
    Status(u16),

    /// Body was not a prediction list.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Loads the ordered list of stored predictions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionFetcher: Send + Sync {
    /// Fetch all predictions in server order.
    async fn fetch(&self) -> Result<Vec<Prediction>, FetchError>;
}
