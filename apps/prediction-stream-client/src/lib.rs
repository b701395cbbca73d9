#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Prediction Stream Client - Streaming Request Lifecycle
//!
//! Submits sentiment prediction requests to the prediction backend, reads
//! the chunked progress stream it answers with, and publishes every
//! lifecycle transition into a shared state container for the UI.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure types and the lifecycle state machine
//!   - `request`: Request identity (symbol, optional date)
//!   - `events`: Progress, completion and error events
//!   - `lifecycle`: `Idle → Pending → InProgress → Complete | Failed`
//!   - `prediction`: Stored predictions from the list endpoint
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Transport, fragment source, publisher, fetcher
//!   - `services`: Streaming client, request handles, single-flight gate
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `stream`: Frame parser and event decoder
//!   - `http`: reqwest transport and prediction list fetcher
//!   - `store`: Shared state container
//!   - `config`: Environment configuration
//!   - `metrics`, `telemetry`: Observability
//!
//! # Data Flow
//!
//! ```text
//! RequestGate ──► StreamingRequestClient ──► StreamTransport (POST)
//!                        │                          │ fragments
//!                        ▼                          ▼
//!                 RequestLifecycle ◄── EventDecoder ◄── FrameParser
//!                        │
//!                        ▼ transitions
//!                   StateStore ──► observers
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::events::{CompletionEvent, ErrorEvent, ProgressEvent, StreamEvent};
pub use domain::lifecycle::{
    FailureReason, LifecycleState, LifecycleTransition, RequestLifecycle, Transition,
};
pub use domain::prediction::{FuturePrices, Prediction};
pub use domain::request::{RequestId, RequestKey, RequestKeyError};

// Ports
pub use application::ports::{
    FetchError, FragmentSource, PredictionFetcher, StatePublisher, StreamTransport,
    TransportError,
};

// Services
pub use application::services::{RequestGate, RequestHandle, StreamingRequestClient};

// Stream decoding
pub use infrastructure::stream::{
    DecodeError, EventDecoder, EventRecord, FrameParser, FramingError,
};

// Adapters
pub use infrastructure::config::{ClientConfig, ConfigError};
pub use infrastructure::http::{HttpPredictionFetcher, ReqwestTransport};
pub use infrastructure::store::{StateStore, StateUpdate, StoreSnapshot};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, init as init_telemetry};
