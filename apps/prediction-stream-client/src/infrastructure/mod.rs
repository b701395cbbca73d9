//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Record framing and payload decoding for prediction streams.
pub mod stream;

/// reqwest adapters for the stream endpoint and the prediction list.
pub mod http;

/// Shared state container observed by the UI.
pub mod store;

/// Configuration loaded from the environment.
pub mod config;

/// Request and stream metrics.
pub mod metrics;

/// Tracing subscriber setup.
pub mod telemetry;
