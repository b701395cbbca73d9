//! Domain Layer - Core request and lifecycle types.
//!
//! This layer contains the request identity, the typed stream events, and
//! the request lifecycle state machine. Nothing here performs I/O; state
//! transitions leave the domain only through the `StatePublisher` port.

/// Request identity (symbol + optional date) and request IDs.
pub mod request;

/// Typed stream events decoded from the prediction stream.
pub mod events;

/// Request lifecycle state machine.
pub mod lifecycle;

/// Persisted prediction records served by the prediction list endpoint.
pub mod prediction;
