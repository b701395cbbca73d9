//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the application services and port interfaces
//! that define how the domain interacts with external systems.

/// Port interfaces for transports, publishers and fetchers.
pub mod ports;

/// Request submission and single-flight control.
pub mod services;
