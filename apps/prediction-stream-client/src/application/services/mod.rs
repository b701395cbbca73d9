//! Application Services
//!
//! Services that drive the request lifecycle through the ports.
//!
//! - `StreamingRequestClient`: Opens a stream per submission and runs its read loop
//! - `RequestGate`: Keeps at most one submission live per client
//! - `RequestHandle`: Caller-side view of one submission

mod client;
mod gate;
mod handle;

pub use client::StreamingRequestClient;
pub use gate::RequestGate;
pub use handle::RequestHandle;
