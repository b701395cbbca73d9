//! Prediction Stream Decoding
//!
//! Turns the raw byte stream of a prediction request into typed events:
//!
//! - **frame**: reassembles newline-delimited records from arbitrary chunks
//! - **messages**: wire payload shapes
//! - **codec**: validates payloads into `StreamEvent` values
//!
//! # Wire Format
//!
//! ```text
//! data: {"status":"progress","classified_news":3,"total_news":10}\n
//! \n
//! data: {"status":"complete","positive_count":7,...}\n
//! ```
//!
//! Only records starting with `data:` carry payloads. Blank separator lines,
//! `:` comments and other SSE fields are skipped.

pub mod codec;
pub mod frame;
pub mod messages;

pub use codec::{DecodeError, EventDecoder};
pub use frame::{DATA_PREFIX, DEFAULT_MAX_RECORD_BYTES, EventRecord, FrameParser, FramingError};
