//! Record Framing
//!
//! `FrameParser` owns the bytes seen since the last complete record. Each
//! `feed` appends a fragment, emits every record terminated by `\n`, and
//! keeps the unterminated tail. Every consumed byte ends up in exactly one
//! emitted record or in the pending tail.
//!
//! Parsing is byte-based, so a multi-byte UTF-8 character split across two
//! fragments is only decoded once its record is complete.

use crate::domain::lifecycle::FailureReason;

/// Marker that introduces a payload record.
pub const DATA_PREFIX: &str = "data:";

/// Default cap on the size of a single pending record (1 MiB).
pub const DEFAULT_MAX_RECORD_BYTES: usize = 1024 * 1024;

/// Record separator.
const SEPARATOR: u8 = b'\n';

// =============================================================================
// Error Type
// =============================================================================

/// Record boundary errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    /// The stream ended in the middle of a record.
    #[error("stream ended mid-record ({pending} bytes pending)")]
    Truncated {
        /// Bytes held in the pending buffer.
        pending: usize,
    },

    /// A record exceeded the configured size limit.
    #[error("record exceeds {limit} bytes")]
    RecordTooLong {
        /// Configured limit.
        limit: usize,
    },

    /// A complete record was not valid UTF-8.
    #[error("record is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

impl From<FramingError> for FailureReason {
    fn from(err: FramingError) -> Self {
        Self::Framing(err.to_string())
    }
}

// =============================================================================
// Event Record
// =============================================================================

/// One complete line of the stream, without its separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    line: String,
}

impl EventRecord {
    /// Wrap a line. A trailing `\r` is stripped.
    #[must_use]
    pub fn new(line: impl Into<String>) -> Self {
        let mut line = line.into();
        if line.ends_with('\r') {
            line.pop();
        }
        Self { line }
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, FramingError> {
        let text =
            std::str::from_utf8(bytes).map_err(|e| FramingError::InvalidUtf8(e.to_string()))?;
        Ok(Self::new(text))
    }

    /// The raw line.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Payload text if this is a `data:` record.
    ///
    /// One optional space after the marker is removed.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.line
            .strip_prefix(DATA_PREFIX)
            .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
    }

    /// Whether this record carries a payload.
    #[must_use]
    pub fn is_payload(&self) -> bool {
        self.line.starts_with(DATA_PREFIX)
    }
}

// =============================================================================
// Frame Parser
// =============================================================================

/// Incremental record parser for one stream.
///
/// A parser is created per submission and never shared between streams.
#[derive(Debug)]
pub struct FrameParser {
    pending: Vec<u8>,
    max_record_bytes: usize,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a parser with the default record size limit.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_max_record_bytes(DEFAULT_MAX_RECORD_BYTES)
    }

    /// Create a parser with a custom record size limit.
    #[must_use]
    pub const fn with_max_record_bytes(max_record_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_record_bytes,
        }
    }

    /// Bytes currently held for an unterminated record.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Append a fragment and return every record it completes, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a completed record is not UTF-8 or the pending
    /// record grows past the size limit. The parser should be discarded
    /// after an error.
    pub fn feed(&mut self, fragment: &[u8]) -> Result<Vec<EventRecord>, FramingError> {
        // `pending` never holds a separator, so only the new bytes need scanning.
        let scan_from = self.pending.len();
        self.pending.extend_from_slice(fragment);

        let mut records = Vec::new();
        let mut start = 0;
        for idx in scan_from..self.pending.len() {
            if self.pending[idx] == SEPARATOR {
                let line = &self.pending[start..idx];
                if line.len() > self.max_record_bytes {
                    return Err(FramingError::RecordTooLong {
                        limit: self.max_record_bytes,
                    });
                }
                records.push(EventRecord::from_bytes(line)?);
                start = idx + 1;
            }
        }
        self.pending.drain(..start);

        if self.pending.len() > self.max_record_bytes {
            return Err(FramingError::RecordTooLong {
                limit: self.max_record_bytes,
            });
        }

        Ok(records)
    }

    /// Check the pending buffer at stream end.
    ///
    /// Whitespace-only leftovers are accepted.
    ///
    /// # Errors
    ///
    /// Returns `FramingError::Truncated` if an unterminated record remains.
    pub fn finish(&mut self) -> Result<(), FramingError> {
        let pending = std::mem::take(&mut self.pending);
        if pending.iter().all(u8::is_ascii_whitespace) {
            Ok(())
        } else {
            Err(FramingError::Truncated {
                pending: pending.len(),
            })
        }
    }
}
