//! Request Identity
//!
//! A `RequestKey` names one logical prediction request: a stock symbol and
//! an optional calendar date. An absent date means "use the latest
//! available data". Keys are validated and normalized once, at creation,
//! and are immutable afterwards.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

// =============================================================================
// Error Type
// =============================================================================

/// Errors produced while building a `RequestKey`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestKeyError {
    /// Symbol was empty or whitespace only.
    #[error("symbol cannot be empty")]
    EmptySymbol,

    /// Symbol contains characters that cannot appear in a ticker.
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Date was not an ISO calendar date (`YYYY-MM-DD`).
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

// =============================================================================
// Request Key
// =============================================================================

/// Identity of one logical prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequestKey {
    symbol: String,
    date: Option<NaiveDate>,
}

impl RequestKey {
    /// Create a key, normalizing the symbol to trimmed uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty or contains whitespace or
    /// control characters.
    pub fn new(symbol: &str, date: Option<NaiveDate>) -> Result<Self, RequestKeyError> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(RequestKeyError::EmptySymbol);
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(RequestKeyError::InvalidSymbol(trimmed.to_string()));
        }

        Ok(Self {
            symbol: trimmed.to_uppercase(),
            date,
        })
    }

    /// Create a key from a symbol and an optional ISO date string.
    ///
    /// An empty or whitespace-only date string is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is invalid or the date does not parse.
    pub fn parse(symbol: &str, date: Option<&str>) -> Result<Self, RequestKeyError> {
        let date = match date.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| RequestKeyError::InvalidDate(raw.to_string()))?,
            ),
        };
        Self::new(symbol, date)
    }

    /// The normalized (uppercase) symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The requested date, if any.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{}@{}", self.symbol, date.format("%Y-%m-%d")),
            None => write!(f, "{}@latest", self.symbol),
        }
    }
}

// =============================================================================
// Request ID
// =============================================================================

/// Unique identifier of one submission.
///
/// Two submissions of the same `RequestKey` get distinct IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh random ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
