//! Request Lifecycle State Machine
//!
//! Tracks one submission from acceptance to its single terminal outcome.
//!
//! # States
//!
//! ```text
//!            begin            progress (repeatable)
//!   Idle ───────────► Pending ─────────────► InProgress ──┐
//!    │                  │  │                   │    ▲     │ progress
//!    │                  │  │                   │    └─────┘
//!    │                  │  └──── complete ─────┼──────────► Complete
//!    │                  └─────── error/fail ───┴──────────► Failed(reason)
//!    └──────────────────── cancel ────────────────────────► Failed(Cancelled)
//! ```
//!
//! `Complete` and `Failed` are terminal. Every applied transition is
//! reported to the caller as `Transition::Applied` so it can be published
//! exactly once; anything that arrives after a terminal state is reported as
//! `Transition::Ignored`.

use std::fmt;

use serde::Serialize;

use super::events::{CompletionEvent, ProgressEvent, StreamEvent};
use super::request::{RequestId, RequestKey};

// =============================================================================
// Failure Reason
// =============================================================================

/// Why a request ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    /// Record boundaries were malformed or the final record was truncated.
    Framing(String),
    /// A well-framed record carried an invalid payload.
    Decode(String),
    /// Connection failure or non-success response status.
    Transport(String),
    /// The server reported an error event.
    Remote(String),
    /// The stream closed before any terminal event.
    PrematureEnd,
    /// Superseded by a newer submission or cancelled by the caller.
    Cancelled,
}

impl FailureReason {
    /// Static label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Framing(_) => "framing",
            Self::Decode(_) => "decode",
            Self::Transport(_) => "transport",
            Self::Remote(_) => "remote",
            Self::PrematureEnd => "premature_end",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Framing(msg) => write!(f, "malformed stream: {msg}"),
            Self::Decode(msg) => write!(f, "invalid event: {msg}"),
            Self::Transport(msg) => write!(f, "connection failed: {msg}"),
            Self::Remote(msg) => f.write_str(msg),
            Self::PrematureEnd => f.write_str("stream ended without completion"),
            Self::Cancelled => f.write_str("request was cancelled"),
        }
    }
}

// =============================================================================
// Lifecycle State
// =============================================================================

/// Observable state of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LifecycleState {
    /// Created, not yet accepted.
    Idle,
    /// Accepted, no event received yet.
    Pending,
    /// Most recent progress received.
    InProgress(ProgressEvent),
    /// Finished successfully.
    Complete(CompletionEvent),
    /// Finished unsuccessfully.
    Failed(FailureReason),
}

impl LifecycleState {
    /// Whether no further transitions can occur.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Failed(_))
    }

    /// Short state name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::InProgress(_) => "in_progress",
            Self::Complete(_) => "complete",
            Self::Failed(_) => "failed",
        }
    }
}

/// A state change to be published to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleTransition {
    /// Submission this change belongs to.
    #[serde(skip)]
    pub request_id: RequestId,
    /// Request identity.
    pub key: RequestKey,
    /// The new state.
    pub state: LifecycleState,
}

/// Outcome of feeding an input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The state changed; the new state must be published.
    Applied(LifecycleTransition),
    /// The input had no effect.
    Ignored,
}

impl Transition {
    /// Whether the state changed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

// =============================================================================
// Request Lifecycle
// =============================================================================

/// State machine for a single submission.
///
/// A lifecycle is never reused: a new submission always creates a new one.
#[derive(Debug)]
pub struct RequestLifecycle {
    id: RequestId,
    key: RequestKey,
    state: LifecycleState,
}

impl RequestLifecycle {
    /// Create a lifecycle in `Idle`.
    #[must_use]
    pub fn new(key: RequestKey) -> Self {
        Self {
            id: RequestId::new(),
            key,
            state: LifecycleState::Idle,
        }
    }

    /// Submission ID.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Request identity.
    #[must_use]
    pub const fn key(&self) -> &RequestKey {
        &self.key
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// Whether a terminal state has been reached.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// `Idle -> Pending`, when the submission is accepted.
    pub fn begin(&mut self) -> Transition {
        if matches!(self.state, LifecycleState::Idle) {
            self.transition_to(LifecycleState::Pending)
        } else {
            Transition::Ignored
        }
    }

    /// Apply one decoded stream event.
    ///
    /// Progress always replaces the previous progress, even when it
    /// regresses or repeats the same values.
    pub fn apply(&mut self, event: StreamEvent) -> Transition {
        if !self.is_accepting_events() {
            tracing::debug!(
                request_id = %self.id,
                state = self.state.name(),
                event = event.kind(),
                "Ignoring event outside an active state"
            );
            return Transition::Ignored;
        }

        match event {
            StreamEvent::Progress(progress) => {
                self.transition_to(LifecycleState::InProgress(progress))
            }
            StreamEvent::Complete(completion) => {
                self.transition_to(LifecycleState::Complete(completion))
            }
            StreamEvent::Error(error) => {
                self.transition_to(LifecycleState::Failed(FailureReason::Remote(error.message)))
            }
        }
    }

    /// Fail an active request (`Pending`/`InProgress -> Failed`).
    pub fn fail(&mut self, reason: FailureReason) -> Transition {
        if self.is_accepting_events() {
            self.transition_to(LifecycleState::Failed(reason))
        } else {
            Transition::Ignored
        }
    }

    /// Cancel a request that has not reached a terminal state.
    ///
    /// Unlike [`fail`](Self::fail) this also applies from `Idle`.
    pub fn cancel(&mut self) -> Transition {
        if self.is_terminal() {
            Transition::Ignored
        } else {
            self.transition_to(LifecycleState::Failed(FailureReason::Cancelled))
        }
    }

    const fn is_accepting_events(&self) -> bool {
        matches!(
            self.state,
            LifecycleState::Pending | LifecycleState::InProgress(_)
        )
    }

    fn transition_to(&mut self, next: LifecycleState) -> Transition {
        tracing::debug!(
            request_id = %self.id,
            symbol = self.key.symbol(),
            from = self.state.name(),
            to = next.name(),
            "Lifecycle transition"
        );
        self.state = next;
        Transition::Applied(LifecycleTransition {
            request_id: self.id,
            key: self.key.clone(),
            state: self.state.clone(),
        })
    }
}
