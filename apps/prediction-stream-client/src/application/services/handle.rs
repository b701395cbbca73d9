//! Request Handles
//!
//! An [`ActiveRequest`] couples one lifecycle with its publisher and its
//! cancellation flag. The lifecycle sits behind a mutex so that the read
//! loop and `cancel` never interleave halfway through a fragment: each
//! publication happens while the lock is held, which also keeps the
//! publication order identical to the transition order.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::application::ports::StatePublisher;
use crate::domain::lifecycle::{FailureReason, LifecycleState, RequestLifecycle, Transition};
use crate::domain::request::{RequestId, RequestKey};
use crate::infrastructure::metrics;

/// Shared state of one submission.
pub(crate) struct ActiveRequest {
    id: RequestId,
    key: RequestKey,
    lifecycle: Mutex<RequestLifecycle>,
    publisher: Arc<dyn StatePublisher>,
    cancelled: CancellationToken,
    finished: CancellationToken,
    started_at: Instant,
}

impl ActiveRequest {
    pub(crate) fn new(lifecycle: RequestLifecycle, publisher: Arc<dyn StatePublisher>) -> Self {
        Self {
            id: lifecycle.id(),
            key: lifecycle.key().clone(),
            lifecycle: Mutex::new(lifecycle),
            publisher,
            cancelled: CancellationToken::new(),
            finished: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    pub(crate) const fn key(&self) -> &RequestKey {
        &self.key
    }

    /// Token the read loop selects on.
    pub(crate) fn cancellation(&self) -> CancellationToken {
        self.cancelled.clone()
    }

    /// Lock the lifecycle for stream-driven input.
    ///
    /// Returns `None` once the request is cancelled or terminal; the
    /// caller must then drop whatever it was about to process.
    pub(crate) fn live(&self) -> Option<LiveLifecycle<'_>> {
        let guard = self.lifecycle.lock();
        if self.cancelled.is_cancelled() || guard.is_terminal() {
            return None;
        }
        Some(LiveLifecycle {
            guard,
            request: self,
        })
    }

    /// Cancel the stream and force `Failed(Cancelled)` if not terminal.
    pub(crate) fn cancel(&self) {
        // Flag first: a read loop blocked on the lock sees it once it gets in.
        self.cancelled.cancel();
        let mut guard = self.lifecycle.lock();
        let transition = guard.cancel();
        self.commit(transition, guard.state());
    }

    fn commit(&self, transition: Transition, state: &LifecycleState) {
        let Transition::Applied(transition) = transition else {
            return;
        };
        self.publisher.publish(transition);

        if state.is_terminal() {
            let elapsed = self.started_at.elapsed();
            metrics::record_finished(state, elapsed);
            match state {
                LifecycleState::Failed(FailureReason::Cancelled) => tracing::info!(
                    request_id = %self.id,
                    key = %self.key,
                    elapsed_ms = elapsed.as_millis(),
                    "Prediction request cancelled"
                ),
                LifecycleState::Failed(reason) => tracing::warn!(
                    request_id = %self.id,
                    key = %self.key,
                    reason = reason.kind(),
                    detail = %reason,
                    elapsed_ms = elapsed.as_millis(),
                    "Prediction request failed"
                ),
                _ => tracing::info!(
                    request_id = %self.id,
                    key = %self.key,
                    elapsed_ms = elapsed.as_millis(),
                    "Prediction request complete"
                ),
            }
            self.finished.cancel();
        }
    }
}

/// Lifecycle locked for a batch of stream-driven steps.
pub(crate) struct LiveLifecycle<'a> {
    guard: MutexGuard<'a, RequestLifecycle>,
    request: &'a ActiveRequest,
}

impl LiveLifecycle<'_> {
    /// Apply one step, publish it if it changed state, and report whether
    /// the lifecycle is now terminal.
    pub(crate) fn step(&mut self, f: impl FnOnce(&mut RequestLifecycle) -> Transition) -> bool {
        let transition = f(&mut self.guard);
        self.request.commit(transition, self.guard.state());
        self.guard.is_terminal()
    }
}

// =============================================================================
// Request Handle
// =============================================================================

/// Caller-side view of one submission.
///
/// Clones refer to the same submission. Dropping every handle does not
/// cancel the request; use [`cancel`](Self::cancel).
#[derive(Clone)]
pub struct RequestHandle {
    inner: Arc<ActiveRequest>,
}

impl std::fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandle")
            .field("id", &self.inner.id)
            .field("key", &self.inner.key)
            .field("state", &self.state().name())
            .finish()
    }
}

impl RequestHandle {
    pub(crate) const fn new(inner: Arc<ActiveRequest>) -> Self {
        Self { inner }
    }

    /// Submission ID.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.inner.id
    }

    /// Request identity.
    #[must_use]
    pub fn key(&self) -> &RequestKey {
        &self.inner.key
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.inner.lifecycle.lock().state().clone()
    }

    /// Whether the request has reached `Complete` or `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.inner.lifecycle.lock().is_terminal()
    }

    /// Tear down the stream.
    ///
    /// No fragment is processed after this returns, even one already
    /// received. Publishes `Failed(Cancelled)` unless the request was
    /// already terminal. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Wait for the terminal state.
    pub async fn wait(&self) -> LifecycleState {
        self.inner.finished.cancelled().await;
        self.state()
    }
}
