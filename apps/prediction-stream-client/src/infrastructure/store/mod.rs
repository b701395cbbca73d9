//! Shared State Store
//!
//! The process-wide state container observed by the UI. It holds the last
//! published lifecycle state and the most recently fetched prediction list.
//!
//! # Writers
//!
//! - Lifecycle transitions arrive through the `StatePublisher` port, from
//!   the live request only.
//! - The prediction list is written by `refresh_predictions`.
//!
//! Observers read snapshots or subscribe to the update channel. Every
//! publication carries a sequence number one greater than the previous
//! publication, so a gap means the observer lagged and an equal pair never
//! occurs.

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::application::ports::{PredictionFetcher, StatePublisher};
use crate::domain::lifecycle::{LifecycleState, LifecycleTransition};
use crate::domain::prediction::Prediction;
use crate::domain::request::{RequestId, RequestKey};

/// Default capacity of the update channel.
pub const DEFAULT_UPDATE_CAPACITY: usize = 256;

// =============================================================================
// Updates and Snapshots
// =============================================================================

/// One published lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate {
    /// Publication number, starting at 1.
    pub sequence: u64,
    /// Submission that published it.
    pub request_id: RequestId,
    /// Request identity.
    pub key: RequestKey,
    /// New lifecycle state.
    pub state: LifecycleState,
}

/// Point-in-time view of the store.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Last published lifecycle update, if any.
    pub lifecycle: Option<StateUpdate>,
    /// Last successfully fetched predictions.
    pub predictions: Vec<Prediction>,
    /// Error from the last failed fetch; cleared by a successful one.
    pub predictions_error: Option<String>,
    /// A fetch is in flight.
    pub predictions_loading: bool,
}

#[derive(Debug, Default)]
struct StoreInner {
    snapshot: StoreSnapshot,
    sequence: u64,
}

// =============================================================================
// State Store
// =============================================================================

/// Shared state container.
#[derive(Debug)]
pub struct StateStore {
    inner: RwLock<StoreInner>,
    updates_tx: broadcast::Sender<StateUpdate>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_CAPACITY)
    }
}

impl StateStore {
    /// Create a store whose update channel buffers `capacity` updates per
    /// observer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            updates_tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    /// Subscribe to lifecycle updates published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.updates_tx.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().snapshot.clone()
    }

    /// Last published lifecycle state, or `Idle` before any publication.
    #[must_use]
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.inner
            .read()
            .snapshot
            .lifecycle
            .as_ref()
            .map_or(LifecycleState::Idle, |u| u.state.clone())
    }

    /// Total publications so far.
    #[must_use]
    pub fn publication_count(&self) -> u64 {
        self.inner.read().sequence
    }

    /// Fetch the prediction list and store the outcome.
    ///
    /// On failure the previous list is kept and the error recorded.
    pub async fn refresh_predictions(&self, fetcher: &dyn PredictionFetcher) {
        {
            let mut inner = self.inner.write();
            inner.snapshot.predictions_loading = true;
            inner.snapshot.predictions_error = None;
        }

        let result = fetcher.fetch().await;

        let mut inner = self.inner.write();
        inner.snapshot.predictions_loading = false;
        match result {
            Ok(predictions) => {
                tracing::debug!(count = predictions.len(), "Prediction list refreshed");
                inner.snapshot.predictions = predictions;
                inner.snapshot.predictions_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch predictions");
                inner.snapshot.predictions_error = Some(e.to_string());
            }
        }
    }
}

impl StatePublisher for StateStore {
    fn publish(&self, transition: LifecycleTransition) {
        // Sequence, snapshot, and channel order are kept identical by doing
        // all three under the write lock.
        let mut inner = self.inner.write();
        inner.sequence += 1;
        let update = StateUpdate {
            sequence: inner.sequence,
            request_id: transition.request_id,
            key: transition.key,
            state: transition.state,
        };
        inner.snapshot.lifecycle = Some(update.clone());
        // No subscribers is not an error; the snapshot still records it.
        let _ = self.updates_tx.send(update);
    }
}
