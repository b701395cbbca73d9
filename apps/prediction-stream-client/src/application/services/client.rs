//! Streaming Request Client
//!
//! Opens one stream per submission and drives its lifecycle from a spawned
//! read loop. The loop suspends only while waiting to open the stream or
//! for the next fragment; each wait is raced against cancellation, and each
//! fragment is parsed, decoded and applied under a single lifecycle lock.

use std::sync::Arc;

use crate::application::ports::{FragmentSource, StatePublisher, StreamTransport};
use crate::domain::lifecycle::{FailureReason, RequestLifecycle};
use crate::domain::request::RequestKey;
use crate::infrastructure::metrics;
use crate::infrastructure::stream::{DEFAULT_MAX_RECORD_BYTES, EventDecoder, FrameParser};

use super::handle::{ActiveRequest, LiveLifecycle, RequestHandle};

/// Submits prediction requests over a [`StreamTransport`].
#[derive(Clone)]
pub struct StreamingRequestClient {
    transport: Arc<dyn StreamTransport>,
    publisher: Arc<dyn StatePublisher>,
    max_record_bytes: usize,
}

impl std::fmt::Debug for StreamingRequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingRequestClient")
            .field("max_record_bytes", &self.max_record_bytes)
            .finish_non_exhaustive()
    }
}

impl StreamingRequestClient {
    /// Create a client publishing every transition to `publisher`.
    #[must_use]
    pub fn new(transport: Arc<dyn StreamTransport>, publisher: Arc<dyn StatePublisher>) -> Self {
        Self {
            transport,
            publisher,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
        }
    }

    /// Override the per-record size limit.
    #[must_use]
    pub const fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.max_record_bytes = max_record_bytes;
        self
    }

    /// Submit a request.
    ///
    /// `Pending` is published before this returns; the stream is opened and
    /// read on a spawned task. Must be called within a Tokio runtime.
    #[must_use = "dropping the handle loses the only way to cancel the request"]
    pub fn submit(&self, key: RequestKey) -> RequestHandle {
        let mut lifecycle = RequestLifecycle::new(key);
        let accepted = lifecycle.begin();
        let request = Arc::new(ActiveRequest::new(lifecycle, Arc::clone(&self.publisher)));

        metrics::record_submitted();
        if let Some(mut live) = request.live() {
            live.step(|_| accepted);
        }
        tracing::info!(key = %request.key(), "Prediction request submitted");

        tokio::spawn(read_loop(
            Arc::clone(&request),
            Arc::clone(&self.transport),
            self.max_record_bytes,
        ));

        RequestHandle::new(request)
    }
}

async fn read_loop(
    request: Arc<ActiveRequest>,
    transport: Arc<dyn StreamTransport>,
    max_record_bytes: usize,
) {
    let cancelled = request.cancellation();

    let opened = tokio::select! {
        biased;
        () = cancelled.cancelled() => return,
        opened = transport.open(request.key()) => opened,
    };

    let source = match opened {
        Ok(source) => source,
        Err(e) => {
            if let Some(mut live) = request.live() {
                live.step(|l| l.fail(e.into()));
            }
            return;
        }
    };

    drive(&request, source, FrameParser::with_max_record_bytes(max_record_bytes)).await;
}

/// Read fragments until the lifecycle is terminal or the request is
/// cancelled. The source is dropped, closing the stream, on return.
async fn drive(request: &ActiveRequest, mut source: Box<dyn FragmentSource>, mut parser: FrameParser) {
    let cancelled = request.cancellation();
    let decoder = EventDecoder::new();

    loop {
        let next = tokio::select! {
            biased;
            () = cancelled.cancelled() => return,
            next = source.next_fragment() => next,
        };

        let Some(mut live) = request.live() else {
            return;
        };

        let terminal = match next {
            Some(Ok(fragment)) => {
                metrics::record_fragment();
                process_fragment(&mut live, &mut parser, &decoder, &fragment)
            }
            Some(Err(e)) => live.step(|l| l.fail(e.into())),
            None => {
                let reason = match parser.finish() {
                    Ok(()) => FailureReason::PrematureEnd,
                    Err(e) => e.into(),
                };
                live.step(|l| l.fail(reason))
            }
        };

        if terminal {
            return;
        }
    }
}

/// Parse, decode and apply one fragment. Returns whether the lifecycle
/// reached a terminal state; later records in the fragment are dropped.
fn process_fragment(
    live: &mut LiveLifecycle<'_>,
    parser: &mut FrameParser,
    decoder: &EventDecoder,
    fragment: &[u8],
) -> bool {
    let records = match parser.feed(fragment) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "Framing error");
            return live.step(|l| l.fail(e.into()));
        }
    };

    for record in records.iter().filter(|r| r.is_payload()) {
        let terminal = match decoder.decode(record) {
            Ok(event) => {
                metrics::record_decoded(event.kind());
                live.step(|l| l.apply(event))
            }
            Err(e) => {
                tracing::warn!(error = %e, record = record.as_str(), "Undecodable record");
                live.step(|l| l.fail(e.into()))
            }
        };
        if terminal {
            return true;
        }
    }
    false
}
