//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use prediction_stream_client::{
    FragmentSource, RequestKey, StateStore, StateUpdate, StreamTransport, StreamingRequestClient,
    TransportError,
};

pub const PROGRESS_3_OF_10: &str =
    "data: {\"status\":\"progress\",\"classified_news\":3,\"total_news\":10}\n\n";

pub const COMPLETE: &str = concat!(
    "data: {\"status\":\"complete\",\"symbol\":\"AAPL\",",
    "\"positive_count\":7,\"negative_count\":2,\"neutral_count\":1,",
    "\"positive_probability\":0.7,\"negative_probability\":0.2,\"neutral_probability\":0.1,",
    "\"message\":\"Prediction and sentiment summary for AAPL saved successfully.\"}\n\n"
);

type Fragment = Result<Bytes, TransportError>;

enum Script {
    Fail(TransportError),
    Stream(mpsc::UnboundedReceiver<Fragment>),
}

/// Transport whose streams are fed by the test, one script queue per symbol.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a stream for the next `open` of `symbol`.
    pub fn stream(&self, symbol: &str) -> StreamFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(symbol, Script::Stream(rx));
        StreamFeed { tx }
    }

    /// Make the next `open` of `symbol` fail.
    pub fn fail_open(&self, symbol: &str, err: TransportError) {
        self.push(symbol, Script::Fail(err));
    }

    fn push(&self, symbol: &str, script: Script) {
        self.scripts
            .lock()
            .entry(symbol.to_string())
            .or_default()
            .push_back(script);
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    async fn open(&self, key: &RequestKey) -> Result<Box<dyn FragmentSource>, TransportError> {
        let script = self
            .scripts
            .lock()
            .get_mut(key.symbol())
            .and_then(VecDeque::pop_front);
        match script {
            Some(Script::Stream(rx)) => Ok(Box::new(ChannelSource { rx })),
            Some(Script::Fail(err)) => Err(err),
            None => Err(TransportError::Connect(format!(
                "no scripted stream for {}",
                key.symbol()
            ))),
        }
    }
}

struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Fragment>,
}

#[async_trait]
impl FragmentSource for ChannelSource {
    async fn next_fragment(&mut self) -> Option<Fragment> {
        self.rx.recv().await
    }
}

/// Test side of a scripted stream. Dropping it ends the stream normally.
pub struct StreamFeed {
    tx: mpsc::UnboundedSender<Fragment>,
}

impl StreamFeed {
    /// Send a fragment. Ignored once the client has closed the stream.
    pub fn send(&self, fragment: impl AsRef<[u8]>) {
        let _ = self
            .tx
            .send(Ok(Bytes::copy_from_slice(fragment.as_ref())));
    }

    /// Break the connection mid-stream.
    pub fn fail(&self, err: TransportError) {
        let _ = self.tx.send(Err(err));
    }

    /// End the stream.
    pub fn close(self) {}

    /// Wait until the client drops its end of the stream.
    pub async fn closed(&self) {
        tokio::time::timeout(Duration::from_secs(2), self.tx.closed())
            .await
            .expect("client did not close the stream");
    }
}

/// Client publishing into a fresh store.
pub fn client(transport: Arc<ScriptedTransport>) -> (StreamingRequestClient, Arc<StateStore>) {
    let store = Arc::new(StateStore::default());
    let client = StreamingRequestClient::new(transport, store.clone());
    (client, store)
}

pub fn key(symbol: &str) -> RequestKey {
    RequestKey::new(symbol, None).unwrap()
}

/// Every update already buffered on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<StateUpdate>) -> Vec<StateUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

/// `symbol:state` labels, e.g. `AAPL:pending`.
pub fn labels(updates: &[StateUpdate]) -> Vec<String> {
    updates
        .iter()
        .map(|u| format!("{}:{}", u.key.symbol(), u.state.name()))
        .collect()
}
