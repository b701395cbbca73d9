//! Prediction Stream Client Binary
//!
//! Submits one prediction request and follows it to completion.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin prediction-stream-client -- AAPL --date 2024-01-15
//! ```
//!
//! # Environment Variables
//!
//! - `PREDICTION_API_URL`: Backend base URL (default: <http://localhost:5000>)
//! - `PREDICTION_STREAM_PATH`: Stream endpoint path (default: /make_prediction)
//! - `PREDICTION_LIST_PATH`: List endpoint path (default: /predictions)
//! - `PREDICTION_MAX_RECORD_BYTES`: Record size limit (default: 1048576)
//! - `PREDICTION_UPDATE_CAPACITY`: State update buffer (default: 256)
//! - `PREDICTION_CONNECT_TIMEOUT_SECS`: Connection setup bound (default: none)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use prediction_stream_client::infrastructure::http::build_client;
use prediction_stream_client::infrastructure::telemetry;
use prediction_stream_client::{
    ClientConfig, HttpPredictionFetcher, LifecycleState, RequestGate, RequestKey,
    ReqwestTransport, StateStore, StreamingRequestClient,
};
use tokio::signal;
use tokio::sync::broadcast;

/// Request a sentiment prediction and follow its progress.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Stock symbol, e.g. AAPL.
    symbol: String,

    /// Prediction date (YYYY-MM-DD); latest data when omitted.
    #[arg(long)]
    date: Option<String>,

    /// Skip fetching the prediction list after completion.
    #[arg(long)]
    no_refresh: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    load_dotenv();
    telemetry::init();

    let config = ClientConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let key = RequestKey::parse(&args.symbol, args.date.as_deref())?;

    let http = build_client(config.stream.connect_timeout)?;
    let transport = Arc::new(ReqwestTransport::new(
        http.clone(),
        config.endpoints.stream_url(),
    ));
    let fetcher = HttpPredictionFetcher::new(http, config.endpoints.list_url());
    let store = Arc::new(StateStore::new(config.stream.update_capacity));

    let client = StreamingRequestClient::new(transport, store.clone())
        .with_max_record_bytes(config.stream.max_record_bytes);
    let gate = RequestGate::new(client);

    let updates = store.subscribe();
    tokio::spawn(log_updates(updates));

    let handle = gate.request(key);

    let state = tokio::select! {
        state = handle.wait() => state,
        result = signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            tracing::info!("Received Ctrl+C, cancelling request");
            gate.cancel_active();
            handle.wait().await
        }
    };

    match state {
        LifecycleState::Complete(completion) => {
            tracing::info!(
                positive = completion.positive_count,
                negative = completion.negative_count,
                neutral = completion.neutral_count,
                message = %completion.message,
                "Prediction complete"
            );
            if !args.no_refresh {
                store.refresh_predictions(&fetcher).await;
                log_predictions(&store);
            }
            Ok(())
        }
        LifecycleState::Failed(reason) => bail!("prediction failed: {reason}"),
        other => bail!("request ended in non-terminal state {}", other.name()),
    }
}

/// Log every published lifecycle update.
async fn log_updates(mut rx: broadcast::Receiver<prediction_stream_client::StateUpdate>) {
    loop {
        match rx.recv().await {
            Ok(update) => match &update.state {
                LifecycleState::InProgress(progress) => tracing::info!(
                    sequence = update.sequence,
                    key = %update.key,
                    classified = progress.classified_count,
                    total = progress.total_count,
                    percent = (progress.fraction() * 100.0).round(),
                    "Classifying news"
                ),
                state => tracing::info!(
                    sequence = update.sequence,
                    key = %update.key,
                    state = state.name(),
                    "State update"
                ),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Update observer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Log the fetched prediction list.
fn log_predictions(store: &StateStore) {
    let snapshot = store.snapshot();
    if let Some(error) = &snapshot.predictions_error {
        tracing::warn!(%error, "Prediction list unavailable");
        return;
    }
    for prediction in &snapshot.predictions {
        tracing::info!(
            id = prediction.id,
            symbol = %prediction.symbol,
            date = %prediction.date_time,
            sentiment = prediction.dominant_sentiment(),
            stock_value = %prediction.stock_value,
            "Stored prediction"
        );
    }
}

/// Log the parsed configuration.
fn log_config(config: &ClientConfig) {
    tracing::info!(
        stream_url = %config.endpoints.stream_url(),
        list_url = %config.endpoints.list_url(),
        max_record_bytes = config.stream.max_record_bytes,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
