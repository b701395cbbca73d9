//! HTTP End-to-End Tests
//!
//! Runs the gate, the reqwest transport and the store against a mock
//! prediction backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use prediction_stream_client::infrastructure::http::build_client;
use prediction_stream_client::{
    FailureReason, HttpPredictionFetcher, LifecycleState, RequestGate, RequestKey,
    ReqwestTransport, StateStore, StreamingRequestClient,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{COMPLETE, PROGRESS_3_OF_10, drain, labels};

const LIST: &str = r#"[{"id":1,"symbol":"AAPL","name":"Apple Inc","date_time":"2024-01-15T23:59:59",
    "positive_count":7,"negative_count":2,"neutral_count":1,
    "positive_probability":0.7,"negative_probability":0.2,"neutral_probability":0.1,
    "stock_value":185.92}]"#;

struct Backend {
    _server: MockServer,
    gate: RequestGate,
    store: Arc<StateStore>,
    fetcher: HttpPredictionFetcher,
}

async fn backend(stream_response: ResponseTemplate) -> Backend {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/make_prediction"))
        .respond_with(stream_response)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/predictions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIST))
        .mount(&server)
        .await;

    let http = build_client(None).unwrap();
    let transport = Arc::new(ReqwestTransport::new(
        http.clone(),
        format!("{}/make_prediction", server.uri()),
    ));
    let fetcher = HttpPredictionFetcher::new(http, format!("{}/predictions", server.uri()));
    let store = Arc::new(StateStore::default());
    let gate = RequestGate::new(StreamingRequestClient::new(transport, store.clone()));

    Backend {
        _server: server,
        gate,
        store,
        fetcher,
    }
}

#[tokio::test]
async fn complete_prediction_then_refresh() {
    let body = format!("{PROGRESS_3_OF_10}{COMPLETE}");
    let backend = backend(
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/event-stream")
            .set_body_string(body),
    )
    .await;
    let mut rx = backend.store.subscribe();

    let key = RequestKey::parse("aapl", Some("2024-01-15")).unwrap();
    let state = backend.gate.request(key).wait().await;

    assert!(matches!(state, LifecycleState::Complete(_)));
    assert_eq!(
        labels(&drain(&mut rx)),
        vec!["AAPL:pending", "AAPL:in_progress", "AAPL:complete"]
    );

    backend.store.refresh_predictions(&backend.fetcher).await;
    let snapshot = backend.store.snapshot();
    assert_eq!(snapshot.predictions.len(), 1);
    assert_eq!(snapshot.predictions[0].dominant_sentiment(), "positive");
}

#[tokio::test]
async fn rejected_request_surfaces_server_message() {
    let backend = backend(ResponseTemplate::new(400).set_body_string(
        r#"{"status":"error","message":"Prediction for AAPL on 2024-01-15 already exists."}"#,
    ))
    .await;

    let key = RequestKey::parse("AAPL", Some("2024-01-15")).unwrap();
    let state = backend.gate.request(key).wait().await;

    assert_eq!(
        state,
        LifecycleState::Failed(FailureReason::Transport(
            "Prediction for AAPL on 2024-01-15 already exists.".to_string()
        ))
    );
}

#[tokio::test]
async fn body_without_completion_is_premature_end() {
    let backend = backend(ResponseTemplate::new(200).set_body_string(PROGRESS_3_OF_10)).await;

    let key = RequestKey::new("AAPL", None).unwrap();
    let state = backend.gate.request(key).wait().await;

    assert_eq!(state, LifecycleState::Failed(FailureReason::PrematureEnd));
}
