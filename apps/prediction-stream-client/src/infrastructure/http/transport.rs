//! Streaming transport over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::status_message;
use crate::application::ports::{FragmentSource, StreamTransport, TransportError};
use crate::domain::request::RequestKey;
use crate::infrastructure::stream::messages::PredictionRequestBody;

/// Build the shared HTTP client.
///
/// Only connection setup is bounded; an open stream may stay silent for as
/// long as the server needs.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(connect_timeout: Option<Duration>) -> Result<Client, TransportError> {
    let mut builder = Client::builder();
    if let Some(timeout) = connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

/// Opens prediction streams with `POST` requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    stream_url: String,
}

impl ReqwestTransport {
    /// Create a transport for `stream_url`.
    #[must_use]
    pub fn new(client: Client, stream_url: impl Into<String>) -> Self {
        Self {
            client,
            stream_url: stream_url.into(),
        }
    }
}

#[async_trait]
impl StreamTransport for ReqwestTransport {
    async fn open(&self, key: &RequestKey) -> Result<Box<dyn FragmentSource>, TransportError> {
        let body = PredictionRequestBody {
            symbol: key.symbol().to_string(),
            date: key.date().map(|d| d.format("%Y-%m-%d").to_string()),
        };

        let response = self
            .client
            .post(&self.stream_url)
            .header(ACCEPT, "text/event-stream")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = status_message(status, &text);
            tracing::warn!(%key, status = status.as_u16(), %message, "Stream request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(%key, url = %self.stream_url, "Stream opened");
        Ok(Box::new(ResponseFragments {
            inner: response.bytes_stream().boxed(),
        }))
    }
}

/// Response body as a fragment source. Dropping it closes the connection.
struct ResponseFragments {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
}

#[async_trait]
impl FragmentSource for ResponseFragments {
    async fn next_fragment(&mut self) -> Option<Result<Bytes, TransportError>> {
        self.inner
            .next()
            .await
            .map(|r| r.map_err(|e| TransportError::Read(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(server: &MockServer) -> ReqwestTransport {
        ReqwestTransport::new(
            build_client(None).unwrap(),
            format!("{}/make_prediction", server.uri()),
        )
    }

    async fn collect(mut source: Box<dyn FragmentSource>) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(fragment) = source.next_fragment().await {
            out.extend_from_slice(&fragment.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn posts_symbol_and_date() {
        let server = MockServer::start().await;
        let stream = "data: {\"status\":\"progress\",\"classified_news\":1,\"total_news\":2}\n\n";
        Mock::given(method("POST"))
            .and(path("/make_prediction"))
            .and(header("accept", "text/event-stream"))
            .and(body_json(serde_json::json!({"symbol":"AAPL","date":"2024-01-15"})))
            .respond_with(ResponseTemplate::new(200).set_body_string(stream))
            .expect(1)
            .mount(&server)
            .await;

        let key = RequestKey::parse("aapl", Some("2024-01-15")).unwrap();
        let source = transport(&server).open(&key).await.unwrap();
        assert_eq!(collect(source).await, stream.as_bytes());
    }

    #[tokio::test]
    async fn latest_date_sent_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"symbol":"MSFT","date":null})))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .expect(1)
            .mount(&server)
            .await;

        let key = RequestKey::new("MSFT", None).unwrap();
        let source = transport(&server).open(&key).await.unwrap();
        assert!(collect(source).await.is_empty());
    }

    #[tokio::test]
    async fn error_status_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"status":"error","message":"Symbol is required."}"#),
            )
            .mount(&server)
            .await;

        let key = RequestKey::new("AAPL", None).unwrap();
        let err = transport(&server).open(&key).await.err().unwrap();
        assert_eq!(
            err,
            TransportError::Status {
                status: 400,
                message: "Symbol is required.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_connect_error() {
        let transport = ReqwestTransport::new(
            build_client(Some(Duration::from_secs(1))).unwrap(),
            "http://127.0.0.1:9/make_prediction",
        );
        let key = RequestKey::new("AAPL", None).unwrap();
        let err = transport.open(&key).await.err().unwrap();
        assert!(matches!(err, TransportError::Connect(_)));
    }
}
