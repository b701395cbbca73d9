//! Prediction list fetcher over reqwest.

use async_trait::async_trait;
use reqwest::Client;

use super::status_message;
use crate::application::ports::{FetchError, PredictionFetcher};
use crate::domain::prediction::Prediction;

/// Loads stored predictions with `GET {list_url}`.
#[derive(Debug, Clone)]
pub struct HttpPredictionFetcher {
    client: Client,
    list_url: String,
}

impl HttpPredictionFetcher {
    /// Create a fetcher for `list_url`.
    #[must_use]
    pub fn new(client: Client, list_url: impl Into<String>) -> Self {
        Self {
            client,
            list_url: list_url.into(),
        }
    }
}

#[async_trait]
impl PredictionFetcher for HttpPredictionFetcher {
    async fn fetch(&self) -> Result<Vec<Prediction>, FetchError> {
        let response = self
            .client
            .get(&self.list_url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                message = %status_message(status, &text),
                "Prediction list request failed"
            );
            return Err(FetchError::Status(status.as_u16()));
        }

        serde_json::from_str(&text).map_err(|e| FetchError::InvalidBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::build_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LIST: &str = r#"[
        {"id":2,"symbol":"MSFT","name":"Microsoft","date_time":"2024-01-16T23:59:59",
         "positive_count":4,"negative_count":4,"neutral_count":2,
         "positive_probability":0.4,"negative_probability":0.4,"neutral_probability":0.2,
         "stock_value":"390.27","future_prices":{}},
        {"id":1,"symbol":"AAPL","name":"Apple Inc","date_time":"2024-01-15T23:59:59",
         "positive_count":7,"negative_count":2,"neutral_count":1,
         "positive_probability":0.7,"negative_probability":0.2,"neutral_probability":0.1,
         "stock_value":"185.92","future_prices":{"1_day":"186.10"}}
    ]"#;

    async fn fetcher_with(response: ResponseTemplate) -> (MockServer, HttpPredictionFetcher) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/predictions"))
            .respond_with(response)
            .mount(&server)
            .await;
        let fetcher = HttpPredictionFetcher::new(
            build_client(None).unwrap(),
            format!("{}/predictions", server.uri()),
        );
        (server, fetcher)
    }

    #[tokio::test]
    async fn fetch_keeps_server_order() {
        let (_server, fetcher) = fetcher_with(ResponseTemplate::new(200).set_body_string(LIST)).await;
        let predictions = fetcher.fetch().await.unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].symbol, "MSFT");
        assert_eq!(predictions[1].id, 1);
        assert!(predictions[1].future_prices.one_day.is_some());
    }

    #[tokio::test]
    async fn non_success_status() {
        let (_server, fetcher) = fetcher_with(ResponseTemplate::new(503)).await;
        assert_eq!(fetcher.fetch().await.unwrap_err(), FetchError::Status(503));
    }

    #[tokio::test]
    async fn malformed_body() {
        let (_server, fetcher) =
            fetcher_with(ResponseTemplate::new(200).set_body_string("{\"not\":\"a list\"}")).await;
        assert!(matches!(
            fetcher.fetch().await.unwrap_err(),
            FetchError::InvalidBody(_)
        ));
    }
}
