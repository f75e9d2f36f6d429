//! Polygon previous-day aggregate client.

use crate::{LookupError, Result, LOOKUP_TIMEOUT};
use serde::Deserialize;

const POLYGON_BASE_URL: &str = "https://api.polygon.io";

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    results: Vec<Aggregate>,
}

#[derive(Debug, Deserialize)]
struct Aggregate {
    #[serde(rename = "c")]
    close: f64,
}

/// Client for the Polygon previous-close aggregate endpoint.
pub struct StocksClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl StocksClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: POLYGON_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the previous trading day's adjusted close for a ticker.
    ///
    /// The ticker is passed through with the caller's casing. An unknown
    /// ticker yields an empty results list upstream, reported here as
    /// [`LookupError::Malformed`].
    pub async fn previous_close(&self, ticker: &str) -> Result<f64> {
        let url = format!("{}/v2/aggs/ticker/{ticker}/prev", self.base_url);
        tracing::debug!(%ticker, "fetching previous close");

        let response = self
            .http
            .get(&url)
            .query(&[("adjusted", "true"), ("apiKey", self.api_key.as_str())])
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status { status, body });
        }

        let data: AggregateResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        let aggregate = data
            .results
            .first()
            .ok_or_else(|| LookupError::Malformed(format!("no previous-close data for {ticker}")))?;

        Ok(aggregate.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn extracts_close_from_first_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/aggs/ticker/AAPL/prev"))
            .and(query_param("adjusted", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ticker": "AAPL",
                "status": "OK",
                "resultsCount": 1,
                "results": [{"T": "AAPL", "o": 170.1, "h": 173.0, "l": 169.8, "c": 172.35, "v": 55_000_000}]
            })))
            .mount(&server)
            .await;

        let client = StocksClient::new("test-key").with_base_url(server.uri());
        let close = client.previous_close("AAPL").await.unwrap();

        assert_eq!(close, 172.35);
    }

    #[tokio::test]
    async fn empty_results_is_a_lookup_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/aggs/ticker/NOPE/prev"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ticker": "NOPE",
                "status": "OK",
                "resultsCount": 0,
                "results": []
            })))
            .mount(&server)
            .await;

        let client = StocksClient::new("test-key").with_base_url(server.uri());
        let err = client.previous_close("NOPE").await.unwrap_err();

        assert!(matches!(err, LookupError::Malformed(_)));
    }

    #[tokio::test]
    async fn absent_results_field_is_a_lookup_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/aggs/ticker/XYZ/prev"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ticker": "XYZ", "status": "OK", "resultsCount": 0})),
            )
            .mount(&server)
            .await;

        let client = StocksClient::new("test-key").with_base_url(server.uri());
        let err = client.previous_close("XYZ").await.unwrap_err();

        assert!(matches!(err, LookupError::Malformed(_)));
    }

    #[tokio::test]
    async fn ticker_casing_is_preserved_in_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/aggs/ticker/tsla/prev"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"c": 244.12}]
            })))
            .mount(&server)
            .await;

        let client = StocksClient::new("test-key").with_base_url(server.uri());
        let close = client.previous_close("tsla").await.unwrap();

        assert_eq!(close, 244.12);
    }
}
