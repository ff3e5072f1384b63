//! Blocking HTTP client for the exchange-rate API.

use core::time::Duration;
use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;

use super::RateTable;
use crate::error::{LedgerError, Result};

/// Base URL of the public exchange-rate API.
pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com";

/// Latest-rates endpoint path; the base currency code is appended.
const LATEST_PATH: &str = "/v4/latest/";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of a latest-rates response.
#[derive(Debug, Deserialize)]
struct LatestResponse {
    /// Base currency echoed by the server.
    #[serde(default)]
    base: Option<String>,
    /// Units of each currency per one unit of the base.
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

/// Builder for constructing a [`RateClient`].
#[derive(Debug, Default)]
pub struct RateClientBuilder {
    /// Base URL override (for testing).
    base_url: Option<String>,
    /// Request timeout override.
    timeout: Option<Duration>,
}

impl RateClientBuilder {
    /// Overrides the base URL (useful for testing with a mock server).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the request timeout (10 seconds by default).
    #[inline]
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Http`] if the HTTP client fails to build.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<RateClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_RATES_URL.to_owned());
        tracing::debug!(base_url = %base_url, "building rate client");
        let http = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;
        Ok(RateClient { http, base_url })
    }
}

/// Blocking client fetching the latest exchange rates.
///
/// Use [`RateClient::builder()`] to construct an instance.
#[derive(Debug)]
pub struct RateClient {
    /// Underlying HTTP client.
    http: reqwest::blocking::Client,
    /// API base URL.
    base_url: String,
}

impl RateClient {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub fn builder() -> RateClientBuilder {
        RateClientBuilder::default()
    }

    /// Fetches the latest rates quoted against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Http`] if the request fails or the body is not
    /// valid JSON, and [`LedgerError::Api`] if the server answers with a
    /// non-success status, without any rates, or quoted against another
    /// base currency.
    #[inline]
    #[tracing::instrument(skip_all, fields(base = %base))]
    pub fn latest(&self, base: &str) -> Result<RateTable> {
        let requested = base.to_uppercase();
        let url = format!("{}{LATEST_PATH}{requested}", self.base_url);
        tracing::trace!(url = %url, "sending GET request");
        let response = self.http.get(&url).send()?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "unknown error".to_owned());
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: LatestResponse = response.json()?;
        if body.rates.is_empty() {
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message: "response contains no rates".to_owned(),
            });
        }
        if let Some(quoted) = body.base.filter(|quoted| quoted.to_uppercase() != requested) {
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message: format!("rates quoted against {quoted}, expected {requested}"),
            });
        }
        tracing::debug!(rates = body.rates.len(), "fetched exchange rates");
        Ok(RateTable::new(requested, body.rates, Some(Utc::now())))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Runs a blocking fetch off the async test runtime.
    async fn fetch(server_uri: String, base: &'static str) -> Result<RateTable> {
        tokio::task::spawn_blocking(move || {
            RateClient::builder()
                .base_url(server_uri)
                .build()?
                .latest(base)
        })
        .await
        .unwrap()
    }

    #[test]
    fn builder_defaults_to_public_api() {
        let client = RateClient::builder().build().unwrap();
        assert_eq!(client.base_url, DEFAULT_RATES_URL);
    }

    #[test]
    fn builder_custom_base_url() {
        let client = RateClient::builder()
            .base_url("http://localhost:8080")
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn latest_parses_rates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "base": "USD",
                "date": "2025-03-01",
                "rates": { "USD": 1.0, "EUR": 0.92, "EGP": 50.6 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let table = fetch(server.uri(), "usd").await.unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rates.len(), 3);
        assert!(!table.is_fallback());
        assert!((table.rate("USD", "EGP") - 50.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn error_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/XYZ"))
            .respond_with(ResponseTemplate::new(404).set_body_string("unknown base"))
            .mount(&server)
            .await;

        let err = fetch(server.uri(), "XYZ").await.unwrap_err();
        match err {
            LedgerError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "unknown base");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_rates_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "base": "USD" })),
            )
            .mount(&server)
            .await;

        let err = fetch(server.uri(), "USD").await.unwrap_err();
        assert!(matches!(err, LedgerError::Api { .. }));
    }

    #[tokio::test]
    async fn mismatched_base_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/EGP"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "base": "USD",
                "rates": { "USD": 1.0, "EGP": 50.6 }
            })))
            .mount(&server)
            .await;

        match fetch(server.uri(), "egp").await.unwrap_err() {
            LedgerError::Api { status, message } => {
                assert_eq!(status, 200);
                assert!(message.contains("USD"));
                assert!(message.contains("EGP"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_base_uses_requested_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rates": { "EUR": 1.0, "USD": 1.08 }
            })))
            .mount(&server)
            .await;

        let table = fetch(server.uri(), "eur").await.unwrap();
        assert_eq!(table.base, "EUR");
    }

    #[tokio::test]
    async fn malformed_body_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = fetch(server.uri(), "USD").await.unwrap_err();
        assert!(matches!(err, LedgerError::Http(_)));
    }
}
