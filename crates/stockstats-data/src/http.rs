//! REST client for the stock quote service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use stockstats_core::error::DataSourceError;
use stockstats_core::traits::{validate_ticker, Catalog, PriceSource};
use stockstats_core::types::Quote;
use tracing::debug;

/// Base URL of the evaluation quote service.
pub const DEFAULT_BASE_URL: &str = "http://20.244.56.144/evaluation-service";

/// Connection settings for [`HttpPriceSource`].
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    pub base_url: String,
    /// Bearer token sent on every request, if any
    pub token: Option<String>,
    pub request_timeout: Duration,
}

impl HttpSourceConfig {
    /// Create config for a base URL, without credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Quote service response types
#[derive(Debug, Deserialize)]
struct StocksResponse {
    stocks: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct WireQuote {
    price: f64,
    #[serde(rename = "lastUpdatedAt")]
    last_updated_at: DateTime<Utc>,
}

/// The service returns a history array when `minutes` is given and a
/// single latest quote otherwise; both are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceResponse {
    History(Vec<WireQuote>),
    Latest { stock: WireQuote },
}

/// Price source backed by the quote service's REST API.
pub struct HttpPriceSource {
    config: HttpSourceConfig,
    client: Client,
}

impl HttpPriceSource {
    /// Create a new client.
    pub fn new(config: HttpSourceConfig) -> Result<Self, DataSourceError> {
        Self::with_client_builder(config, Client::builder())
    }

    /// Create a client from a caller-prepared builder, e.g. with custom
    /// proxy or TLS settings. Headers and timeout still come from `config`.
    pub fn with_client_builder(
        config: HttpSourceConfig,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, DataSourceError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = &config.token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| DataSourceError::Authentication(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = builder
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DataSourceError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, DataSourceError> {
        debug!(url, "GET");

        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(status_error(status, &body, url));
        }

        Ok(body)
    }

    fn transport_error(&self, e: reqwest::Error) -> DataSourceError {
        if e.is_timeout() {
            DataSourceError::Timeout {
                elapsed_ms: self.config.request_timeout.as_millis() as u64,
            }
        } else if e.is_decode() {
            DataSourceError::Parse(e.to_string())
        } else {
            DataSourceError::Connection(e.to_string())
        }
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_catalog(&self) -> Result<Catalog, DataSourceError> {
        let url = format!("{}/stocks", self.base_url());
        let body = self.get(&url, &[]).await?;
        parse_catalog(&body)
    }

    async fn fetch_price_series(
        &self,
        ticker: &str,
        minutes: u32,
    ) -> Result<Vec<Quote>, DataSourceError> {
        validate_ticker(ticker)?;

        let url = format!("{}/stocks/{}", self.base_url(), ticker);
        let body = self
            .get(&url, &[("minutes", minutes.to_string())])
            .await
            .map_err(|e| match e {
                DataSourceError::Api { status: 404, .. } => {
                    DataSourceError::UnknownTicker(ticker.to_string())
                }
                other => other,
            })?;

        let quotes = parse_quotes(&body)?;
        debug!(ticker, minutes, quotes = quotes.len(), "fetched price history");
        Ok(quotes)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Parse a `/stocks` catalog body.
pub fn parse_catalog(body: &str) -> Result<Catalog, DataSourceError> {
    let data: StocksResponse =
        serde_json::from_str(body).map_err(|e| DataSourceError::Parse(e.to_string()))?;
    Ok(data.stocks)
}

/// Parse a `/stocks/{ticker}` price body.
pub fn parse_quotes(body: &str) -> Result<Vec<Quote>, DataSourceError> {
    let data: PriceResponse =
        serde_json::from_str(body).map_err(|e| DataSourceError::Parse(e.to_string()))?;

    let wire = match data {
        PriceResponse::History(quotes) => quotes,
        PriceResponse::Latest { stock } => vec![stock],
    };

    Ok(wire
        .into_iter()
        .map(|q| Quote::new(q.price, q.last_updated_at))
        .collect())
}

fn status_error(status: StatusCode, body: &str, url: &str) -> DataSourceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DataSourceError::Authentication(format!("{} from {}", status, url))
        }
        StatusCode::TOO_MANY_REQUESTS => DataSourceError::RateLimited,
        _ => DataSourceError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        },
    }
}
