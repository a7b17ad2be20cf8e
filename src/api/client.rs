//! Signed REST client for the exchange's account endpoints.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, warn};

use crate::error::ApiError;

use super::types::*;
use super::ExchangeApi;

pub const DEFAULT_BASE_URL: &str = "https://ftx.com/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

type HmacSha256 = Hmac<Sha256>;

/// API key material. Opaque to everything except request signing.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub subaccount: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &"***")
            .field("subaccount", &self.subaccount)
            .finish()
    }
}

/// Show only the first four characters of a secret.
pub fn mask(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{}***", prefix)
}

/// Client for the exchange REST API (read-only account history).
pub struct FtxClient {
    client: Client,
    base_url: String,
    sign_prefix: String,
    credentials: Credentials,
}

impl FtxClient {
    /// Create a client against `base_url` (e.g. `https://ftx.com/api`).
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        if credentials.api_key.is_empty() || credentials.api_secret.is_empty() {
            return Err(ApiError::Credentials("API key and secret must be set".to_string()).into());
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).context("Invalid API base URL")?;
        let sign_prefix = parsed.path().trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            sign_prefix,
            credentials,
        })
    }

    /// GET a signed resource, waiting out rate-limit responses.
    async fn get<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ApiError> {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(MAX_RATE_LIMIT_WAIT),
            ..ExponentialBackoff::default()
        };

        backoff::future::retry(policy, || async move {
            self.get_once(path_and_query).await.map_err(|e| {
                if e.is_rate_limited() {
                    warn!(path = %path_and_query, "Rate limited, backing off");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let headers = self.auth_headers("GET", path_and_query)?;

        debug!(url = %url, "GET");

        let response = self.client.get(&url).headers(headers).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(ApiError::Rejected {
                message: envelope.error.unwrap_or_default(),
            });
        }

        envelope.result.ok_or(ApiError::MissingResult)
    }

    /// Build the `FTX-*` authentication headers for one request.
    fn auth_headers(&self, method: &str, path_and_query: &str) -> Result<HeaderMap, ApiError> {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let payload = format!("{}{}{}{}", timestamp, method, self.sign_prefix, path_and_query);
        let signature = sign(&self.credentials.api_secret, &payload)?;

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("ftx-key"), header_value(&self.credentials.api_key)?);
        headers.insert(HeaderName::from_static("ftx-ts"), header_value(&timestamp)?);
        headers.insert(HeaderName::from_static("ftx-sign"), header_value(&signature)?);

        if let Some(subaccount) = &self.credentials.subaccount {
            headers.insert(
                HeaderName::from_static("ftx-subaccount"),
                header_value(&urlencoding::encode(subaccount))?,
            );
        }

        Ok(headers)
    }
}

/// Hex-encoded HMAC-SHA256 of `payload` under `secret`.
fn sign(secret: &str, payload: &str) -> Result<String, ApiError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::Credentials(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|e| ApiError::Credentials(format!("value not usable as header: {}", e)))
}

fn with_end_time(mut path: String, end_time: Option<i64>) -> String {
    if let Some(t) = end_time {
        let sep = if path.contains('?') { '&' } else { '?' };
        path = format!("{}{}end_time={}", path, sep, t);
    }
    path
}

#[async_trait]
impl ExchangeApi for FtxClient {
    async fn order_history(&self, end_time: Option<i64>, limit: u32) -> Result<Page<RawOrder>> {
        let path = with_end_time(format!("/orders/history?limit={}", limit), end_time);
        let result = self.get(&path).await.context("Failed to fetch order history")?;
        Ok(Page::new(result))
    }

    async fn fills(&self, end_time: Option<i64>, limit: u32) -> Result<Page<RawFill>> {
        let path = with_end_time(format!("/fills?limit={}", limit), end_time);
        let result = self.get(&path).await.context("Failed to fetch fills")?;
        Ok(Page::new(result))
    }

    async fn funding_payments(&self, end_time: Option<i64>) -> Result<Page<RawFundingPayment>> {
        let path = with_end_time("/funding_payments".to_string(), end_time);
        let result = self
            .get(&path)
            .await
            .context("Failed to fetch funding payments")?;
        Ok(Page::new(result))
    }

    async fn positions(&self, show_avg_price: bool) -> Result<Page<RawPosition>> {
        let path = format!("/positions?showAvgPrice={}", show_avg_price);
        let result = self.get(&path).await.context("Failed to fetch positions")?;
        Ok(Page::new(result))
    }
}
