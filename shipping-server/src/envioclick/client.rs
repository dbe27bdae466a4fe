//! EnvioClick HTTP client.
//!
//! Handles authentication, timeouts and envelope unwrapping. Every call is a
//! single request; retry policy lives with the callers that know when a
//! retry is meaningful.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::CarrierApi;
use super::error::EnvioclickError;
use super::types::{
    Envelope, QuotationData, QuotationRequest, RateDto, ShipmentData, ShipmentRequestDto,
    TrackData, TrackRequest,
};

/// Default base URL for the EnvioClick Pro API.
const DEFAULT_BASE_URL: &str = "https://api.envioclickpro.com";

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const QUOTATION_PATH: &str = "/api/v1/quotation";
const SHIPMENT_PATH: &str = "/api/v2/shipment/request";
const TRACK_PATH: &str = "/api/v2/track";

/// Configuration for the EnvioClick client.
#[derive(Debug, Clone)]
pub struct EnvioclickConfig {
    /// API key sent in the `Authorization` header
    pub api_key: String,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl EnvioclickConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for sandbox or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// EnvioClick API client.
#[derive(Debug, Clone)]
pub struct EnvioclickClient {
    http: reqwest::Client,
    base_url: String,
}

impl EnvioclickClient {
    /// Create a new client with the given configuration.
    pub fn new(config: EnvioclickConfig) -> Result<Self, EnvioclickError> {
        let mut headers = HeaderMap::new();

        let mut api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| EnvioclickError::InvalidApiKey)?;
        api_key.set_sensitive(true);
        headers.insert(AUTHORIZATION, api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST a JSON body and unwrap the response envelope.
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, EnvioclickError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "EnvioClick request");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let text = response.text().await.unwrap_or_default();
            return Err(EnvioclickError::from_status(status, retry_after.as_deref(), text));
        }

        let text = response.text().await?;
        decode_envelope(&text)
    }
}

/// Decode an envelope body, turning non-OK statuses into errors.
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, EnvioclickError> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| EnvioclickError::Decode {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })?;

    if !envelope.is_ok() {
        return Err(EnvioclickError::Rejected {
            message: envelope.message(),
        });
    }

    envelope.data.ok_or(EnvioclickError::MissingData)
}

impl CarrierApi for EnvioclickClient {
    async fn quotation(&self, request: &QuotationRequest) -> Result<Vec<RateDto>, EnvioclickError> {
        let data: QuotationData = self.post(QUOTATION_PATH, request).await?;
        Ok(data.rates)
    }

    async fn create_shipment(
        &self,
        request: &ShipmentRequestDto,
    ) -> Result<ShipmentData, EnvioclickError> {
        self.post(SHIPMENT_PATH, request).await
    }

    async fn track(&self, tracking_code: &str) -> Result<TrackData, EnvioclickError> {
        self.post(TRACK_PATH, &TrackRequest { tracking_code }).await
    }
}
