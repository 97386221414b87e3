// src/provider/proxycurl.rs
use super::{CompanyRecord, DataProvider, ProviderError, RateLimiter, RawRecord};
use crate::core::config_manager::ProviderConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://nubela.co/proxycurl/api/v2";
pub const CREDIT_BALANCE_URL: &str = "https://nubela.co/proxycurl/api/credit-balance";

pub struct ProxycurlClient {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: RateLimiter,
}

impl ProxycurlClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .context("PROXYCURL_API_KEY is not set")?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::per_minute(config.calls_per_minute),
        })
    }

    fn map_status(status: StatusCode, linkedin_url: &str, body: String) -> ProviderError {
        match status {
            StatusCode::NOT_FOUND => ProviderError::NotFound(linkedin_url.to_string()),
            StatusCode::UNAUTHORIZED => ProviderError::Unauthorized,
            _ => ProviderError::Api {
                status: status.as_u16(),
                body,
            },
        }
    }

    fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        let is_empty = match &value {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return Err(ProviderError::EmptyPayload);
        }

        serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))
    }

    /// Rate-limited GET returning the body of a successful response
    async fn get_body(
        &self,
        url: &str,
        query: &[(&str, &str)],
        subject: &str,
    ) -> Result<String, ProviderError> {
        self.limiter.wait().await;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("Proxycurl error {} for {}", status, subject);
            return Err(Self::map_status(status, subject, body));
        }
        Ok(body)
    }

    /// Remaining API credits on the configured key
    pub async fn credit_balance(&self) -> Result<i64, ProviderError> {
        let body = self
            .get_body(CREDIT_BALANCE_URL, &[], "credit balance")
            .await?;
        Self::parse_credit_balance(&body)
    }

    fn parse_credit_balance(body: &str) -> Result<i64, ProviderError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
        value
            .get("credit_balance")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| ProviderError::Parse("missing credit_balance".to_string()))
    }
}

#[async_trait]
impl DataProvider for ProxycurlClient {
    async fn fetch(&self, linkedin_url: &str) -> Result<RawRecord, ProviderError> {
        info!("Fetching profile from Proxycurl: {}", linkedin_url);

        let body = self
            .get_body(
                &format!("{}/linkedin", self.base_url),
                &[
                    ("url", linkedin_url),
                    ("use_cache", "if-present"),
                    ("fallback_to_cache", "never"),
                ],
                linkedin_url,
            )
            .await?;

        Self::parse_body(&body)
    }

    async fn fetch_company(&self, company_url: &str) -> Result<CompanyRecord, ProviderError> {
        info!("Fetching company from Proxycurl: {}", company_url);

        let body = self
            .get_body(
                &format!("{}/company", self.base_url),
                &[("url", company_url), ("use_cache", "if-present")],
                company_url,
            )
            .await?;

        Self::parse_body(&body)
    }

    fn name(&self) -> &'static str {
        "proxycurl"
    }
}
