// src/discovery/serpapi.rs
use super::{parse_company_from_job_title, SearchHit, SearchProvider};
use crate::core::config_manager::DiscoveryConfig;
use crate::provider::ProviderError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://serpapi.com/search";

const LOCATION_HINTS: &[&str] = &[
    "san ",
    "new york",
    "bay area",
    "united states",
    "california",
    "london",
    "area",
    "denver",
    "berkeley",
    "austin",
    "united kingdom",
];

const ROLE_HINTS: &[&str] = &["founder", "ceo", "co-founder", "stealth", "startup"];

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    rich_snippet: Option<RichSnippet>,
}

#[derive(Debug, Default, Deserialize)]
struct RichSnippet {
    #[serde(default)]
    top: Option<RichSnippetTop>,
}

#[derive(Debug, Default, Deserialize)]
struct RichSnippetTop {
    #[serde(default)]
    extensions: Vec<String>,
}

/// Google results restricted to profile pages, through SerpApi
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .context("SERPAPI_API_KEY is not set")?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
        })
    }

    fn parse_results(body: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let response: SearchResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        if let Some(message) = response.error {
            return Err(ProviderError::Api {
                status: 200,
                body: message,
            });
        }

        Ok(response.organic_results.into_iter().map(Self::to_hit).collect())
    }

    /// Titles read "Name - Role - Company"; rich snippet extensions refine role, company and location
    fn to_hit(result: OrganicResult) -> SearchHit {
        let (name, mut job_title) = match result.title.split_once(" - ") {
            Some((name, rest)) => (name.to_string(), rest.to_string()),
            None => (result.title.clone(), String::new()),
        };

        let mut company = String::new();
        let mut location = String::new();

        let extensions = result
            .rich_snippet
            .and_then(|rich| rich.top)
            .map(|top| top.extensions)
            .unwrap_or_default();
        for ext in extensions {
            let lower = ext.to_lowercase();
            if LOCATION_HINTS.iter().any(|hint| lower.contains(hint)) {
                location = ext;
            } else if ROLE_HINTS.iter().any(|hint| lower.contains(hint)) {
                job_title = ext;
            } else {
                company = ext;
            }
        }

        if company.is_empty() {
            company = parse_company_from_job_title(&job_title);
        }

        SearchHit {
            name,
            job_title,
            company,
            location,
            description: result.snippet,
            link: result.link,
        }
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(
        &self,
        keywords: &str,
        location: Option<&str>,
        page: u32,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        info!("Searching profiles for '{}' (page {})", keywords, page);

        let query = format!("site:linkedin.com/in/ {}", keywords);
        let page = page.to_string();
        let mut params = vec![
            ("engine", "google"),
            ("q", query.as_str()),
            ("page", page.as_str()),
            ("api_key", self.api_key.as_str()),
        ];
        if let Some(location) = location {
            params.push(("location", location));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            error!("SerpApi error {} for '{}'", status, keywords);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_results(&body)
    }

    fn name(&self) -> &'static str {
        "serpapi"
    }
}
