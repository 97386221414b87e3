// src/provider/mod.rs
//! Profile data sources: the live Proxycurl client and a deterministic offline stand-in.

use async_trait::async_trait;

pub mod offline;
pub mod proxycurl;
pub mod rate_limiter;
pub mod types;

pub use offline::OfflineProvider;
pub use proxycurl::ProxycurlClient;
pub use rate_limiter::RateLimiter;
pub use types::{CompanyRecord, Headquarters, RawDate, RawEducation, RawExperience, RawRecord};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Profile not found: {0}")]
    NotFound(String),
    #[error("Provider rejected the API key")]
    Unauthorized,
    #[error("Empty response from API")]
    EmptyPayload,
    #[error("API call failed with status code {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Failed to parse provider response: {0}")]
    Parse(String),
}

/// Source of raw profile records. A missing profile is reported as an error
/// value, never as a panic; the request timeout belongs to the implementation.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn fetch(&self, linkedin_url: &str) -> Result<RawRecord, ProviderError>;

    /// Company page lookup. Sources without company data report it as not found.
    async fn fetch_company(&self, company_url: &str) -> Result<CompanyRecord, ProviderError> {
        Err(ProviderError::NotFound(company_url.to_string()))
    }

    fn name(&self) -> &'static str;
}
