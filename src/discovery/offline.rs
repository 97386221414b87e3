// src/discovery/offline.rs
use super::{parse_company_from_job_title, SearchHit, SearchProvider};
use crate::provider::ProviderError;
use async_trait::async_trait;
use tracing::info;

/// Fixed sample hits used when no search key is configured
#[derive(Default)]
pub struct OfflineSearch;

impl OfflineSearch {
    pub fn new() -> Self {
        Self
    }

    fn sample(
        name: &str,
        slug: &str,
        job_title: &str,
        description: &str,
        default_location: &str,
        location: Option<&str>,
    ) -> SearchHit {
        SearchHit {
            name: name.to_string(),
            job_title: job_title.to_string(),
            company: parse_company_from_job_title(job_title),
            location: location.unwrap_or(default_location).to_string(),
            description: description.to_string(),
            link: format!("https://www.linkedin.com/in/{}", slug),
        }
    }
}

#[async_trait]
impl SearchProvider for OfflineSearch {
    async fn search(
        &self,
        keywords: &str,
        location: Option<&str>,
        _page: u32,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        info!("Serving offline search results for '{}'", keywords);
        Ok(vec![
            Self::sample(
                "Test Founder",
                "test-founder",
                "Founder & CEO at Tech Startup",
                "Building innovative solutions | Ex-Google | YC Alumni",
                "San Francisco Bay Area",
                location,
            ),
            Self::sample(
                "Jane Innovator",
                "jane-innovator",
                "Co-founder at Stealth Startup",
                "Working on the future of AI | Previously Director at Microsoft",
                "New York, NY",
                location,
            ),
            Self::sample(
                "Alex Tech",
                "alex-tech",
                "Founder, Building something new",
                "Serial entrepreneur | AI & ML enthusiast | Stanford MBA",
                "Austin, Texas",
                location,
            ),
        ])
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
