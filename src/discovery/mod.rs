// src/discovery/mod.rs
//! Finding new profiles worth tracking through web search.

use crate::models::Profile;
use crate::provider::ProviderError;
use crate::tracking::ChangeDetector;
use crate::validator::is_valid_profile_url;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub mod offline;
pub mod serpapi;

pub use offline::OfflineSearch;
pub use serpapi::SerpApiClient;

const FOUNDER_TERMS: &[&str] = &["founder", "co-founder", "entrepreneur", "startup"];

/// One search result that looks like a profile page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        keywords: &str,
        location: Option<&str>,
        page: u32,
    ) -> Result<Vec<SearchHit>, ProviderError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// Hits before filtering
    pub total_results: usize,
    pub profiles: Vec<SearchHit>,
}

/// "Founder at Acme" and "Founder @ Acme" give "Acme"
pub fn parse_company_from_job_title(job_title: &str) -> String {
    [" at ", " @ "]
        .iter()
        .find_map(|sep| job_title.split(sep).nth(1))
        .map(|company| company.trim().to_string())
        .unwrap_or_default()
}

pub struct ProfileFinder {
    search: Arc<dyn SearchProvider>,
    detector: ChangeDetector,
}

impl ProfileFinder {
    pub fn new(search: Arc<dyn SearchProvider>, detector: ChangeDetector) -> Self {
        Self { search, detector }
    }

    /// Searches `keywords` (comma separated), adding a founder term when none is present,
    /// and keeps the hits whose title reads like a founder
    pub async fn search_founder_profiles(
        &self,
        keywords: &str,
        location: Option<&str>,
        page: u32,
    ) -> Result<SearchReport, ProviderError> {
        let has_founder_term = keywords
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .any(|k| FOUNDER_TERMS.contains(&k.as_str()));

        let terms = if has_founder_term {
            keywords.to_string()
        } else {
            format!("{}, founder", keywords)
        };

        let hits = self.search.search(&terms, location, page).await?;
        let total_results = hits.len();
        let profiles = self.filter_founder_profiles(hits);

        info!(
            "Search '{}' via {}: {} of {} hits look like founders",
            terms,
            self.search.name(),
            profiles.len(),
            total_results
        );

        Ok(SearchReport {
            total_results,
            profiles,
        })
    }

    pub fn filter_founder_profiles(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        hits.into_iter()
            .filter(|hit| self.detector.is_founder_title(&hit.job_title))
            .map(|mut hit| {
                if hit.company.is_empty() {
                    hit.company = parse_company_from_job_title(&hit.job_title);
                }
                hit
            })
            .collect()
    }

    /// Founders whose title or summary mentions `company`
    pub async fn search_by_company(
        &self,
        company: &str,
        location: Option<&str>,
    ) -> Result<SearchReport, ProviderError> {
        let hits = self
            .search
            .search(&format!("{}, founder", company), location, 1)
            .await?;
        let total_results = hits.len();

        let needle = company.to_lowercase();
        let profiles = hits
            .into_iter()
            .filter(|hit| {
                hit.job_title.to_lowercase().contains(&needle)
                    || hit.description.to_lowercase().contains(&needle)
            })
            .collect();

        Ok(SearchReport {
            total_results,
            profiles,
        })
    }

    pub fn search_suggestions(industry: Option<&str>) -> Vec<String> {
        let mut suggestions: Vec<String> = [
            "founder, pre-seed",
            "entrepreneur, startup",
            "co-founder, new venture",
            "CEO, stealth startup",
            "founder, seed round",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(industry) = industry.map(str::trim).filter(|i| !i.is_empty()) {
            suggestions.push(format!("founder, {}", industry));
            suggestions.push(format!("startup, {}", industry));
            suggestions.push(format!("{} entrepreneur", industry));
            suggestions.push(format!("building, {}", industry));
        }
        suggestions
    }

    /// Turns hits into profiles ready to track; hits without a profile URL are reported back
    pub fn validate_and_format(hits: &[SearchHit]) -> (Vec<Profile>, Vec<String>) {
        let mut profiles = Vec::new();
        let mut errors = Vec::new();

        for hit in hits {
            if !is_valid_profile_url(&hit.link) {
                errors.push(format!("Invalid LinkedIn URL format: {}", hit.link));
                continue;
            }

            let mut profile = Profile::new(hit.link.trim());
            profile.current_title = hit.job_title.clone();
            profile.current_company = hit.company.clone();

            let mut parts = hit.name.trim().splitn(2, ' ');
            profile.first_name = parts.next().unwrap_or_default().to_string();
            profile.last_name = parts.next().unwrap_or_default().trim().to_string();

            profiles.push(profile);
        }

        (profiles, errors)
    }
}
