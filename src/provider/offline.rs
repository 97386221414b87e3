// src/provider/offline.rs
use super::{
    CompanyRecord, DataProvider, Headquarters, ProviderError, RawDate, RawEducation, RawExperience,
    RawRecord,
};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::info;

/// Deterministic stand-in used when no provider credential is configured.
/// The first fetch of a URL returns a product manager at BigTech; every later
/// fetch returns the same person as founder of Test Startup.
#[derive(Default)]
pub struct OfflineProvider {
    seen: Mutex<HashSet<String>>,
}

impl OfflineProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that treats `urls` as already fetched once
    pub fn with_known<I: IntoIterator<Item = String>>(urls: I) -> Self {
        Self {
            seen: Mutex::new(urls.into_iter().collect()),
        }
    }

    fn pm_experience() -> RawExperience {
        RawExperience {
            title: Some("Product Manager".to_string()),
            company: Some("BigTech".to_string()),
            company_linkedin_profile_url: Some("https://linkedin.com/company/bigtech".to_string()),
            description: Some("Worked on product strategy.".to_string()),
            location: Some("Mountain View, CA".to_string()),
            starts_at: Some(RawDate::ymd(2020, 3, 15)),
            ends_at: Some(RawDate::ymd(2023, 5, 30)),
        }
    }

    fn founder_experience() -> RawExperience {
        RawExperience {
            title: Some("Founder & CEO".to_string()),
            company: Some("Test Startup".to_string()),
            company_linkedin_profile_url: Some(
                "https://linkedin.com/company/test-startup".to_string(),
            ),
            description: Some("Building something new.".to_string()),
            location: Some("San Francisco, CA".to_string()),
            starts_at: Some(RawDate::ymd(2023, 6, 1)),
            ends_at: None,
        }
    }

    pub fn build_record(linkedin_url: &str, is_founder: bool) -> RawRecord {
        let public_identifier = linkedin_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let (headline, experiences) = if is_founder {
            (
                "Founder & CEO at Test Startup",
                vec![Self::founder_experience(), Self::pm_experience()],
            )
        } else {
            // still employed at BigTech before the switch
            let mut current = Self::pm_experience();
            current.ends_at = None;
            ("Product Manager at BigTech", vec![current])
        };

        RawRecord {
            public_identifier: Some(public_identifier),
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
            full_name: Some("Test User".to_string()),
            headline: Some(headline.to_string()),
            city: Some("San Francisco".to_string()),
            country: Some("United States".to_string()),
            current_title: None,
            current_company: None,
            experiences: Some(experiences),
            education: Some(vec![RawEducation {
                school: Some("Test University".to_string()),
                degree_name: Some("MBA".to_string()),
                field_of_study: Some("Business Administration".to_string()),
                starts_at: Some(RawDate::year(2018)),
                ends_at: Some(RawDate::year(2020)),
            }]),
            skills: Some(vec![
                "Product Management".to_string(),
                "AI/ML".to_string(),
                "Leadership".to_string(),
            ]),
            error: None,
        }
    }

    pub fn build_company() -> CompanyRecord {
        CompanyRecord {
            name: Some("Test Startup".to_string()),
            description: Some("An innovative startup building cutting-edge technology.".to_string()),
            website: Some("https://teststartup.com".to_string()),
            industry: Some("Technology".to_string()),
            company_size: Some("2-10 employees".to_string()),
            founded_year: Some(2023),
            company_type: Some("Privately Held".to_string()),
            headquarters: Some(Headquarters {
                city: Some("San Francisco".to_string()),
                state: Some("California".to_string()),
                country: Some("United States".to_string()),
            }),
        }
    }
}

#[async_trait]
impl DataProvider for OfflineProvider {
    async fn fetch(&self, linkedin_url: &str) -> Result<RawRecord, ProviderError> {
        let first_fetch = self.seen.lock().await.insert(linkedin_url.to_string());
        info!(
            "Serving offline profile for {} (founder: {})",
            linkedin_url, !first_fetch
        );
        Ok(Self::build_record(linkedin_url, !first_fetch))
    }

    async fn fetch_company(&self, company_url: &str) -> Result<CompanyRecord, ProviderError> {
        info!("Serving offline company for {}", company_url);
        Ok(Self::build_company())
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
