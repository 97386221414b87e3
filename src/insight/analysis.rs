// src/insight/analysis.rs
use super::requester::{or_default, InsightRequester};
use crate::models::Profile;
use serde::Serialize;
use tracing::info;

pub const ANALYSIS_SYSTEM_INSTRUCTION: &str =
    "You are an expert venture capital analyst specializing in early-stage startup evaluation.";

const ANALYSIS_MAX_TOKENS: u32 = 150;

/// Assessment of a founder's new venture, used to tailor outreach
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FounderAnalysis {
    pub founder_name: String,
    pub company_name: String,
    pub analysis: String,
    pub previous_experience: String,
    pub education: Vec<String>,
    pub skills: Vec<String>,
}

pub fn build_analysis_prompt(profile: &Profile) -> String {
    let education = profile
        .education
        .iter()
        .map(|edu| format!("{} from {}", edu.degree, edu.school))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Company Name: {company}\n\
         Founder Background:\n\
         Previous Role: {prev_title} at {prev_company}\n\
         Education: {education}\n\
         Skills: {skills}\n\n\
         Based on the founder's background, analyze the potential of this new company. What industry is it likely in?\n\
         What problem might they be solving? What makes this venture promising for pre-seed investment?\n\
         Provide a concise analysis in 2-3 sentences.\n",
        company = profile.current_company,
        prev_title = profile.previous_title,
        prev_company = profile.previous_company,
        education = education,
        skills = profile.skills.join(", "),
    )
}

/// Templated analysis picked from the company name, so it is stable per company
pub fn fallback_analysis(profile: &Profile) -> String {
    let company = profile.current_company.as_str();
    let previous_company = or_default(&profile.previous_company, "an established company");

    let templates = [
        format!(
            "{company} shows significant potential in the tech sector, leveraging the founder's experience at {previous_company} to solve real industry pain points with a scalable business model."
        ),
        format!(
            "Given the founder's background at {previous_company}, {company} is positioned to disrupt its target market with innovative technology and a strong understanding of customer needs."
        ),
        format!(
            "{company} demonstrates promising early traction, with the founder's {previous_company} experience providing valuable industry insights and potential customer connections."
        ),
        format!(
            "As a pre-seed investment opportunity, {company} benefits from experienced leadership with {previous_company} domain expertise and a clear vision for product-market fit."
        ),
    ];

    let index = company.chars().map(|c| c as usize).sum::<usize>() % templates.len();
    templates[index].clone()
}

impl InsightRequester {
    pub async fn analyze_founder_potential(&self, profile: &Profile) -> FounderAnalysis {
        let analysis = match self
            .generate(
                build_analysis_prompt(profile),
                ANALYSIS_SYSTEM_INSTRUCTION,
                ANALYSIS_MAX_TOKENS,
            )
            .await
        {
            Some(text) => {
                info!("Generated founder analysis for {}", profile.linkedin_url);
                text
            }
            None => fallback_analysis(profile),
        };

        let previous_experience = if profile.previous_title.is_empty() {
            String::new()
        } else {
            format!("{} at {}", profile.previous_title, profile.previous_company)
        };

        FounderAnalysis {
            founder_name: profile.full_name(),
            company_name: profile.current_company.clone(),
            analysis,
            previous_experience,
            education: profile
                .education
                .iter()
                .map(|edu| edu.summary())
                .filter(|s| !s.is_empty())
                .collect(),
            skills: profile.skills.clone(),
        }
    }
}
