// src/insight/requester.rs
use super::types::GenerationRequest;
use super::TextGenerator;
use crate::core::config_manager::GeneratorConfig;
use crate::models::{Change, Profile};
use std::sync::Arc;
use tracing::{info, warn};

pub const SYSTEM_INSTRUCTION: &str = "You are an expert venture capital analyst who identifies \
promising pre-seed founders to contact. Create a concise, single-sentence explanation of why a \
founder is worth contacting based on their profile and recent career change.";

/// Produces the outreach rationale for a change. Never fails: without a
/// generator, or when it errors, a templated sentence is chosen from the
/// person's name so the same name always gets the same text.
pub struct InsightRequester {
    generator: Option<Arc<dyn TextGenerator>>,
    max_tokens: u32,
    temperature: f32,
}

impl InsightRequester {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, config: &GeneratorConfig) -> Self {
        Self {
            generator,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Requester that always answers with the templated fallback
    pub fn offline() -> Self {
        Self::new(None, &GeneratorConfig::default())
    }

    pub async fn request_insight(&self, change: &Change, profile: &Profile) -> String {
        match self
            .generate(build_prompt(change, profile), SYSTEM_INSTRUCTION, self.max_tokens)
            .await
        {
            Some(text) => {
                info!("Generated insight for {}", profile.linkedin_url);
                text
            }
            None => fallback_insight(profile),
        }
    }

    /// `None` when there is no generator or it failed; callers fall back
    pub(crate) async fn generate(
        &self,
        prompt: String,
        system_instruction: &str,
        max_tokens: u32,
    ) -> Option<String> {
        let generator = self.generator.as_ref()?;

        let request = GenerationRequest {
            prompt,
            system_instruction: system_instruction.to_string(),
            max_tokens,
            temperature: self.temperature,
        };

        match generator.generate(&request).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Text generation failed, using fallback: {}", e);
                None
            }
        }
    }
}

pub fn build_prompt(change: &Change, profile: &Profile) -> String {
    let education = profile
        .education
        .iter()
        .map(|edu| edu.summary())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let skills = profile.skills.join(", ");

    format!(
        "Name: {name}\n\
         Current Role: {title} at {company}\n\
         Previous Role: {prev_title} at {prev_company}\n\
         Education: {education}\n\
         Skills: {skills}\n\n\
         The person has recently changed from {old_title} at {old_company} to {new_title} at {new_company}.\n\
         Based on their background and new role, what makes them a good outreach target for pre-seed investment?\n\
         Provide one concise, actionable sentence that highlights why this founder would be valuable to connect with.\n",
        name = profile.full_name(),
        title = profile.current_title,
        company = profile.current_company,
        prev_title = profile.previous_title,
        prev_company = profile.previous_company,
        education = education,
        skills = skills,
        old_title = change.old_title,
        old_company = change.old_company,
        new_title = change.new_title,
        new_company = change.new_company,
    )
}

pub(super) fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

/// Sum of the name's code points; stable across runs and platforms
fn name_hash(profile: &Profile) -> usize {
    format!("{}{}", profile.first_name, profile.last_name)
        .chars()
        .map(|c| c as usize)
        .sum()
}

pub fn fallback_insight(profile: &Profile) -> String {
    let first_name = or_default(&profile.first_name, "the founder");
    let current_company = or_default(&profile.current_company, "their startup");
    let previous_company = or_default(&profile.previous_company, "a tech company");
    let previous_title = or_default(&profile.previous_title, "an industry role");

    let templates = [
        format!(
            "{first_name}'s background as {previous_title} at {previous_company} provides valuable industry expertise for {current_company}, making them a promising founder to connect with for early-stage investment."
        ),
        format!(
            "With experience at {previous_company} and a transition to building {current_company}, {first_name} brings domain knowledge and entrepreneurial drive that could lead to strong investment returns."
        ),
        format!(
            "{first_name}'s founder journey at {current_company} leverages their {previous_company} experience, suggesting market-informed innovation worth exploring for pre-seed investment."
        ),
        format!(
            "Having made the leap from {previous_company} to founding {current_company}, {first_name} demonstrates both industry expertise and entrepreneurial ambition needed for startup success."
        ),
    ];

    let index = name_hash(profile) % templates.len();
    templates[index].clone()
}
