// src/insight/outreach.rs
use crate::models::Profile;

/// Talking points for a first message to a founder
pub fn outreach_suggestions(profile: &Profile, analysis: Option<&str>) -> Vec<String> {
    let mut suggestions = Vec::new();

    if !profile.previous_title.is_empty() && !profile.previous_company.is_empty() {
        suggestions.push(format!(
            "Mention their previous experience as {} at {}",
            profile.previous_title, profile.previous_company
        ));
    }

    if let Some(school) = profile
        .education
        .first()
        .map(|edu| edu.school.as_str())
        .filter(|s| !s.is_empty())
    {
        suggestions.push(format!("Reference their education at {}", school));
    }

    if let Some(text) = analysis {
        let lower = text.to_lowercase();
        if lower.contains("fintech") {
            suggestions.push("Mention your expertise in fintech investments".to_string());
        } else if lower.contains("health") {
            suggestions.push("Highlight your portfolio companies in the health sector".to_string());
        } else if text.contains("AI") || lower.contains("artificial intelligence") {
            suggestions.push("Discuss your interest in AI/ML startups".to_string());
        }
    }

    let first_name = if profile.first_name.is_empty() {
        "them"
    } else {
        profile.first_name.as_str()
    };
    suggestions.push(format!(
        "Congratulate {} on their new role as {} at {}",
        first_name, profile.current_title, profile.current_company
    ));

    suggestions
}
