// src/tracking/detector.rs
use crate::core::config_manager::{DEFAULT_FOUNDER_KEYWORDS, DEFAULT_STEALTH_KEYWORDS};
use crate::models::{Change, ChangeCategory, Profile};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

/// Case-insensitive substring match against any keyword
pub fn contains_keyword(text: &str, keywords: &[String]) -> bool {
    if text.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| haystack.contains(&k.to_lowercase()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Significance {
    pub score: u32,
    pub is_significant: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChangeDetector {
    founder_keywords: Vec<String>,
    stealth_keywords: Vec<String>,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(
            DEFAULT_FOUNDER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            DEFAULT_STEALTH_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        )
    }
}

impl ChangeDetector {
    pub fn new(founder_keywords: Vec<String>, stealth_keywords: Vec<String>) -> Self {
        Self {
            founder_keywords,
            stealth_keywords,
        }
    }

    /// A reportable change needs a differing, non-empty current title or company.
    /// The first snapshot of a profile never produces one.
    pub fn detect(&self, old: Option<&Profile>, new: &Profile) -> Option<Change> {
        let old = old?;

        let title_changed =
            old.current_title != new.current_title && !new.current_title.is_empty();
        let company_changed =
            old.current_company != new.current_company && !new.current_company.is_empty();

        if !(title_changed || company_changed) {
            return None;
        }

        Some(Change {
            id: 0,
            linkedin_url: new.linkedin_url.clone(),
            detected_at: Utc::now(),
            old_title: old.current_title.clone(),
            new_title: new.current_title.clone(),
            old_company: old.current_company.clone(),
            new_company: new.current_company.clone(),
            is_founder_change: self.is_founder_change(new),
            insight: None,
            notification_sent: false,
        })
    }

    /// Founder keywords are checked against the title; stealth keywords against title or company
    pub fn is_founder_change(&self, profile: &Profile) -> bool {
        self.is_founder_title(&profile.current_title)
            || contains_keyword(&profile.current_company, &self.stealth_keywords)
    }

    pub fn is_founder_title(&self, title: &str) -> bool {
        contains_keyword(title, &self.founder_keywords)
            || contains_keyword(title, &self.stealth_keywords)
    }

    /// Advisory score; it never gates recording or insight generation
    pub fn significance(&self, change: &Change) -> Significance {
        let mut score = 0u32;
        let mut reasons = Vec::new();

        if change.is_founder_change {
            score += 80;
            reasons.push("Change to founder role detected".to_string());
        }

        match (change.is_title_change(), change.is_company_change()) {
            (true, true) => {
                score += 50;
                reasons.push("Both role and company changed".to_string());
            }
            (true, false) => {
                score += 30;
                reasons.push("Role changed within same company".to_string());
            }
            (false, true) => {
                score += 40;
                reasons.push("Company changed with similar role".to_string());
            }
            (false, false) => {}
        }

        let score = score.min(100);
        Significance {
            score,
            is_significant: score >= 50 || change.is_founder_change,
            reasons,
        }
    }
}

pub fn categorize(changes: &[Change]) -> BTreeMap<&'static str, Vec<Change>> {
    let mut categories: BTreeMap<&'static str, Vec<Change>> = BTreeMap::new();
    for key in ["founder", "company", "title", "other"] {
        categories.insert(key, Vec::new());
    }
    for change in changes {
        let key = match change.category() {
            ChangeCategory::Founder => "founder",
            ChangeCategory::Company => "company",
            ChangeCategory::Title => "title",
            ChangeCategory::Other => "other",
        };
        categories.entry(key).or_default().push(change.clone());
    }
    categories
}
