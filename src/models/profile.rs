// src/models/profile.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingStatus {
    #[default]
    Active,
    Archived,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Active => "active",
            TrackingStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(TrackingStatus::Active),
            "archived" => Some(TrackingStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutreachStatus {
    #[default]
    NotContacted,
    Contacted,
    Responded,
}

impl OutreachStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutreachStatus::NotContacted => "not_contacted",
            OutreachStatus::Contacted => "contacted",
            OutreachStatus::Responded => "responded",
        }
    }

    /// Accepts both the storage form (`not_contacted`) and the display form (`Not contacted`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "not_contacted" => Some(OutreachStatus::NotContacted),
            "contacted" => Some(OutreachStatus::Contacted),
            "responded" => Some(OutreachStatus::Responded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl EducationEntry {
    /// "MBA in Business Administration from Test University", skipping empty parts
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if !self.degree.is_empty() {
            out.push_str(&self.degree);
        }
        if !self.field.is_empty() {
            if !out.is_empty() {
                out.push_str(" in ");
            }
            out.push_str(&self.field);
        }
        if !self.school.is_empty() {
            if !out.is_empty() {
                out.push_str(" from ");
            }
            out.push_str(&self.school);
        }
        out
    }
}

/// Canonical snapshot of one tracked person, keyed by profile URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub linkedin_url: String,
    pub first_name: String,
    pub last_name: String,
    pub current_title: String,
    pub current_company: String,
    pub previous_title: String,
    pub previous_company: String,
    pub last_checked: DateTime<Utc>,
    pub tracking_status: TrackingStatus,
    pub outreach_status: OutreachStatus,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
}

impl Profile {
    pub fn new(linkedin_url: &str) -> Self {
        Self {
            linkedin_url: linkedin_url.trim().to_string(),
            first_name: String::new(),
            last_name: String::new(),
            current_title: String::new(),
            current_company: String::new(),
            previous_title: String::new(),
            previous_company: String::new(),
            last_checked: Utc::now(),
            tracking_status: TrackingStatus::Active,
            outreach_status: OutreachStatus::NotContacted,
            skills: Vec::new(),
            education: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Carry user-managed fields over from the stored snapshot onto a fresh fetch.
    pub fn inherit_statuses(&mut self, stored: &Profile) {
        self.tracking_status = stored.tracking_status;
        self.outreach_status = stored.outreach_status;
        if stored.last_checked > self.last_checked {
            self.last_checked = stored.last_checked;
        }
    }
}
