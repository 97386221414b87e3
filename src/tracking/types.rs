// src/tracking/types.rs
use super::error::{FailureKind, TrackingError};
use crate::insight::FounderAnalysis;
use crate::models::{Change, Profile};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddStatus {
    Added,
    AlreadyTracked,
    Failed(FailureKind),
}

#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub url: String,
    pub success: bool,
    pub message: String,
    pub status: AddStatus,
}

impl AddOutcome {
    pub fn added(url: &str) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            message: format!("Successfully added profile {} to tracking", url),
            status: AddStatus::Added,
        }
    }

    pub fn already_tracked(url: &str) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            message: format!("Profile {} is already tracked", url),
            status: AddStatus::AlreadyTracked,
        }
    }

    pub fn failed(url: &str, error: &TrackingError) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            message: error.to_string(),
            status: AddStatus::Failed(error.kind()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub url: String,
    pub success: bool,
    pub message: String,
    pub change: Option<Change>,
    pub failure: Option<FailureKind>,
}

impl RefreshOutcome {
    pub fn unchanged(url: &str) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            message: format!("No changes detected for {}", url),
            change: None,
            failure: None,
        }
    }

    pub fn changed(url: &str, change: Change) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            message: format!("Detected role change for {}", url),
            change: Some(change),
            failure: None,
        }
    }

    pub fn failed(url: &str, error: &TrackingError) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            message: error.to_string(),
            change: None,
            failure: Some(error.kind()),
        }
    }
}

// First sight of an untracked profile during refresh
impl From<AddOutcome> for RefreshOutcome {
    fn from(outcome: AddOutcome) -> Self {
        let failure = match outcome.status {
            AddStatus::Failed(kind) => Some(kind),
            _ => None,
        };
        Self {
            url: outcome.url,
            success: outcome.success,
            message: outcome.message,
            change: None,
            failure,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchAddSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub already_tracked: usize,
    pub details: Vec<AddOutcome>,
}

impl BatchAddSummary {
    pub fn from_outcomes(details: Vec<AddOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in &details {
            match outcome.status {
                AddStatus::Added => summary.succeeded += 1,
                AddStatus::AlreadyTracked => summary.already_tracked += 1,
                AddStatus::Failed(_) => summary.failed += 1,
            }
        }
        summary.details = details;
        summary
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchRefreshSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub changes_detected: usize,
    pub founder_changes: usize,
    pub details: Vec<RefreshOutcome>,
    /// Set when the batch could not start, e.g. the tracked profiles could not be listed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchRefreshSummary {
    pub fn from_outcomes(details: Vec<RefreshOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in &details {
            if !outcome.success {
                summary.failed += 1;
                continue;
            }
            summary.succeeded += 1;
            if let Some(change) = &outcome.change {
                summary.changes_detected += 1;
                if change.is_founder_change {
                    summary.founder_changes += 1;
                }
            }
        }
        summary.details = details;
        summary
    }

    pub fn aborted(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// A founder change joined with the name of the person it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct FounderChangeView {
    #[serde(flatten)]
    pub change: Change,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

/// Everything needed to reach out about one recent founder change
#[derive(Debug, Clone, Serialize)]
pub struct OutreachSuggestion {
    pub profile: Profile,
    pub change: Change,
    pub analysis: FounderAnalysis,
    pub suggestions: Vec<String>,
}
