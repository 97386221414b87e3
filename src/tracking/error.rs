// src/tracking/error.rs
use crate::provider::ProviderError;

/// Failures that flip a tracking operation's success flag. Insight generation
/// problems are absent on purpose: they are recovered inside the requester.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Invalid LinkedIn URL: {0}")]
    Validation(String),
    #[error("Error fetching profile: {0}")]
    Fetch(#[from] ProviderError),
    #[error("Error processing profile: {0}")]
    Normalization(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for TrackingError {
    fn from(err: anyhow::Error) -> Self {
        TrackingError::Storage(format!("{:#}", err))
    }
}

impl TrackingError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TrackingError::Validation(_) => FailureKind::Validation,
            TrackingError::Fetch(_) => FailureKind::Fetch,
            TrackingError::Normalization(_) => FailureKind::Normalization,
            TrackingError::Storage(_) => FailureKind::Storage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Fetch,
    Normalization,
    Storage,
}
