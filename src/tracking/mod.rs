// src/tracking/mod.rs
pub mod detector;
pub mod error;
pub mod normalizer;
pub mod orchestrator;
pub mod types;

pub use detector::{categorize, contains_keyword, ChangeDetector, Significance};
pub use error::{FailureKind, TrackingError};
pub use normalizer::normalize;
pub use orchestrator::Tracker;
pub use types::{
    AddOutcome, AddStatus, BatchAddSummary, BatchRefreshSummary, FounderChangeView,
    OutreachSuggestion, RefreshOutcome,
};
