// src/insight/mod.rs
use async_trait::async_trait;

pub mod analysis;
pub mod openai_client;
pub mod outreach;
pub mod requester;
pub mod types;

pub use analysis::{fallback_analysis, FounderAnalysis};
pub use openai_client::OpenAiClient;
pub use outreach::outreach_suggestions;
pub use requester::{fallback_insight, InsightRequester};
pub use types::{GenerationError, GenerationRequest};

/// Text-generation backend. Errors are always recovered by the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
