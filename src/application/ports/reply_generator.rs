use async_trait::async_trait;

use crate::domain::ChatJob;

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, job: &ChatJob) -> Result<String, ReplyGeneratorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReplyGeneratorError {
    #[error("generation failed: {0}")]
    GenerationFailed(String),
}
