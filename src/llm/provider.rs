use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AnswerServiceConfig;
use crate::types::AppResult;

/// A remote completion service answering free-text prompts.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

/// Sampling settings sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub repetition_penalty: f64,
    pub stop: &'static [&'static str],
}

pub const GENERATION_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 512,
    temperature: 0.7,
    top_k: 50,
    top_p: 0.7,
    repetition_penalty: 1.1,
    stop: &["User:", "AI:"],
};

/// Build the answer service for the configured provider.
pub fn create_answer_service(config: &AnswerServiceConfig) -> Arc<dyn AnswerService> {
    Arc::new(crate::llm::together::TogetherAdapter::new(config))
}
