use async_trait::async_trait;
use gemini_rust::Gemini;

use crate::errors::{AppError, AppResult};

/// A fully assembled prompt: standing instructions plus the conversational turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Produces the bot reply for a prompt.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> AppResult<String>;
}

pub struct GeminiService {
    client: Gemini,
}

impl GeminiService {
    pub fn new(api_key: &str) -> AppResult<Self> {
        let client = Gemini::new(api_key)
            .map_err(|e| AppError::Other(format!("Failed to create Gemini client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ResponseGenerator for GeminiService {
    async fn generate(&self, prompt: &Prompt) -> AppResult<String> {
        let message = format!("{}\n\n{}", prompt.system, prompt.user);

        tracing::info!("Sending request to Gemini API");

        let response = self
            .client
            .generate_content()
            .with_user_message(&message)
            .execute()
            .await
            .map_err(|e| AppError::Generation(format!("Gemini API error: {}", e)))?;

        let response_text = response.text();
        tracing::info!("✅ Generated response from Gemini API");

        Ok(response_text)
    }
}
