pub mod extraction;
pub mod gemini;
pub mod prompt;

use anyhow::Result;
use async_trait::async_trait;

pub use gemini::GeminiClient;

/// Output shape requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    PlainText,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub format: ResponseFormat,
    pub temperature: Option<f64>,
}

impl GenerationRequest {
    /// Structured extraction: JSON output at temperature 0.7.
    pub fn json(prompt: String) -> Self {
        Self {
            prompt,
            format: ResponseFormat::Json,
            temperature: Some(0.7),
        }
    }

    pub fn plain_text(prompt: String) -> Self {
        Self {
            prompt,
            format: ResponseFormat::PlainText,
            temperature: None,
        }
    }
}

/// A hosted text model.
///
/// `Ok(None)` means the call succeeded but produced no text, for instance
/// because the prompt was blocked by a safety filter.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<Option<String>>;
}
