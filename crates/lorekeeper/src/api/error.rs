use thiserror::Error;

/// Failures that map to a specific status and a message safe to show the caller.
#[derive(Error, Debug)]
pub enum InnerApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("The AI model returned an empty response")]
    EmptyAiResponse,
    #[error("The AI response could not be parsed as JSON; check the server logs for the raw output")]
    UnparseableAiResponse,
}
