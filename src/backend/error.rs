//! Error types for backend communication.

/// Message shown when the backend cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str = "Could not reach the backend. Check the URL and try again.";

/// Message shown when a submitted prompt is empty.
pub const EMPTY_PROMPT_MESSAGE: &str = "Please write a prompt first";

/// Message shown when the backend reports a failure without saying why.
pub const GENERATION_FAILED_MESSAGE: &str = "Generation failed";

/// Errors that can occur while talking to the generation backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Prompt was empty or whitespace-only. Raised before any request is sent.
    #[error("Empty prompt")]
    EmptyPrompt,

    /// The request never produced an HTTP response (DNS, refused, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status or an explicit error body.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Backend-supplied message, or a generic one
        message: String,
    },

    /// A 2xx response whose body could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text suitable for showing to the person who pressed the button.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyPrompt => EMPTY_PROMPT_MESSAGE.to_string(),
            Self::Transport(_) => UNREACHABLE_MESSAGE.to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::InvalidResponse(reason) => format!("Unexpected backend response: {}", reason),
            Self::Io(e) => format!("Could not write file: {}", e),
        }
    }
}
