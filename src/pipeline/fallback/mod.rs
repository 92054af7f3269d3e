//! Text-understanding fallback, used only when deterministic extraction fails.
//!
//! The service receives the raw message and may answer with a structured
//! record; `record::record_to_extracted_lead` adapts it back to the
//! deterministic pipeline's shape.

pub mod client;
pub mod prompt;
pub mod record;

pub use client::*;
pub use record::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("Text-understanding service is not reachable at {0}")]
    Connection(String),

    #[error("Text-understanding request timed out after {0}s")]
    Timeout(u64),

    #[error("Text-understanding service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("No JSON block found in response")]
    NoJson,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// External structuring capability (allows mocking).
pub trait TextUnderstanding: Send + Sync {
    /// Send raw text; `Ok(None)` means the service found no lead.
    fn understand(&self, text: &str) -> Result<Option<FallbackRecord>, FallbackError>;
}
