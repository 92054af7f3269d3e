use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::config::FallbackConfig;

use super::prompt::{build_lead_prompt, LEAD_SYSTEM_PROMPT};
use super::record::{parse_fallback_response, FallbackRecord};
use super::{FallbackError, TextUnderstanding};

/// Ollama-compatible HTTP client (`/api/generate`).
pub struct OllamaLeadClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaLeadClient {
    pub fn new(config: &FallbackConfig) -> Result<Self, FallbackError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FallbackError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Raw completion for `prompt`.
    pub fn generate(&self, prompt: &str, system: &str) -> Result<String, FallbackError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            format: "json",
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                FallbackError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                FallbackError::Timeout(self.timeout_secs)
            } else {
                FallbackError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FallbackError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| FallbackError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Request body for /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a str,
}

/// Response body from /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl TextUnderstanding for OllamaLeadClient {
    fn understand(&self, text: &str) -> Result<Option<FallbackRecord>, FallbackError> {
        let prompt = build_lead_prompt(text);
        tracing::debug!(model = %self.model, chars = text.len(), "Calling text-understanding fallback");
        let response = self.generate(&prompt, LEAD_SYSTEM_PROMPT)?;
        parse_fallback_response(&response)
    }
}

/// Mock service for tests: returns a canned response and counts calls.
pub struct MockTextUnderstanding {
    response: MockResponse,
    calls: AtomicUsize,
}

enum MockResponse {
    Raw(String),
    Unreachable,
}

impl MockTextUnderstanding {
    /// Reply with `raw` as if it were the model output.
    pub fn new(raw: &str) -> Self {
        Self {
            response: MockResponse::Raw(raw.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(record: &FallbackRecord) -> Self {
        Self::new(&serde_json::to_string(record).unwrap_or_else(|_| "null".to_string()))
    }

    /// Fail every call as if the service were down.
    pub fn unreachable() -> Self {
        Self {
            response: MockResponse::Unreachable,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextUnderstanding for MockTextUnderstanding {
    fn understand(&self, _text: &str) -> Result<Option<FallbackRecord>, FallbackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            MockResponse::Raw(raw) => parse_fallback_response(raw),
            MockResponse::Unreachable => Err(FallbackError::Connection("mock://".to_string())),
        }
    }
}
