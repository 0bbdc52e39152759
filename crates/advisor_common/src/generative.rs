//! Generative fallback client.
//!
//! Generic interface for the generative-model collaborator, with a real
//! HTTP implementation (Ollama-style endpoint) and a static client for
//! tests. The core treats any failure or timeout as "no answer available"
//! and never retries; retry policy, if any, belongs to the collaborator.

use crate::types::QuerySignals;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generative backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerativeConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Collaborator errors. All of them degrade to the same "unable to answer
/// confidently" response at the engine boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerativeError {
    #[error("generative backend is disabled in configuration")]
    Disabled,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("invalid response payload: {0}")]
    InvalidPayload(String),
}

/// Generic generative client trait.
pub trait GenerativeClient: Send + Sync {
    /// Ask the backend, carrying forward whatever partial signals the
    /// extractor produced as grounding context.
    fn ask(&self, query: &str, context: &QuerySignals) -> Result<String, GenerativeError>;
}

/// Real client over an Ollama-style HTTP endpoint.
pub struct HttpGenerativeClient {
    config: GenerativeConfig,
    client: reqwest::blocking::Client,
}

impl HttpGenerativeClient {
    pub fn new(config: GenerativeConfig) -> Result<Self, GenerativeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerativeError::HttpError(format!("client build failed: {e}")))?;
        Ok(Self { config, client })
    }

    fn build_prompt(query: &str, context: &QuerySignals) -> String {
        let mut prompt = String::from(
            "You are a university course advising assistant. Answer the student's \
             question concisely. If you are not sure, say so.\n",
        );
        let labels = context.matched_labels();
        if !labels.is_empty() {
            prompt.push_str(&format!("Known context: {}\n", labels.join(", ")));
        }
        prompt.push_str(&format!("Student question: {query}"));
        prompt
    }
}

impl GenerativeClient for HttpGenerativeClient {
    fn ask(&self, query: &str, context: &QuerySignals) -> Result<String, GenerativeError> {
        if !self.config.enabled {
            return Err(GenerativeError::Disabled);
        }

        let url = format!("{}/api/generate", self.config.endpoint);
        let request_body = serde_json::json!({
            "model": self.config.model,
            "prompt": Self::build_prompt(query, context),
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GenerativeError::Timeout(self.config.timeout_secs)
                } else {
                    GenerativeError::HttpError(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(GenerativeError::HttpError(format!(
                "HTTP {} from generative backend",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .map_err(|e| GenerativeError::InvalidPayload(format!("parse failed: {e}")))?;

        let text = payload
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(GenerativeError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Fixed-answer client for tests and offline runs.
pub struct StaticGenerativeClient {
    response: Option<String>,
}

impl StaticGenerativeClient {
    /// Always answers with `text`.
    pub fn answering(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
        }
    }

    /// Always fails, as an unreachable backend would.
    pub fn unavailable() -> Self {
        Self { response: None }
    }
}

impl GenerativeClient for StaticGenerativeClient {
    fn ask(&self, _query: &str, _context: &QuerySignals) -> Result<String, GenerativeError> {
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err(GenerativeError::HttpError("connection refused".to_string())),
        }
    }
}
