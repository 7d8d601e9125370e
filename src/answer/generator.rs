//! Generation backends behind a common capability trait.
//!
//! Each backend is independently optional: missing credentials or an
//! unreachable service surface as [`GenerateError::Unavailable`], never a
//! crash, so callers can statically distinguish "no backend" from "backend
//! produced text" and fall back to extraction.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};
use thiserror::Error;

/// Bound on every backend call; a timeout resolves via fallback, never as a
/// user-facing failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";
const OLLAMA_DEFAULT_MODEL: &str = "llama2";

#[derive(Debug, Error)]
pub enum GenerateError {
    /// Credentials absent or service unreachable. Expected, not exceptional.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

/// A text-generation capability constrained to the supplied context.
pub trait TextGenerator {
    fn name(&self) -> &'static str;

    /// Cheap availability probe for status reporting; no text is generated.
    fn is_available(&self) -> bool;

    fn generate(
        &self,
        system_prompt: &str,
        context: &str,
        query: &str,
    ) -> Result<String, GenerateError>;
}

fn http_client(timeout: Duration) -> Result<Client, GenerateError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Single-prompt layout shared by the prompt-completion style backends.
fn flat_prompt(system_prompt: &str, context: &str, query: &str) -> String {
    format!(
        "{}\n\nContext:\n{}\n\nQuestion: {}\n\nAnswer:",
        system_prompt, context, query
    )
}

/// Google Gemini (`gemini-1.5-flash`), keyed by `GOOGLE_API_KEY`.
pub struct GeminiGenerator {
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

impl Default for GeminiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate(
        &self,
        system_prompt: &str,
        context: &str,
        query: &str,
    ) -> Result<String, GenerateError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerateError::Unavailable("GOOGLE_API_KEY not set".into()))?;

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key={}",
            api_key
        );
        let body = json!({
            "contents": [{
                "parts": [{ "text": flat_prompt(system_prompt, context, query) }]
            }]
        });

        let response: Value = http_client(REQUEST_TIMEOUT)?
            .post(&url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| GenerateError::Malformed("no candidate text in response".into()))
    }
}

/// OpenAI chat completions (`gpt-3.5-turbo`), keyed by `OPENAI_API_KEY`.
pub struct OpenAiGenerator {
    api_key: Option<String>,
}

impl OpenAiGenerator {
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

impl Default for OpenAiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate(
        &self,
        system_prompt: &str,
        context: &str,
        query: &str,
    ) -> Result<String, GenerateError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerateError::Unavailable("OPENAI_API_KEY not set".into()))?;

        let body = json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": format!("Context:\n{}\n\nQuestion: {}", context, query) }
            ],
            "temperature": 0.3,
            "max_tokens": 300
        });

        let response: Value = http_client(REQUEST_TIMEOUT)?
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| GenerateError::Malformed("no message content in response".into()))
    }
}

/// Local Ollama server, located via `OLLAMA_BASE_URL` / `OLLAMA_MODEL`.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new() -> Self {
        Self {
            base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| OLLAMA_DEFAULT_URL.to_string()),
            model: std::env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| OLLAMA_DEFAULT_MODEL.to_string()),
        }
    }

    fn probe(&self) -> bool {
        http_client(PROBE_TIMEOUT)
            .and_then(|client| {
                Ok(client
                    .get(format!("{}/api/tags", self.base_url))
                    .send()?
                    .status()
                    .is_success())
            })
            .unwrap_or(false)
    }
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn is_available(&self) -> bool {
        self.probe()
    }

    fn generate(
        &self,
        system_prompt: &str,
        context: &str,
        query: &str,
    ) -> Result<String, GenerateError> {
        if !self.probe() {
            return Err(GenerateError::Unavailable(format!(
                "no Ollama server at {}",
                self.base_url
            )));
        }

        let body = json!({
            "model": self.model,
            "prompt": flat_prompt(system_prompt, context, query),
            "stream": false,
            "options": {
                "temperature": 0.3,
                "top_p": 0.9,
                "num_predict": 300
            }
        });

        let response: Value = http_client(REQUEST_TIMEOUT)?
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        response["response"]
            .as_str()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| GenerateError::Malformed("no response text from Ollama".into()))
    }
}
