//! OpenAI-compatible providers for embeddings and chat completion.
//!
//! Both providers call the HTTP API directly with `reqwest` and accept a
//! custom base URL, so they also work against OpenAI-compatible servers
//! (Ollama, vLLM, gateway proxies).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::llm::LanguageModel;

/// The default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The default model for embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The default chat model used for sufficiency judgment and synthesis.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Character guard for embedding input, roughly the 8192-token limit of the
/// embedding models. Inputs above this fail with `TooLong` instead of being
/// silently truncated by the provider.
const DEFAULT_MAX_INPUT_CHARS: usize = 32_000;

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Map a non-success HTTP response to the error taxonomy.
///
/// 429 and 5xx are transient (`ProviderUnavailable`); other 4xx mean the
/// input or request is at fault (`ProviderRejected`).
async fn map_status_error(provider: &str, response: reqwest::Response) -> RagError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
    error!(provider, %status, detail, "API error");

    if status.as_u16() == 429 || status.is_server_error() {
        RagError::ProviderUnavailable {
            provider: provider.to_string(),
            message: format!("API returned {status}: {detail}"),
        }
    } else {
        RagError::ProviderRejected {
            provider: provider.to_string(),
            message: format!("API returned {status}: {detail}"),
        }
    }
}

/// Validate embedding input: non-empty after trimming, within the limit.
fn validate_input(provider: &str, text: &str, max_chars: usize) -> Result<()> {
    if text.trim().is_empty() {
        return Err(RagError::ProviderRejected {
            provider: provider.to_string(),
            message: "input text is empty after trimming".to_string(),
        });
    }
    let length = text.chars().count();
    if length > max_chars {
        return Err(RagError::TooLong { length, max: max_chars });
    }
    Ok(())
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment
///   variable.
/// - `base_url` – override for OpenAI-compatible endpoints.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::openai::OpenAiEmbeddingProvider;
///
/// let provider = OpenAiEmbeddingProvider::new("sk-...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    max_input_chars: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl OpenAiEmbeddingProvider {
    /// Create a new provider with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("embedding API key must not be empty".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            request_dimensions: None,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RagError::ConfigError("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output dimensions (Matryoshka support).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// Override the API base URL for OpenAI-compatible endpoints.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the maximum accepted input length in characters.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::ProviderUnavailable {
            provider: "OpenAI".to_string(),
            message: "API returned empty response".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        for text in texts {
            validate_input("OpenAI", text, self.max_input_chars)?;
        }

        debug!(provider = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "embedding request failed");
                RagError::ProviderUnavailable {
                    provider: "OpenAI".to_string(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            return Err(map_status_error("OpenAI", response).await);
        }

        let mut parsed: EmbeddingResponse =
            response.json().await.map_err(|e| RagError::ProviderUnavailable {
                provider: "OpenAI".to_string(),
                message: format!("failed to parse response: {e}"),
            })?;

        if parsed.data.len() != texts.len() {
            return Err(RagError::ProviderUnavailable {
                provider: "OpenAI".to_string(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    parsed.data.len(),
                    texts.len()
                ),
            });
        }

        // The API reports an index per embedding; order by it so the batch
        // matches the input 1:1.
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat provider ──────────────────────────────────────────────────

/// A [`LanguageModel`] backed by the OpenAI chat-completions API.
///
/// All failures are collapsed into
/// [`RagError::GenerationFailed`](crate::RagError::GenerationFailed): the
/// pipeline treats generation as an opaque call with a single failure class
/// and never retries it.
pub struct OpenAiChatProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiChatProvider {
    /// Create a new provider with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("chat API key must not be empty".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.0,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RagError::ConfigError("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    /// Create a provider for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(api_key)?.with_base_url(base_url).with_model(model))
    }

    /// Set the chat model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature (defaults to 0.0 for reproducibility).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl LanguageModel for OpenAiChatProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = "OpenAI", model = %self.model, prompt_len = prompt.len(), "chat completion");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "chat request failed");
                RagError::GenerationFailed(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(provider = "OpenAI", %status, detail, "chat API error");
            return Err(RagError::GenerationFailed(format!("API returned {status}: {detail}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagError::GenerationFailed(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RagError::GenerationFailed("API returned no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected_before_any_request() {
        assert!(matches!(
            validate_input("OpenAI", "   \n\t", 100),
            Err(RagError::ProviderRejected { .. })
        ));
    }

    #[test]
    fn over_limit_input_fails_with_too_long() {
        let text = "x".repeat(101);
        assert!(matches!(
            validate_input("OpenAI", &text, 100),
            Err(RagError::TooLong { length: 101, max: 100 })
        ));
    }

    #[test]
    fn empty_api_key_is_a_config_error() {
        assert!(matches!(OpenAiEmbeddingProvider::new(""), Err(RagError::ConfigError(_))));
        assert!(matches!(OpenAiChatProvider::new(""), Err(RagError::ConfigError(_))));
    }
}
