//! Summarizer configuration, loaded once at startup and immutable afterwards.

use log::debug;
use url::Url;

use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, FALLBACK_API_KEY_ENV_NAME, MODEL_API_KEY_ENV_NAME,
    SYSTEM_PROMPT,
};
use crate::error::{PipelineError, Result};

/// Everything the summarizer client needs to talk to the chat-completion API.
#[derive(Clone, PartialEq, Eq)]
pub struct SummarizerConfig {
    /// `llm` backend name, e.g. `openai` or `ollama`
    pub backend: String,
    /// Model identifier passed to the backend
    pub model: String,
    pub api_key: Option<String>,
    /// Override of the backend endpoint (OpenAI-compatible servers)
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl SummarizerConfig {
    /// Builds a configuration from a model URL such as `openai://gpt-4-turbo`.
    ///
    /// The scheme selects the backend and the host names the model. A username,
    /// if present, is appended as a tag: `ollama://8b@llama3` becomes `llama3:8b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or carries no model name.
    pub fn from_model_url(model_url: &str) -> Result<Self> {
        let url = Url::parse(model_url)?;
        let model = [
            url.host_str()
                .ok_or_else(|| PipelineError::Parse("Specify model name as host URL.".into()))?,
            url.username(),
        ]
        .iter()
        .filter(|x| !x.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(":");

        Ok(Self {
            backend: url.scheme().to_string(),
            model,
            api_key: None,
            base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: SYSTEM_PROMPT.to_string(),
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Reads the API key from the environment, preferring the policylens variable.
    pub fn api_key_from_env() -> Option<String> {
        [MODEL_API_KEY_ENV_NAME, FALLBACK_API_KEY_ENV_NAME]
            .iter()
            .find_map(|name| match std::env::var(name) {
                Ok(key) if !key.trim().is_empty() => {
                    debug!("API key provided by {name}");
                    Some(key)
                }
                _ => None,
            })
    }

    /// Local backends run without credentials.
    pub fn requires_api_key(&self) -> bool {
        self.backend != "ollama"
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: "openai".to_string(),
            model: DEFAULT_MODEL.trim_start_matches("openai://").to_string(),
            api_key: None,
            base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SummarizerConfig")
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
