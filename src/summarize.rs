//! The summarize module wraps the chat-completion model used to summarize
//! extracted policy text.

use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatProvider};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

use crate::config::SummarizerConfig;
use crate::constants::{MODEL_API_KEY_ENV_NAME, SUMMARY_PROMPT_PREFIX, THINK_STRIPPER};
use crate::error::{PipelineError, Result};

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

/// Summarizer client. Each call is a single request: no retries, no streaming.
pub struct Summarizer {
    model: Box<dyn ChatProvider>,
}

impl Summarizer {
    /// Builds the client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns a summarization error if the API key is missing, the backend is
    /// unknown or the model cannot be built.
    pub fn from_config(config: &SummarizerConfig) -> Result<Self> {
        if config.requires_api_key() && config.api_key.is_none() {
            return Err(PipelineError::Summarization(format!(
                "missing API key, set {MODEL_API_KEY_ENV_NAME}"
            )));
        }

        let backend = LLMBackend::from_str(&config.backend)
            .map_err(|e| PipelineError::Summarization(format!("Invalid LLM backend: {e}")))?;

        let mut llm_builder = LLMBuilder::new()
            .backend(backend)
            .model(config.model.clone())
            .max_tokens(config.max_tokens)
            .system(config.system_prompt.clone());

        if let Some(api_key) = &config.api_key {
            llm_builder = llm_builder.api_key(api_key.clone());
        }
        if let Some(base_url) = &config.base_url {
            llm_builder = llm_builder.base_url(base_url.clone());
        }

        let model = llm_builder
            .build()
            .map_err(|e| PipelineError::Summarization(format!("Failed to build LLM model: {e}")))?;
        debug!("Summarizer ready: {config:?}");

        Ok(Self { model })
    }

    /// Wraps an already constructed chat provider.
    pub fn with_provider(model: Box<dyn ChatProvider>) -> Self {
        Self { model }
    }

    /// Summarizes sanitized policy text.
    ///
    /// # Returns
    ///
    /// The trimmed content of the model's answer, with reasoning blocks removed.
    ///
    /// # Errors
    ///
    /// Returns a summarization error carrying the upstream message if the request
    /// fails or the response holds no content.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::user()
                .content(format!("{SUMMARY_PROMPT_PREFIX}{text}"))
                .build(),
        ];

        info!("Requesting summary of {} characters", text.len());
        let response = self
            .model
            .chat(&messages)
            .await
            .map_err(|err| PipelineError::Summarization(err.to_string()))?;

        let content = response.text().ok_or_else(|| {
            PipelineError::Summarization("model response carries no content".to_string())
        })?;

        let summary = THINK_STRIPPER_REGEX
            .replace_all(&content, "")
            .trim()
            .to_owned();

        if summary.is_empty() {
            return Err(PipelineError::Summarization(
                "model returned an empty summary".to_string(),
            ));
        }

        Ok(summary)
    }
}
