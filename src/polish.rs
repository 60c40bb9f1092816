//! Optional LLM rewording of reaction text.
//!
//! The engine's templated lines are correct but stiff. A [`Polisher`] may
//! rephrase them while keeping their sentiment. Polishing is best effort:
//! any failure leaves the draft untouched.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PolishConfig;
use crate::providers::{CompletionRequest, LlmProvider, Message, ProviderError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Reaction text pair handed to and returned from a polisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// Private reaction.
    pub internal: String,
    /// Public reaction.
    pub public: String,
}

/// Rewords reaction drafts.
#[async_trait]
pub trait Polisher: Send + Sync {
    /// Return a reworded draft, or `draft` itself when rewording fails.
    async fn polish(&self, persona_name: &str, draft: Draft, message: &str) -> Draft;
}

/// Why a polish attempt fell back to the draft.
#[derive(Debug, thiserror::Error)]
pub enum PolishError {
    /// The provider did not answer in time.
    #[error("polish request timed out after {0:?}")]
    Timeout(Duration),
    /// The provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The reply had no `{...}` block.
    #[error("reply contained no JSON object")]
    NoJson,
    /// The `{...}` block was not a valid reply object.
    #[error("reply JSON was malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct PolishedReply {
    internal: Option<String>,
    public: Option<String>,
}

/// Instructions sent as the system prompt on every polish request.
pub const SYSTEM_PROMPT: &str = "You are polishing tone (not content). Keep each under 20 words. \
     Keep the sentiment of each reaction. Return JSON with keys: internal, public.";

/// Build the per-reaction user prompt.
pub fn build_prompt(persona_name: &str, draft: &Draft, message: &str) -> String {
    format!(
        "Persona: {persona_name}.\n\
         Input message: \"{message}\"\n\
         Internal reaction (polish, keep same sentiment): {internal}\n\
         Public reaction (polish, short): {public}",
        internal = draft.internal,
        public = draft.public,
    )
}

static JSON_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").ok());

/// The widest `{...}` span in `text`, across lines.
pub fn extract_json(text: &str) -> Option<&str> {
    JSON_BLOCK.as_ref()?.find(text).map(|m| m.as_str())
}

fn parse_reply(text: &str, draft: Draft) -> Result<Draft, PolishError> {
    let block = extract_json(text).ok_or(PolishError::NoJson)?;
    let reply: PolishedReply = serde_json::from_str(block)?;
    let keep_or = |candidate: Option<String>, original: String| match candidate {
        Some(text) if !text.trim().is_empty() => text.trim().to_owned(),
        _ => original,
    };
    Ok(Draft {
        internal: keep_or(reply.internal, draft.internal),
        public: keep_or(reply.public, draft.public),
    })
}

/// Polisher backed by an [`LlmProvider`].
#[derive(Clone)]
pub struct LlmPolisher {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl std::fmt::Debug for LlmPolisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmPolisher")
            .field("model", &self.provider.model_id())
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmPolisher {
    /// Wrap `provider` with the default timeout and no sampling overrides.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Apply timeout and sampling settings from config.
    #[must_use]
    pub fn with_config(mut self, config: &PolishConfig) -> Self {
        self.timeout = Duration::from_secs(config.timeout_secs);
        self.max_tokens = Some(config.max_tokens);
        self.temperature = Some(config.temperature);
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// One polish attempt, surfacing the failure reason.
    ///
    /// # Errors
    ///
    /// Returns [`PolishError`] on timeout, provider failure, or an
    /// unparseable reply.
    pub async fn try_polish(
        &self,
        persona_name: &str,
        draft: Draft,
        message: &str,
    ) -> Result<Draft, PolishError> {
        let request = CompletionRequest {
            messages: vec![Message::user(build_prompt(persona_name, &draft, message))],
            system: Some(SYSTEM_PROMPT.to_owned()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| PolishError::Timeout(self.timeout))??;

        debug!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "polish reply received"
        );
        parse_reply(&response.text, draft)
    }
}

#[async_trait]
impl Polisher for LlmPolisher {
    async fn polish(&self, persona_name: &str, draft: Draft, message: &str) -> Draft {
        match self.try_polish(persona_name, draft.clone(), message).await {
            Ok(polished) => polished,
            Err(e) => {
                warn!(persona = persona_name, error = %e, "polish failed, keeping draft");
                draft
            }
        }
    }
}
