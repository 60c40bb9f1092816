//! Chat-completion backends for reaction polishing.
//!
//! The polisher only needs one call: send a short prompt, get text back.
//! [`LlmProvider`] is that call. Backends:
//! - [`openai::OpenAiProvider`]: OpenAI-compatible `/v1/chat/completions`
//! - [`ollama::OllamaProvider`]: Ollama `/api/chat`
//!
//! [`build_provider`] resolves a `"<provider>/<model>"` spec into one of them.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

pub mod ollama;
pub mod openai;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Who authored a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Instructions ahead of the conversation.
    System,
    /// The caller's turn.
    User,
}

impl Role {
    /// Wire name shared by both supported APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One prompt message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Plain text content.
    pub content: String,
}

impl Message {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single-shot completion request.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Prompt messages, in order.
    pub messages: Vec<Message>,
    /// Optional system prompt, sent ahead of `messages`.
    pub system: Option<String>,
    /// Output token cap; providers fall back to their own default.
    pub max_tokens: Option<u32>,
    /// Sampling temperature; omitted from the wire when unset.
    pub temperature: Option<f32>,
}

/// Token accounting reported by the provider. Zero when not reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStats {
    /// Prompt tokens.
    pub input_tokens: u32,
    /// Generated tokens.
    pub output_tokens: u32,
}

/// Provider reply.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text.
    pub text: String,
    /// Token usage.
    pub usage: UsageStats,
    /// Model name as reported by the server.
    pub model: String,
}

/// `{role, content}` pair as both chat APIs expect it.
#[doc(hidden)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage<'a> {
    /// Role name.
    pub role: &'static str,
    /// Message text.
    pub content: &'a str,
}

/// The system prompt (if any) followed by the request's messages.
#[doc(hidden)]
pub fn wire_messages(request: &CompletionRequest) -> Vec<WireMessage<'_>> {
    let system = request.system.as_deref().map(|content| WireMessage {
        role: Role::System.as_str(),
        content,
    });
    system
        .into_iter()
        .chain(request.messages.iter().map(|msg| WireMessage {
            role: msg.role.as_str(),
            content: &msg.content,
        }))
        .collect()
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by model providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitised response body.
        body: String,
    },
    /// Model spec is not in `<provider>/<model>` format.
    #[error("invalid model spec '{spec}', expected '<provider>/<model>'")]
    InvalidModelSpec {
        /// Invalid raw spec.
        spec: String,
    },
    /// Provider cannot be built from the current configuration.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Longest error body kept in [`ProviderError::HttpStatus`].
const MAX_ERROR_BODY_CHARS: usize = 256;

/// Token shapes scrubbed from error bodies before they reach logs.
static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"sk-ant-[A-Za-z0-9_\-]{10,}",
        r"sk-[A-Za-z0-9_\-]{20,}",
        r"Bearer\s+[A-Za-z0-9._\-]{16,}",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Return the body of a 2xx response, or a sanitised [`ProviderError::HttpStatus`].
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_error_body(&body),
        })
    }
}

fn sanitize_error_body(raw: &str) -> String {
    let mut body = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    for regex in SECRET_PATTERNS.iter() {
        body = regex.replace_all(&body, "[REDACTED]").into_owned();
    }

    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...[truncated]", &body[..cut]),
        None => body,
    }
}

/// POST `body` as JSON to `url` and return the checked response text.
async fn post_json<T: Serialize + Sync>(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &T,
) -> Result<String, ProviderError> {
    let mut request = client.post(url).json(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?;
    check_http_response(response).await
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A chat model that turns a prompt into text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one non-streaming completion.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the server is unreachable, answers with
    /// an error status, or sends a body that is not a completion.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;

    /// The model spec this provider was created for.
    fn model_id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Parse a provider string like `"openai/gpt-4o-mini"` into components.
///
/// Returns `(provider_name, model_name)`.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidModelSpec`] if the string has no `/` or
/// either side is empty.
pub fn parse_provider_string(s: &str) -> Result<(&str, &str), ProviderError> {
    let invalid = || ProviderError::InvalidModelSpec { spec: s.to_owned() };
    let (provider, model) = s.split_once('/').ok_or_else(invalid)?;
    if provider.is_empty() || model.is_empty() {
        return Err(invalid());
    }
    Ok((provider, model))
}

/// Create the provider named by `spec`.
///
/// `base_url` overrides the provider's default endpoint. `api_key` is
/// required for `openai` and ignored for `ollama`.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidModelSpec`] for a malformed spec and
/// [`ProviderError::Unavailable`] for an unknown provider or a missing key.
pub fn build_provider(
    spec: &str,
    base_url: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let (provider, model) = parse_provider_string(spec)?;
    match provider {
        "openai" => {
            let key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                ProviderError::Unavailable(format!("missing API key for '{spec}'"))
            })?;
            let built = openai::OpenAiProvider::new(spec, model, key);
            Ok(Arc::new(match base_url {
                Some(url) => built.with_base_url(url),
                None => built,
            }))
        }
        "ollama" => {
            let built = ollama::OllamaProvider::new(spec, model);
            Ok(Arc::new(match base_url {
                Some(url) => built.with_base_url(url),
                None => built,
            }))
        }
        other => Err(ProviderError::Unavailable(format!(
            "unsupported provider '{other}'"
        ))),
    }
}
