//! OpenAI-compatible provider over `POST /v1/chat/completions`.
//!
//! Works against api.openai.com or any server speaking the same protocol
//! (set `polish.base_url`).

use serde::{Deserialize, Serialize};

use super::{
    post_json, wire_messages, CompletionRequest, CompletionResponse, LlmProvider, ProviderError,
    UsageStats, WireMessage,
};

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Output cap when the request does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    /// Model name without the `openai/` prefix.
    pub model: &'a str,
    /// System prompt then user messages.
    pub messages: Vec<WireMessage<'a>>,
    /// Output cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Shape `request` for the chat completions endpoint.
#[doc(hidden)]
pub fn build_request<'a>(model: &'a str, request: &'a CompletionRequest) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: wire_messages(request),
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        temperature: request.temperature,
    }
}

/// Read the first choice out of a chat completions body.
///
/// # Errors
///
/// Returns `ProviderError::Parse` for malformed JSON or an empty `choices`
/// list.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<CompletionResponse, ProviderError> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("response has no choices".to_owned()))?;

    Ok(CompletionResponse {
        text: choice.message.content.unwrap_or_default(),
        usage: UsageStats {
            input_tokens: completion.usage.prompt_tokens,
            output_tokens: completion.usage.completion_tokens,
        },
        model: completion.model,
    })
}

/// Chat completions client authenticated with a bearer key.
#[derive(Clone)]
pub struct OpenAiProvider {
    model_spec: String,
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("model_spec", &self.model_spec)
            .field("base_url", &self.base_url)
            .field("api_key", &"__REDACTED__")
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    /// Provider for `model`, reported as `model_spec`.
    pub fn new(model_spec: &str, model: &str, api_key: &str) -> Self {
        Self {
            model_spec: model_spec.to_owned(),
            model: model.to_owned(),
            api_key: api_key.to_owned(),
            base_url: DEFAULT_OPENAI_URL.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at another OpenAI-compatible server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    /// Full chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = build_request(&self.model, &request);
        let payload = post_json(&self.client, &self.endpoint(), Some(self.api_key.as_str()), &body).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
