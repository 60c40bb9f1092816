//! Local Ollama provider over `POST /api/chat` (non-streaming).

use serde::{Deserialize, Serialize};

use super::{
    post_json, wire_messages, CompletionRequest, CompletionResponse, LlmProvider, ProviderError,
    UsageStats, WireMessage,
};

/// Default Ollama API base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    /// Model tag, e.g. `qwen3:8b`.
    pub model: &'a str,
    /// System prompt then user messages.
    pub messages: Vec<WireMessage<'a>>,
    /// Always `false`; replies are read whole.
    pub stream: bool,
    /// Sampling overrides, omitted when none are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SamplingOptions>,
}

/// Ollama `options` object.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SamplingOptions {
    /// Output cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    model: String,
    message: ReplyMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Shape `request` for `/api/chat`.
#[doc(hidden)]
pub fn build_request<'a>(model: &'a str, request: &'a CompletionRequest) -> ChatRequest<'a> {
    let options = SamplingOptions {
        num_predict: request.max_tokens,
        temperature: request.temperature,
    };
    ChatRequest {
        model,
        messages: wire_messages(request),
        stream: false,
        options: (options != SamplingOptions::default()).then_some(options),
    }
}

/// Read the assistant message out of a `/api/chat` body.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body is not a chat reply.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<CompletionResponse, ProviderError> {
    let reply: ChatReply =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(CompletionResponse {
        text: reply.message.content,
        usage: UsageStats {
            input_tokens: reply.prompt_eval_count,
            output_tokens: reply.eval_count,
        },
        model: reply.model,
    })
}

/// Ollama chat client. No authentication.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    model_spec: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Provider for `model`, reported as `model_spec`.
    pub fn new(model_spec: &str, model: &str) -> Self {
        Self {
            model_spec: model_spec.to_owned(),
            model: model.to_owned(),
            base_url: DEFAULT_OLLAMA_URL.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a server other than the local default.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    /// Server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Model tag sent to the server.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = build_request(&self.model, &request);
        let url = format!("{}/api/chat", self.base_url);
        let payload = post_json(&self.client, &url, None, &body).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
