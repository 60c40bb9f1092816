//! LLM polishing against scripted providers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use masquerade::config::PolishConfig;
use masquerade::polish::{Draft, LlmPolisher, PolishError, Polisher, SYSTEM_PROMPT};
use masquerade::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, ProviderError, Role, UsageStats,
};

/// Replies with a fixed text (or fails) and records the last request.
pub struct ScriptedProvider {
    reply: Option<String>,
    delay: Duration,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_owned()),
            delay: Duration::ZERO,
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            delay: Duration::ZERO,
            last_request: Mutex::new(None),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            reply: Some(r#"{"internal": "late", "public": "late"}"#.to_owned()),
            delay,
            last_request: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().expect("lock").clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        *self.last_request.lock().expect("lock") = Some(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Some(text) => Ok(CompletionResponse {
                text: text.clone(),
                usage: UsageStats::default(),
                model: "scripted".to_owned(),
            }),
            None => Err(ProviderError::HttpStatus {
                status: 500,
                body: "boom".to_owned(),
            }),
        }
    }

    fn model_id(&self) -> &str {
        "scripted/model"
    }
}

fn draft() -> Draft {
    Draft {
        internal: "Not bad, makes me feel upbeat.".to_owned(),
        public: "I'm down.".to_owned(),
    }
}

#[tokio::test]
async fn replaces_both_fields_from_wrapped_json() {
    let provider = Arc::new(ScriptedProvider::replying(
        "Here you go:\n{\"internal\": \"Lowkey hyped about this.\", \"public\": \"Count me in!\"}\nEnjoy",
    ));
    let polisher = LlmPolisher::new(provider);

    let polished = polisher.polish("Maya", draft(), "free pizza friday").await;
    assert_eq!(polished.internal, "Lowkey hyped about this.");
    assert_eq!(polished.public, "Count me in!");
}

#[tokio::test]
async fn request_carries_prompt_and_sampling_settings() {
    let provider = Arc::new(ScriptedProvider::replying("{}"));
    let config = PolishConfig::default();
    let polisher = LlmPolisher::new(provider.clone()).with_config(&config);

    let polished = polisher.polish("Maya", draft(), "free pizza friday").await;
    assert_eq!(polished, draft());

    let request = provider.last_request().expect("provider should be called");
    assert_eq!(request.max_tokens, Some(200));
    assert_eq!(request.temperature, Some(0.4));
    assert_eq!(request.system.as_deref(), Some(SYSTEM_PROMPT));
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, Role::User);
    assert!(request.messages[0].content.contains("Persona: Maya."));
    assert!(request.messages[0].content.contains("free pizza friday"));
}

#[tokio::test]
async fn provider_failure_keeps_draft() {
    let polisher = LlmPolisher::new(Arc::new(ScriptedProvider::failing()));

    let err = polisher
        .try_polish("Maya", draft(), "hi")
        .await
        .expect_err("provider fails");
    assert!(matches!(err, PolishError::Provider(ProviderError::HttpStatus { .. })));

    assert_eq!(polisher.polish("Maya", draft(), "hi").await, draft());
}

#[tokio::test]
async fn prose_reply_keeps_draft() {
    let polisher = LlmPolisher::new(Arc::new(ScriptedProvider::replying(
        "Sorry, I can't help with that.",
    )));
    assert_eq!(polisher.polish("Maya", draft(), "hi").await, draft());
}

#[tokio::test]
async fn non_string_fields_keep_draft() {
    let polisher = LlmPolisher::new(Arc::new(ScriptedProvider::replying(
        r#"{"internal": 42, "public": ["a"]}"#,
    )));
    assert_eq!(polisher.polish("Maya", draft(), "hi").await, draft());
}

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out() {
    let polisher = LlmPolisher::new(Arc::new(ScriptedProvider::slow(Duration::from_secs(60))))
        .with_timeout(Duration::from_secs(5));

    let err = polisher
        .try_polish("Maya", draft(), "hi")
        .await
        .expect_err("should time out");
    assert!(matches!(err, PolishError::Timeout(d) if d == Duration::from_secs(5)));

    assert_eq!(polisher.polish("Maya", draft(), "hi").await, draft());
}

#[tokio::test(start_paused = true)]
async fn reply_within_timeout_is_used() {
    let polisher = LlmPolisher::new(Arc::new(ScriptedProvider::slow(Duration::from_secs(2))))
        .with_timeout(Duration::from_secs(5));

    let polished = polisher.polish("Maya", draft(), "hi").await;
    assert_eq!(polished.internal, "late");
}
