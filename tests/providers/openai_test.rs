//! OpenAI provider wire format tests.

use masquerade::providers::openai::{
    build_request, parse_response, OpenAiProvider, DEFAULT_MAX_TOKENS,
};
use masquerade::providers::{CompletionRequest, Message, ProviderError};

fn simple_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user("Hello")],
        system: Some("You are helpful.".to_owned()),
        max_tokens: Some(200),
        temperature: Some(0.4),
    }
}

#[test]
fn build_request_sets_model_system_and_sampling() {
    let binding = simple_request();
    let req = build_request("gpt-4o-mini", &binding);
    assert_eq!(req.model, "gpt-4o-mini");
    assert_eq!(req.max_tokens, 200);
    assert_eq!(req.temperature, Some(0.4));
    assert_eq!(req.messages.len(), 2);
    assert_eq!(req.messages[0].role, "system");
    assert_eq!(req.messages[0].content, "You are helpful.");
    assert_eq!(req.messages[1].role, "user");
    assert_eq!(req.messages[1].content, "Hello");
}

#[test]
fn build_request_defaults_max_tokens_and_omits_temperature() {
    let request = CompletionRequest {
        messages: vec![Message::user("Hello")],
        ..CompletionRequest::default()
    };
    let req = build_request("gpt-4o-mini", &request);
    assert_eq!(req.max_tokens, DEFAULT_MAX_TOKENS);
    assert_eq!(req.messages.len(), 1);

    let json = serde_json::to_value(&req).expect("request should serialize");
    assert!(json.get("temperature").is_none());
}

#[test]
fn parse_response_reads_text_and_usage() {
    let body = r#"{
        "model": "gpt-4o-mini",
        "choices": [{"message": {"role": "assistant", "content": "hey"}}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3}
    }"#;
    let resp = parse_response(body).expect("valid response");
    assert_eq!(resp.text, "hey");
    assert_eq!(resp.model, "gpt-4o-mini");
    assert_eq!(resp.usage.input_tokens, 12);
    assert_eq!(resp.usage.output_tokens, 3);
}

#[test]
fn parse_response_tolerates_null_content_and_missing_usage() {
    let body = r#"{"model": "m", "choices": [{"message": {"content": null}}]}"#;
    let resp = parse_response(body).expect("valid response");
    assert_eq!(resp.text, "");
    assert_eq!(resp.usage.input_tokens, 0);
}

#[test]
fn parse_response_requires_a_choice() {
    let err = parse_response(r#"{"model": "m", "choices": []}"#);
    assert!(matches!(err, Err(ProviderError::Parse(_))));
}

#[test]
fn debug_output_redacts_api_key() {
    let provider = OpenAiProvider::new("openai/gpt-4o-mini", "gpt-4o-mini", "sk-very-secret");
    let debug = format!("{provider:?}");
    assert!(!debug.contains("sk-very-secret"));
    assert!(debug.contains("__REDACTED__"));
}

#[test]
fn base_url_override_trims_trailing_slash() {
    let provider = OpenAiProvider::new("openai/x", "x", "k")
        .with_base_url("http://localhost:1234/");
    assert_eq!(provider.endpoint(), "http://localhost:1234/v1/chat/completions");
}
