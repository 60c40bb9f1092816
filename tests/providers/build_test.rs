//! Provider construction from model specs.

use masquerade::providers::{build_provider, parse_provider_string, ProviderError};

#[test]
fn parse_provider_string_splits_on_first_slash() {
    let parsed = parse_provider_string("ollama/library/qwen3:8b").expect("valid spec");
    assert_eq!(parsed, ("ollama", "library/qwen3:8b"));
}

#[test]
fn parse_provider_string_rejects_malformed_specs() {
    for spec in ["gpt-4o-mini", "/gpt", "openai/", ""] {
        assert!(
            matches!(
                parse_provider_string(spec),
                Err(ProviderError::InvalidModelSpec { .. })
            ),
            "spec {spec:?} should be rejected"
        );
    }
}

#[test]
fn build_provider_requires_openai_key() {
    let missing = build_provider("openai/gpt-4o-mini", None, None);
    assert!(matches!(missing, Err(ProviderError::Unavailable(_))));

    let blank = build_provider("openai/gpt-4o-mini", None, Some("  "));
    assert!(matches!(blank, Err(ProviderError::Unavailable(_))));

    let built = build_provider("openai/gpt-4o-mini", None, Some("sk-test")).expect("provider");
    assert_eq!(built.model_id(), "openai/gpt-4o-mini");
}

#[test]
fn build_provider_ollama_needs_no_key() {
    let built = build_provider("ollama/qwen3:8b", Some("http://gpu-box:11434/"), None)
        .expect("provider");
    assert_eq!(built.model_id(), "ollama/qwen3:8b");
}

#[test]
fn build_provider_rejects_unknown_provider() {
    let result = build_provider("anthropic/claude", None, Some("key"));
    assert!(matches!(result, Err(ProviderError::Unavailable(_))));
}
