//! Lexicon parsing and validation.

use masquerade::catalog::{CatalogError, Lexicon};

use crate::support::LEXICON;

#[test]
fn fixture_lexicon_declares_categories() {
    let lexicon = Lexicon::from_json(LEXICON).expect("fixture lexicon");
    assert_eq!(
        lexicon.emotions().keys().collect::<Vec<_>>(),
        ["anger", "fear", "joy", "surprise"]
    );
    assert_eq!(lexicon.tones().keys().collect::<Vec<_>>(), ["community", "humor"]);
    assert_eq!(lexicon.political().len(), 2);
    assert!(lexicon.knows_tone("humor"));
    assert!(!lexicon.knows_tone("ambition"));
}

#[test]
fn core_emotions_are_known_without_declaration() {
    let lexicon = Lexicon::from_json(LEXICON).expect("fixture lexicon");
    for emotion in ["trust", "sadness", "disgust"] {
        assert!(lexicon.knows_emotion(emotion), "{emotion} should be known");
    }
}

#[test]
fn category_names_are_normalised() {
    let lexicon = Lexicon::from_json(
        r#"{"positive": [], "negative": [], "emotions": {" Joy ": ["yay"]}, "tones": {"HUMOR": []}}"#,
    )
    .expect("valid lexicon");
    assert!(lexicon.emotions().contains_key("joy"));
    assert!(lexicon.knows_tone("humor"));
    assert!(lexicon.tones()["humor"].is_empty());
}

#[test]
fn blank_category_name_is_rejected() {
    let err = Lexicon::from_json(
        r#"{"positive": [], "negative": [], "emotions": {}, "tones": {"  ": ["lol"]}}"#,
    )
    .expect_err("blank tone name");
    assert!(matches!(err, CatalogError::BlankCategory { group: "tones" }));
}

#[test]
fn wrongly_typed_document_is_a_parse_error() {
    let err = Lexicon::from_json(
        r#"{"positive": "great", "negative": [], "emotions": {}, "tones": {}}"#,
    )
    .expect_err("positive must be a list");
    assert!(matches!(err, CatalogError::Parse { document: "lexicon", .. }));
}
