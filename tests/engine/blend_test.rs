//! Persona blending arithmetic.

use masquerade::catalog::Catalog;
use masquerade::engine::blend::{blend, sentiment_sign};
use masquerade::engine::SimulationEngine;
use masquerade::types::{score_of, ScoreMap, Unit};

use crate::support::LEXICON;

const BLENDER_PERSONAS: &str = r#"[
    {
        "id": "anxious",
        "name": "Anxious Ann",
        "emotional_traits": {"joy": 0.5, "fear": 1.4},
        "values_priorities": {"humor": 0.2, "community": 1.0},
        "contradiction_style": {"mask_style": "reveal", "mask_strength": 0.0}
    },
    {
        "id": "plain",
        "name": "Plain Pat",
        "emotional_traits": {},
        "contradiction_style": {"mask_style": "reveal", "mask_strength": 0.0}
    }
]"#;

/// Nine tokens: `great` (positive, joy), `bad` (negative), `lol` twice (humor).
const MESSAGE: &str = "great lol bad lol stuff things more words x";

fn engine() -> SimulationEngine {
    let catalog = Catalog::from_json(LEXICON, BLENDER_PERSONAS).expect("blender catalog");
    SimulationEngine::new(catalog)
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{what}: expected {expected}, got {actual}"
    );
}

fn scores(pairs: &[(&str, f64)]) -> ScoreMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Unit::new(*v)))
        .collect()
}

#[test]
fn emotions_mix_sixty_observed_forty_prior() {
    let engine = engine();
    let analysis = engine.analyze(MESSAGE);
    let observed_joy = score_of(&analysis.scores.emotions, "joy");
    // 1/3 from the joy hit plus 0.5 * (1 / 2.25) from the positive hit.
    assert_close(observed_joy, 1.0 / 3.0 + 0.5 / 2.25, "observed joy");

    let persona = engine.personas().get("anxious").expect("anxious persona");
    let blended = blend(&analysis.scores, persona);
    assert_close(
        score_of(&blended.emotions, "joy"),
        0.6 * observed_joy + 0.4 * 0.5,
        "blended joy",
    );
}

#[test]
fn prior_above_one_is_clamped_before_blending() {
    let engine = engine();
    let analysis = engine.analyze(MESSAGE);
    let persona = engine.personas().get("anxious").expect("anxious persona");
    assert_eq!(persona.emotional_traits["fear"], Unit::ONE);

    let blended = blend(&analysis.scores, persona);
    assert_close(score_of(&blended.emotions, "fear"), 0.4, "blended fear");
}

#[test]
fn values_scale_observed_signal_by_preference() {
    let engine = engine();
    let analysis = engine.analyze(MESSAGE);
    let raw_humor = score_of(&analysis.scores.values, "humor");
    assert_close(raw_humor, 2.0 / 3.0, "raw humor");

    let anxious = engine.personas().get("anxious").expect("anxious persona");
    let blended = blend(&analysis.scores, anxious);
    assert_close(
        score_of(&blended.values, "humor"),
        0.5 * raw_humor + 0.5 * 0.2 * raw_humor,
        "humor at priority 0.2",
    );
    // Priority 1.0 cannot conjure a value the message never signalled.
    assert_eq!(blended.values["community"], Unit::ZERO);

    let plain = engine.personas().get("plain").expect("plain persona");
    let blended = blend(&analysis.scores, plain);
    assert_close(
        score_of(&blended.values, "humor"),
        0.5 * raw_humor + 0.5 * 0.5 * raw_humor,
        "humor at default priority",
    );
}

#[test]
fn sentiment_follows_blended_emotions() {
    let engine = engine();
    let analysis = engine.analyze(MESSAGE);
    let persona = engine.personas().get("anxious").expect("anxious persona");
    let blended = blend(&analysis.scores, persona);

    let e = |name: &str| score_of(&blended.emotions, name);
    let expected = e("joy") + e("trust") - e("anger") - e("sadness") - e("disgust");
    assert_close(blended.sentiment.get(), expected, "sentiment");
    // joy 0.5333 + trust 0.0533 - anger 0.16 - sadness 0.1067
    assert_close(blended.sentiment.get(), 0.32, "sentiment value");
}

#[test]
fn sentiment_sign_is_exact_and_clamped() {
    let mixed = scores(&[
        ("joy", 0.5),
        ("trust", 0.3),
        ("anger", 0.2),
        ("sadness", 0.1),
        ("disgust", 0.05),
        ("fear", 0.9),
        ("surprise", 0.9),
    ]);
    // fear and surprise carry no sign.
    assert_close(sentiment_sign(&mixed).get(), 0.45, "mixed");

    let elated = scores(&[("joy", 1.0), ("trust", 1.0)]);
    assert_close(sentiment_sign(&elated).get(), 1.0, "elated");

    let furious = scores(&[("anger", 1.0), ("sadness", 1.0), ("disgust", 0.5)]);
    assert_close(sentiment_sign(&furious).get(), -1.0, "furious");

    assert_close(sentiment_sign(&ScoreMap::new()).get(), 0.0, "empty");
}
