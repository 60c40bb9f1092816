//! Persona-specific blending of message scores.

use std::collections::BTreeSet;

use serde::Serialize;

use super::scores::ScoreSet;
use crate::catalog::PersonaTraits;
use crate::types::{score_of, ScoreMap, Sentiment, Unit};

/// Weight of the observed message score; the persona prior gets the rest.
pub const OBSERVED_WEIGHT: f64 = 0.6;

/// Emotions that push sentiment up.
const POSITIVE_EMOTIONS: [&str; 2] = ["joy", "trust"];
/// Emotions that push sentiment down.
const NEGATIVE_EMOTIONS: [&str; 3] = ["anger", "sadness", "disgust"];

/// Scores of one message as seen by one persona.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blended {
    /// Prior-blended emotions.
    pub emotions: ScoreMap,
    /// Preference-weighted values.
    pub values: ScoreMap,
    /// Net affect of the blended emotions.
    pub sentiment: Sentiment,
}

/// Blend message scores with a persona's priors.
///
/// Emotions mix observation and prior, so a persona can feel something the
/// message never mentioned. Values only rescale what the message actually
/// signalled: zero stays zero whatever the preference.
pub fn blend(scores: &ScoreSet, persona: &PersonaTraits) -> Blended {
    let keys: BTreeSet<&String> = scores
        .emotions
        .keys()
        .chain(persona.emotional_traits.keys())
        .collect();

    let emotions: ScoreMap = keys
        .into_iter()
        .map(|key| {
            let observed = score_of(&scores.emotions, key);
            let prior = score_of(&persona.emotional_traits, key);
            let mixed = OBSERVED_WEIGHT * observed + (1.0 - OBSERVED_WEIGHT) * prior;
            (key.clone(), Unit::new(mixed))
        })
        .collect();

    let values: ScoreMap = scores
        .values
        .iter()
        .map(|(key, raw)| {
            let raw = raw.get();
            let preference = persona.value_priority(key);
            (key.clone(), Unit::new(0.5 * raw + 0.5 * preference * raw))
        })
        .collect();

    let sentiment = sentiment_sign(&emotions);

    Blended {
        emotions,
        values,
        sentiment,
    }
}

/// `joy + trust - anger - sadness - disgust`, clamped into `[-1, 1]`.
pub fn sentiment_sign(emotions: &ScoreMap) -> Sentiment {
    let up: f64 = POSITIVE_EMOTIONS.iter().map(|e| score_of(emotions, e)).sum();
    let down: f64 = NEGATIVE_EMOTIONS.iter().map(|e| score_of(emotions, e)).sum();
    Sentiment::new(up - down)
}
