//! Length-normalised message scores.

use std::collections::BTreeMap;

use serde::Serialize;

use super::features::FeatureCounts;
use crate::types::{ScoreMap, Unit};

/// Floor on the effective message length.
pub const MIN_EFFECTIVE_LENGTH: usize = 8;

/// Messages with fewer total hits than this get a neutral reaction.
pub const LOW_SIGNAL_THRESHOLD: u32 = 2;

/// Message-level scores, before persona blending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreSet {
    /// Emotion scores, including the coupled core emotions.
    pub emotions: ScoreMap,
    /// Value scores, one per lexicon tone.
    pub values: ScoreMap,
}

/// Convert hit counts into scores.
///
/// Emotions and tones are normalised by a third of the effective length,
/// positive/negative by a quarter. Positive and negative hits then feed into
/// joy, sadness, anger, and trust.
pub fn compose(counts: &FeatureCounts) -> ScoreSet {
    let length = effective_length(counts.token_length);
    let third = length / 3.0;
    let quarter = length / 4.0;

    let mut raw: BTreeMap<String, f64> = counts
        .emotions
        .iter()
        .map(|(name, n)| (name.clone(), normalize(*n, third)))
        .collect();

    let pos = normalize(counts.positive, quarter);
    let neg = normalize(counts.negative, quarter);

    couple(&mut raw, "joy", 0.5 * pos);
    couple(&mut raw, "sadness", 0.4 * neg);
    couple(&mut raw, "anger", 0.6 * neg);
    couple(&mut raw, "trust", 0.3 * pos - 0.1 * neg);

    let emotions = raw
        .into_iter()
        .map(|(name, score)| (name, Unit::new(score)))
        .collect();

    let values = counts
        .tones
        .iter()
        .map(|(name, n)| (name.clone(), Unit::new(normalize(*n, third))))
        .collect();

    ScoreSet { emotions, values }
}

/// Whether the message carries too few hits to react to.
pub fn is_low_signal(counts: &FeatureCounts) -> bool {
    counts.signal() < LOW_SIGNAL_THRESHOLD
}

fn effective_length(token_length: usize) -> f64 {
    let length = token_length.max(MIN_EFFECTIVE_LENGTH);
    f64::from(u32::try_from(length).unwrap_or(u32::MAX))
}

fn normalize(count: u32, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    (f64::from(count) / denominator).min(1.0)
}

fn couple(raw: &mut BTreeMap<String, f64>, emotion: &str, delta: f64) {
    let slot = raw.entry(emotion.to_owned()).or_insert(0.0);
    *slot = (*slot + delta).min(1.0);
}
