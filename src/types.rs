//! Bounded score types shared by the catalog and the engine.
//!
//! Every score the simulator produces or consumes lives in a fixed range:
//! emotion/value scores and persona priors in `[0, 1]` ([`Unit`]), sentiment
//! in `[-1, 1]` ([`Sentiment`]). Both newtypes clamp on construction, so an
//! out-of-range value can never escape into a result.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A float clamped into `[0, 1]`.
///
/// Deserializing clamps too, which is how persona priors from hand-edited
/// documents are normalised at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Unit(f64);

impl Unit {
    /// The zero score.
    pub const ZERO: Self = Self(0.0);
    /// The maximum score.
    pub const ONE: Self = Self(1.0);

    /// Clamp `value` into `[0, 1]`. NaN maps to zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// The raw value.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<Unit> for f64 {
    fn from(unit: Unit) -> Self {
        unit.0
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::new)
    }
}

/// Open-ended score mapping keyed by lexicon-declared names.
///
/// Ordered so serialized results are stable and ties resolve by key.
pub type ScoreMap = BTreeMap<String, Unit>;

/// Look up a score, treating a missing key as zero.
pub fn score_of(map: &ScoreMap, key: &str) -> f64 {
    map.get(key).copied().map_or(0.0, Unit::get)
}

/// Key with the highest score; ties go to the first key in order.
pub fn top_key(map: &ScoreMap) -> Option<&str> {
    let mut best: Option<(&str, Unit)> = None;
    for (key, score) in map {
        match best {
            Some((_, current)) if *score <= current => {}
            _ => best = Some((key.as_str(), *score)),
        }
    }
    best.map(|(key, _)| key)
}

/// Net affect clamped into `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Sentiment(f64);

impl Sentiment {
    /// Neutral sentiment.
    pub const NEUTRAL: Self = Self(0.0);

    /// Clamp `value` into `[-1, 1]`. NaN maps to neutral.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::NEUTRAL;
        }
        Self(value.clamp(-1.0, 1.0))
    }

    /// The raw value.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<Sentiment> for f64 {
    fn from(sentiment: Sentiment) -> Self {
        sentiment.0
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.3}", self.0)
    }
}
