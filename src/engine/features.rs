//! Lexical feature extraction.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::catalog::{Lexicon, TermSet};

/// Raw lexicon hit counts for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureCounts {
    /// Number of tokens in the message.
    pub token_length: usize,
    /// Positive-sentiment hits.
    pub positive: u32,
    /// Negative-sentiment hits.
    pub negative: u32,
    /// Political hits.
    pub political: u32,
    /// Hits per declared emotion.
    pub emotions: BTreeMap<String, u32>,
    /// Hits per declared tone.
    pub tones: BTreeMap<String, u32>,
}

impl FeatureCounts {
    /// Total hits across every category.
    pub fn signal(&self) -> u32 {
        self.emotions
            .values()
            .chain(self.tones.values())
            .fold(
                self.positive
                    .saturating_add(self.negative)
                    .saturating_add(self.political),
                |acc, n| acc.saturating_add(*n),
            )
    }

    /// Whether any political term was found.
    pub fn is_political(&self) -> bool {
        self.political > 0
    }
}

/// Lower-case `text` and split it into maximal runs of ASCII letters and
/// apostrophes.
pub fn tokenize(text: &str) -> Vec<String> {
    tokens_of(&text.to_lowercase())
        .map(str::to_owned)
        .collect()
}

fn tokens_of(lowered: &str) -> impl Iterator<Item = &str> {
    lowered
        .split(|c: char| !(c.is_ascii_lowercase() || c == '\''))
        .filter(|t| !t.is_empty())
}

/// Count lexicon hits in `text`.
pub fn extract(text: &str, lexicon: &Lexicon) -> FeatureCounts {
    let lowered = text.to_lowercase();

    let mut bag: HashMap<&str, u32> = HashMap::new();
    let mut token_length: usize = 0;
    for token in tokens_of(&lowered) {
        let slot = bag.entry(token).or_insert(0);
        *slot = slot.saturating_add(1);
        token_length = token_length.saturating_add(1);
    }

    let count = |set: &TermSet| count_in(set, &bag, &lowered);

    FeatureCounts {
        token_length,
        positive: count(lexicon.positive()),
        negative: count(lexicon.negative()),
        political: count(lexicon.political()),
        emotions: lexicon
            .emotions()
            .iter()
            .map(|(name, set)| (name.clone(), count(set)))
            .collect(),
        tones: lexicon
            .tones()
            .iter()
            .map(|(name, set)| (name.clone(), count(set)))
            .collect(),
    }
}

fn count_in(set: &TermSet, bag: &HashMap<&str, u32>, lowered: &str) -> u32 {
    let word_hits = set
        .words()
        .filter_map(|w| bag.get(w))
        .fold(0_u32, |acc, n| acc.saturating_add(*n));

    set.phrase_patterns().fold(word_hits, |acc, pattern| {
        let hits = u32::try_from(pattern.find_iter(lowered).count()).unwrap_or(u32::MAX);
        acc.saturating_add(hits)
    })
}
