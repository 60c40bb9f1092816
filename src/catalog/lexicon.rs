//! Keyword lexicon: category name to trigger words and phrases.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::Deserialize;

use super::CatalogError;

/// Emotions the score composer always emits, whether or not the lexicon
/// declares trigger words for them. Persona priors may name these freely.
pub const CORE_EMOTIONS: [&str; 5] = ["anger", "disgust", "joy", "sadness", "trust"];

/// Raw document shape, before normalisation.
#[derive(Debug, Deserialize)]
struct LexiconDocument {
    positive: Vec<String>,
    negative: Vec<String>,
    #[serde(default)]
    political: Vec<String>,
    emotions: BTreeMap<String, Vec<String>>,
    tones: BTreeMap<String, Vec<String>>,
}

/// A compiled multi-token entry.
#[derive(Debug, Clone)]
struct Phrase {
    text: String,
    pattern: Regex,
}

/// The trigger entries of one category.
///
/// Entries without whitespace are looked up in the token multiset, so one
/// the tokenizer would split (`low-key`, `w/e`) never matches. Entries with
/// whitespace are matched as whole-word-bounded patterns over the
/// lower-cased text.
#[derive(Debug, Clone, Default)]
pub struct TermSet {
    words: BTreeSet<String>,
    phrases: Vec<Phrase>,
}

impl TermSet {
    /// Normalise and compile the entries of `category`.
    ///
    /// Entries are trimmed and lower-cased; duplicates collapse.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::BlankTerm`] for an empty entry and
    /// [`CatalogError::Phrase`] if a phrase fails to compile.
    pub fn new<I, S>(category: &str, entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = BTreeSet::new();
        let mut phrase_texts = BTreeSet::new();

        for entry in entries {
            let normalised = entry.as_ref().trim().to_lowercase();
            if normalised.is_empty() {
                return Err(CatalogError::BlankTerm {
                    category: category.to_owned(),
                });
            }
            if !normalised.contains(char::is_whitespace) {
                words.insert(normalised);
            } else {
                phrase_texts.insert(normalised);
            }
        }

        let phrases = phrase_texts
            .into_iter()
            .map(|text| {
                let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&text)))
                    .map_err(|source| CatalogError::Phrase {
                        phrase: text.clone(),
                        source,
                    })?;
                Ok(Phrase { text, pattern })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Self { words, phrases })
    }

    /// Single-token entries.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Compiled phrase matchers.
    pub fn phrase_patterns(&self) -> impl Iterator<Item = &Regex> {
        self.phrases.iter().map(|p| &p.pattern)
    }

    /// Whether `entry` (already normalised) is part of this set.
    pub fn contains(&self, entry: &str) -> bool {
        self.words.contains(entry) || self.phrases.iter().any(|p| p.text == entry)
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.words.len().saturating_add(self.phrases.len())
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.phrases.is_empty()
    }
}

/// Validated lexicon.
///
/// Emotion and tone names are the vocabulary that persona documents are
/// checked against. A category declared with no entries still counts as
/// declared; it simply never produces hits.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    positive: TermSet,
    negative: TermSet,
    political: TermSet,
    emotions: BTreeMap<String, TermSet>,
    tones: BTreeMap<String, TermSet>,
}

impl Lexicon {
    /// Parse and validate a lexicon document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] when the JSON does not have the
    /// required `positive`, `negative`, `emotions`, and `tones` keys, and the
    /// [`TermSet::new`] errors for bad entries.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: LexiconDocument =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                document: "lexicon",
                source,
            })?;

        Ok(Self {
            positive: TermSet::new("positive", &doc.positive)?,
            negative: TermSet::new("negative", &doc.negative)?,
            political: TermSet::new("political", &doc.political)?,
            emotions: build_group("emotions", doc.emotions)?,
            tones: build_group("tones", doc.tones)?,
        })
    }

    /// Positive sentiment triggers.
    pub fn positive(&self) -> &TermSet {
        &self.positive
    }

    /// Negative sentiment triggers.
    pub fn negative(&self) -> &TermSet {
        &self.negative
    }

    /// Political triggers. Any hit suppresses reactions.
    pub fn political(&self) -> &TermSet {
        &self.political
    }

    /// Per-emotion triggers.
    pub fn emotions(&self) -> &BTreeMap<String, TermSet> {
        &self.emotions
    }

    /// Per-tone triggers. Tones double as the value dimensions.
    pub fn tones(&self) -> &BTreeMap<String, TermSet> {
        &self.tones
    }

    /// Whether `name` is a declared emotion or one of [`CORE_EMOTIONS`].
    pub fn knows_emotion(&self, name: &str) -> bool {
        self.emotions.contains_key(name) || CORE_EMOTIONS.contains(&name)
    }

    /// Whether `name` is a declared tone.
    pub fn knows_tone(&self, name: &str) -> bool {
        self.tones.contains_key(name)
    }
}

fn build_group(
    group: &'static str,
    raw: BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, TermSet>, CatalogError> {
    raw.into_iter()
        .map(|(name, entries)| {
            let name = name.trim().to_lowercase();
            if name.is_empty() {
                return Err(CatalogError::BlankCategory { group });
            }
            let set = TermSet::new(&name, &entries)?;
            Ok((name, set))
        })
        .collect()
}
