//! Reaction composition: state selection, masking, and templated text.
//!
//! Per persona, a message lands in exactly one [`ReactionState`]:
//!
//! 1. **Political**: any political term suppresses both reactions.
//! 2. **Low-signal**: too few lexicon hits for a real reaction.
//! 3. **Normal**: internal text from the sentiment sign, public text from
//!    the masked sentiment, and a contradiction verdict comparing the two.
//!
//! Choosing among equivalent phrasings goes through a [`PhraseChooser`], so
//! tests and seeded runs can pin the output text.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::blend::Blended;
use super::contradiction::{self, Rationale, Verdict};
use super::features::FeatureCounts;
use super::scores::is_low_signal;
use crate::catalog::{MaskStyle, PersonaTraits};
use crate::types::{top_key, Sentiment, Unit};

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Internal reaction under political input.
pub const POLITICAL_INTERNAL: &str =
    "Political content detected; internal reaction suppressed for safety.";
/// Public reaction under political input.
pub const POLITICAL_PUBLIC: &str = "Skipping public reaction due to political content.";
/// Internal reaction under low-signal input.
pub const LOW_SIGNAL_INTERNAL: &str = "No strong reaction; message has low signal for me.";
/// Public reaction under low-signal input.
pub const LOW_SIGNAL_PUBLIC: &str = "Neutral on this.";

/// Openers for a non-negative internal sentiment.
pub const INTERNAL_POSITIVE_OPENERS: [&str; 4] = [
    "Kinda into this,",
    "This actually works for me,",
    "Not bad,",
    "Sounds decent,",
];
/// Openers for a negative internal sentiment.
pub const INTERNAL_NEGATIVE_OPENERS: [&str; 4] = [
    "Honestly not feeling it,",
    "Eh, that's rough,",
    "I don't love this,",
    "Not thrilled,",
];

/// Public openers for a positive public score.
pub const PUBLIC_POSITIVE_OPENERS: [&str; 4] = [
    "Looks good to me!",
    "I'm down.",
    "This could work.",
    "Seems fine tbh.",
];
/// Public openers for a negative public score.
pub const PUBLIC_NEGATIVE_OPENERS: [&str; 4] =
    ["Not a fan.", "Gonna pass.", "This ain't it.", "I disagree."];
/// Public openers for a near-neutral public score.
pub const PUBLIC_NEUTRAL_OPENERS: [&str; 4] = [
    "Mixed feelings.",
    "I see both sides.",
    "Meh, depends.",
    "Neutral on this.",
];

/// Public scores at or above this use the positive openers; at or below its
/// negation, the negative ones.
pub const PUBLIC_BUCKET_THRESHOLD: f64 = 0.15;

/// Number of tone tags quoted in internal reactions.
const TONE_HINT_TAGS: usize = 2;

fn emotion_phrase(emotion: &str) -> &'static str {
    match emotion {
        "joy" => "makes me feel upbeat",
        "anger" => "low-key ticks me off",
        "fear" => "got me a bit anxious",
        "trust" => "seems reliable",
        "surprise" => "is unexpected but interesting",
        "disgust" => "feels off",
        "sadness" => "kinda bums me out",
        _ => "hits me in a mixed way",
    }
}

// ---------------------------------------------------------------------------
// Phrase choice
// ---------------------------------------------------------------------------

/// Picks one of several equivalent phrasings.
pub trait PhraseChooser: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero. Out-of-range
    /// answers fall back to the first option.
    fn choose(&self, len: usize) -> usize;
}

/// Uniformly random choice from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomChooser;

impl PhraseChooser for RandomChooser {
    fn choose(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible choice from a seeded generator.
#[derive(Debug)]
pub struct SeededChooser {
    rng: Mutex<StdRng>,
}

impl SeededChooser {
    /// Create a chooser whose sequence is fixed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl PhraseChooser for SeededChooser {
    fn choose(&self, len: usize) -> usize {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(0..len)
    }
}

/// Always the first phrasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChooser;

impl PhraseChooser for FirstChooser {
    fn choose(&self, _len: usize) -> usize {
        0
    }
}

impl<F> PhraseChooser for F
where
    F: Fn(usize) -> usize + Send + Sync,
{
    fn choose(&self, len: usize) -> usize {
        self(len)
    }
}

fn pick<'a>(chooser: &dyn PhraseChooser, options: &[&'a str]) -> &'a str {
    let index = chooser.choose(options.len());
    options
        .get(index)
        .or_else(|| options.first())
        .copied()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Masking
// ---------------------------------------------------------------------------

/// Turn private sentiment into the sentiment a persona shows in public.
///
/// - `reveal` (and unrecognised styles) pass sentiment through.
/// - `mask` attenuates toward zero by `max(0, 1 - 1.2 * strength)`. A strong
///   masker (`strength >= 0.7`) with a clearly negative feeling (`< -0.10`)
///   instead shows mild approval, `min(0.20, -0.5 * s)`.
/// - `switch` inverts, scaled by `0.5 + 0.5 * strength`.
pub fn mask(internal: Sentiment, style: &MaskStyle, strength: Unit) -> Sentiment {
    let s = internal.get();
    let k = strength.get();
    match style {
        MaskStyle::Reveal | MaskStyle::Unrecognized(_) => internal,
        MaskStyle::Mask => {
            if s < -0.10 && k >= contradiction::STRONG_MASK {
                Sentiment::new((-0.5 * s).min(0.20))
            } else {
                Sentiment::new(s * (1.0 - 1.2 * k).max(0.0))
            }
        }
        MaskStyle::Switch => Sentiment::new(-s * (0.5 + 0.5 * k)),
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Which kind of reaction a message gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionState {
    /// Political input; reactions suppressed.
    Political,
    /// Too few lexicon hits.
    LowSignal,
    /// Full reaction with masking.
    Normal,
}

impl ReactionState {
    /// Classify a message from its raw counts. Political wins over
    /// low-signal.
    pub fn classify(counts: &FeatureCounts) -> Self {
        if counts.is_political() {
            Self::Political
        } else if is_low_signal(counts) {
            Self::LowSignal
        } else {
            Self::Normal
        }
    }
}

/// A persona's reaction to one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reaction {
    /// Private reaction text.
    pub internal: String,
    /// Public reaction text.
    pub public: String,
    /// Masked sentiment; only present in the normal state.
    pub public_sentiment: Option<Sentiment>,
    /// Contradiction verdict.
    pub verdict: Verdict,
}

/// Compose the reaction of `persona` given its blended scores.
pub fn react(
    state: ReactionState,
    persona: &PersonaTraits,
    blended: &Blended,
    chooser: &dyn PhraseChooser,
) -> Reaction {
    match state {
        ReactionState::Political => Reaction {
            internal: POLITICAL_INTERNAL.to_owned(),
            public: POLITICAL_PUBLIC.to_owned(),
            public_sentiment: None,
            verdict: Verdict::skipped(Rationale::Suppressed),
        },
        ReactionState::LowSignal => Reaction {
            internal: LOW_SIGNAL_INTERNAL.to_owned(),
            public: LOW_SIGNAL_PUBLIC.to_owned(),
            public_sentiment: None,
            verdict: Verdict::skipped(Rationale::LowSignal),
        },
        ReactionState::Normal => {
            let style = &persona.contradiction_style;
            let internal = compose_internal(persona, blended, chooser);
            let public_sentiment = mask(blended.sentiment, &style.mask_style, style.mask_strength);
            let public = compose_public(public_sentiment, chooser);
            let verdict =
                contradiction::detect(blended.sentiment, public_sentiment, style.mask_strength);
            Reaction {
                internal,
                public,
                public_sentiment: Some(public_sentiment),
                verdict,
            }
        }
    }
}

/// Internal text: opener, top-emotion phrase, top-value clause, tone tags.
pub fn compose_internal(
    persona: &PersonaTraits,
    blended: &Blended,
    chooser: &dyn PhraseChooser,
) -> String {
    let openers: &[&str] = if blended.sentiment.get() >= 0.0 {
        &INTERNAL_POSITIVE_OPENERS
    } else {
        &INTERNAL_NEGATIVE_OPENERS
    };
    let opener = pick(chooser, openers);
    let phrase = top_key(&blended.emotions).map_or(emotion_phrase(""), emotion_phrase);

    let value_clause = top_key(&blended.values)
        .map(|value| format!(", mostly about {value} for me"))
        .unwrap_or_default();

    let tags: Vec<&str> = persona
        .tone_tags
        .iter()
        .take(TONE_HINT_TAGS)
        .map(String::as_str)
        .collect();
    let tone_hint = if tags.is_empty() {
        String::new()
    } else {
        format!(" ({})", tags.join(", "))
    };

    format!("{opener} {phrase}{value_clause}.{tone_hint}")
}

/// Public text from the opener bucket selected by the masked score.
pub fn compose_public(public: Sentiment, chooser: &dyn PhraseChooser) -> String {
    pick(chooser, public_openers(public)).to_owned()
}

/// Opener bucket for a public score.
pub fn public_openers(public: Sentiment) -> &'static [&'static str] {
    let s = public.get();
    if s >= PUBLIC_BUCKET_THRESHOLD {
        &PUBLIC_POSITIVE_OPENERS
    } else if s <= -PUBLIC_BUCKET_THRESHOLD {
        &PUBLIC_NEGATIVE_OPENERS
    } else {
        &PUBLIC_NEUTRAL_OPENERS
    }
}
