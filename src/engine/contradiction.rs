//! Private/public contradiction detection.

use serde::Serialize;

use crate::types::{Sentiment, Unit};

/// Gap between private and public sentiment that counts as downplaying.
pub const DOWNPLAY_GAP: f64 = 0.35;

/// Mask strength from which a persona is considered a strong masker.
pub const STRONG_MASK: f64 = 0.7;

/// Product below which the two sentiments point in opposite directions.
const OPPOSITION_PRODUCT: f64 = -0.05;

/// Why a reaction was or was not flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rationale {
    /// Political input; no reaction was produced.
    Suppressed,
    /// Too little signal to apply masking.
    LowSignal,
    /// Public and private sentiment have opposite signs.
    Opposes,
    /// A strong masker presented a clear feeling as neutral.
    Neutralizes,
    /// Public sentiment is much weaker than private sentiment.
    Downplays,
    /// No contradiction.
    Aligns,
}

impl Rationale {
    /// Human-readable explanation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Suppressed => "",
            Self::LowSignal => "Low-signal input; masking not applied.",
            Self::Opposes => "Public tone opposes private feeling.",
            Self::Neutralizes => "Public tone neutralizes private feeling under masking.",
            Self::Downplays => "Public tone downplays private feeling.",
            Self::Aligns => "Internal and public reactions align.",
        }
    }
}

/// Outcome of contradiction detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the public reaction contradicts the private one.
    pub contradiction: bool,
    /// Explanation.
    pub rationale: Rationale,
}

impl Verdict {
    /// Verdict for states where no comparison happens.
    pub fn skipped(rationale: Rationale) -> Self {
        Self {
            contradiction: false,
            rationale,
        }
    }
}

/// Compare private sentiment `internal` with the masked `public` score.
pub fn detect(internal: Sentiment, public: Sentiment, mask_strength: Unit) -> Verdict {
    let s_i = internal.get();
    let s_p = public.get();

    let diff = (s_i - s_p).abs();
    let opposite = s_i * s_p < OPPOSITION_PRODUCT;
    let strong_mask = mask_strength.get() >= STRONG_MASK;
    let neutralized = (s_i <= -0.2 && -0.1 < s_p && s_p < 0.15)
        || (s_i >= 0.2 && -0.15 < s_p && s_p < 0.1);

    let rationale = if opposite {
        Rationale::Opposes
    } else if strong_mask && neutralized {
        Rationale::Neutralizes
    } else if diff > DOWNPLAY_GAP {
        Rationale::Downplays
    } else {
        Rationale::Aligns
    };

    Verdict {
        contradiction: rationale != Rationale::Aligns,
        rationale,
    }
}
