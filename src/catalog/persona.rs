//! Persona records: emotional priors, value priorities, and masking policy.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CatalogError, Lexicon};
use crate::types::{ScoreMap, Unit};

/// Priority assumed for a value the persona does not list.
pub const DEFAULT_VALUE_PRIORITY: f64 = 0.5;

/// How a persona turns private sentiment into public sentiment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum MaskStyle {
    /// Public sentiment equals private sentiment.
    Reveal,
    /// Public sentiment is attenuated toward neutral; strong maskers flip
    /// negative feelings into mild approval.
    Mask,
    /// Public sentiment is inverted.
    Switch,
    /// Any other style name. Behaves like [`MaskStyle::Reveal`].
    Unrecognized(String),
}

impl MaskStyle {
    /// Parse a style name. Matching is case-insensitive.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "reveal" => Self::Reveal,
            "mask" => Self::Mask,
            "switch" => Self::Switch,
            _ => Self::Unrecognized(name.to_owned()),
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reveal => "reveal",
            Self::Mask => "mask",
            Self::Switch => "switch",
            Self::Unrecognized(name) => name,
        }
    }
}

impl From<String> for MaskStyle {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl fmt::Display for MaskStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Masking configuration of a persona.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContradictionStyle {
    /// Transform applied to private sentiment.
    pub mask_style: MaskStyle,
    /// How strongly the transform applies, in `[0, 1]`.
    pub mask_strength: Unit,
}

/// A simulated reactor.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaTraits {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Emotional disposition, clamped into `[0, 1]` at load.
    pub emotional_traits: ScoreMap,
    /// Weight given to each value (tone) dimension.
    #[serde(default)]
    pub values_priorities: ScoreMap,
    /// Style hints appended to internal reactions; the first two are used.
    #[serde(default)]
    pub tone_tags: Vec<String>,
    /// Masking policy.
    pub contradiction_style: ContradictionStyle,
}

impl PersonaTraits {
    /// Priority for `value`, or [`DEFAULT_VALUE_PRIORITY`] when unlisted.
    pub fn value_priority(&self, value: &str) -> f64 {
        self.values_priorities
            .get(value)
            .copied()
            .map_or(DEFAULT_VALUE_PRIORITY, Unit::get)
    }

    /// The persona's id and name.
    pub fn summary(&self) -> PersonaSummary {
        PersonaSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Public listing entry for a persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaSummary {
    /// Persona id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Validated personas in document order.
#[derive(Debug, Clone, Default)]
pub struct PersonaStore {
    personas: Vec<PersonaTraits>,
}

impl PersonaStore {
    /// Parse a JSON array of persona records and validate it against
    /// `lexicon`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and the errors of
    /// [`PersonaStore::new`] for invalid records.
    pub fn from_json(json: &str, lexicon: &Lexicon) -> Result<Self, CatalogError> {
        let personas: Vec<PersonaTraits> =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                document: "personas",
                source,
            })?;
        Self::new(personas, lexicon)
    }

    /// Validate already-parsed records.
    ///
    /// # Errors
    ///
    /// Returns an error for blank ids or names, duplicate ids, and priors or
    /// priorities that name emotions or tones the lexicon does not declare.
    pub fn new(personas: Vec<PersonaTraits>, lexicon: &Lexicon) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();

        for (index, persona) in personas.iter().enumerate() {
            if persona.id.trim().is_empty() {
                return Err(CatalogError::BlankField { index, field: "id" });
            }
            if persona.name.trim().is_empty() {
                return Err(CatalogError::BlankField {
                    index,
                    field: "name",
                });
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(CatalogError::DuplicatePersona {
                    id: persona.id.clone(),
                });
            }
            if let Some(emotion) = persona
                .emotional_traits
                .keys()
                .find(|k| !lexicon.knows_emotion(k))
            {
                return Err(CatalogError::UnknownEmotion {
                    persona: persona.id.clone(),
                    emotion: emotion.clone(),
                });
            }
            if let Some(value) = persona
                .values_priorities
                .keys()
                .find(|k| !lexicon.knows_tone(k))
            {
                return Err(CatalogError::UnknownValue {
                    persona: persona.id.clone(),
                    value: value.clone(),
                });
            }
            if let MaskStyle::Unrecognized(style) = &persona.contradiction_style.mask_style {
                warn!(
                    persona = %persona.id,
                    style = %style,
                    "unrecognised mask style, treating as reveal"
                );
            }
        }

        Ok(Self { personas })
    }

    /// Iterate personas in load order.
    pub fn iter(&self) -> impl Iterator<Item = &PersonaTraits> {
        self.personas.iter()
    }

    /// Look up a persona by id.
    pub fn get(&self, id: &str) -> Option<&PersonaTraits> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Personas whose id is in `ids`, or all of them when `ids` is `None`.
    /// Load order is preserved; unknown ids are ignored.
    pub fn select<'a>(
        &'a self,
        ids: Option<&'a HashSet<String>>,
    ) -> impl Iterator<Item = &'a PersonaTraits> + 'a {
        self.personas
            .iter()
            .filter(move |p| ids.map_or(true, |wanted| wanted.contains(&p.id)))
    }

    /// `{id, name}` for every persona in load order.
    pub fn summaries(&self) -> Vec<PersonaSummary> {
        self.personas.iter().map(PersonaTraits::summary).collect()
    }

    /// Number of personas.
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether no personas were loaded.
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
