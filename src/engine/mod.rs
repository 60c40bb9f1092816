//! Persona reaction engine.
//!
//! Pipeline per message:
//! [`features::extract`] → [`scores::compose`] → per persona
//! [`blend::blend`] → [`reaction::react`] (which runs
//! [`contradiction::detect`] in the normal state).
//!
//! The engine is immutable after construction and shares its catalog behind
//! `Arc`, so one instance can serve any number of concurrent callers.

pub mod blend;
pub mod contradiction;
pub mod features;
pub mod reaction;
pub mod scores;

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, Lexicon, PersonaStore, PersonaSummary, PersonaTraits};
use crate::types::{ScoreMap, Sentiment};

use self::features::FeatureCounts;
use self::reaction::{PhraseChooser, RandomChooser, ReactionState};
use self::scores::ScoreSet;

/// Result of simulating one persona's reaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaResult {
    /// Persona id.
    pub persona_id: String,
    /// Persona display name.
    pub persona_name: String,
    /// Blended emotion scores.
    pub emotion_scores: ScoreMap,
    /// Blended value scores.
    pub values: ScoreMap,
    /// Private reaction.
    pub internal_reaction: String,
    /// Public reaction.
    pub public_reaction: String,
    /// Whether the public reaction contradicts the private one.
    pub contradiction_flag: bool,
    /// Why the contradiction flag was set or not.
    pub contradiction_why: String,
    /// Whether the message tripped the political lexicon.
    pub political_input: bool,
    /// Private sentiment sign.
    pub internal_sentiment: Sentiment,
    /// Masked public sentiment; absent when no masking was applied.
    pub public_sentiment: Option<Sentiment>,
}

/// Persona-independent analysis of one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageAnalysis {
    /// Raw lexicon hits.
    pub counts: FeatureCounts,
    /// Normalised scores.
    pub scores: ScoreSet,
    /// Reaction state every persona will be in.
    pub state: ReactionState,
}

/// Simulation engine over a fixed catalog.
#[derive(Clone)]
pub struct SimulationEngine {
    lexicon: Arc<Lexicon>,
    personas: Arc<PersonaStore>,
    chooser: Arc<dyn PhraseChooser>,
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("personas", &self.personas.len())
            .field("emotions", &self.lexicon.emotions().len())
            .field("tones", &self.lexicon.tones().len())
            .finish_non_exhaustive()
    }
}

impl SimulationEngine {
    /// Create an engine with uniformly random phrase choice.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            lexicon: catalog.lexicon,
            personas: catalog.personas,
            chooser: Arc::new(RandomChooser),
        }
    }

    /// Replace the phrase chooser.
    #[must_use]
    pub fn with_chooser(mut self, chooser: Arc<dyn PhraseChooser>) -> Self {
        self.chooser = chooser;
        self
    }

    /// The lexicon in use.
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// The personas in use.
    pub fn personas(&self) -> &PersonaStore {
        &self.personas
    }

    /// `{id, name}` of every persona in load order.
    pub fn list_personas(&self) -> Vec<PersonaSummary> {
        self.personas.summaries()
    }

    /// Extract, score, and classify `message`. Deterministic.
    pub fn analyze(&self, message: &str) -> MessageAnalysis {
        let counts = features::extract(message, &self.lexicon);
        let scores = scores::compose(&counts);
        let state = ReactionState::classify(&counts);
        MessageAnalysis {
            counts,
            scores,
            state,
        }
    }

    /// Simulate every selected persona's reaction to `message`.
    ///
    /// With `persona_ids` absent all personas react; otherwise only those
    /// whose id is in the set, still in load order. Unknown ids are ignored.
    pub fn simulate(
        &self,
        message: &str,
        persona_ids: Option<&HashSet<String>>,
    ) -> Vec<PersonaResult> {
        let analysis = self.analyze(message);

        let results: Vec<PersonaResult> = self
            .personas
            .select(persona_ids)
            .map(|persona| self.react(&analysis, persona))
            .collect();

        if let Some(ids) = persona_ids {
            let unknown = ids
                .iter()
                .filter(|id| self.personas.get(id).is_none())
                .count();
            if unknown > 0 {
                debug!(unknown, "ignoring unknown persona ids");
            }
        }

        debug!(
            tokens = analysis.counts.token_length,
            signal = analysis.counts.signal(),
            state = ?analysis.state,
            personas = results.len(),
            "simulation complete"
        );

        results
    }

    /// React to an analysed message as `persona`.
    pub fn react(&self, analysis: &MessageAnalysis, persona: &PersonaTraits) -> PersonaResult {
        let blended = blend::blend(&analysis.scores, persona);
        let reaction = reaction::react(analysis.state, persona, &blended, self.chooser.as_ref());

        PersonaResult {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            emotion_scores: blended.emotions,
            values: blended.values,
            internal_reaction: reaction.internal,
            public_reaction: reaction.public,
            contradiction_flag: reaction.verdict.contradiction,
            contradiction_why: reaction.verdict.rationale.as_str().to_owned(),
            political_input: analysis.counts.is_political(),
            internal_sentiment: blended.sentiment,
            public_sentiment: reaction.public_sentiment,
        }
    }
}
