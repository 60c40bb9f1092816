//! Request boundary: validation, retrieval, engine, polish.
//!
//! [`Simulator::run`] is what callers outside the engine use. It rejects
//! blank messages, fetches reference context once per message, runs the
//! engine, optionally polishes non-political results, and attaches the
//! context to every report.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, PersonaSummary};
use crate::config::Config;
use crate::engine::reaction::PhraseChooser;
use crate::engine::{PersonaResult, SimulationEngine};
use crate::polish::{Draft, LlmPolisher, Polisher};
use crate::providers::build_provider;
use crate::retrieval::{ReferenceRecord, Retriever, TfIdfRetriever};

/// Errors surfaced to callers of [`Simulator::run`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulateError {
    /// The message was empty or whitespace only.
    #[error("message required")]
    EmptyMessage,
}

/// One persona's result plus the shared reference context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionReport {
    /// Engine output (polished when a polisher ran).
    #[serde(flatten)]
    pub result: PersonaResult,
    /// Corpus records most similar to the message.
    pub retrieved_context: Vec<ReferenceRecord>,
}

/// Engine plus optional retrieval and polishing.
#[derive(Clone)]
pub struct Simulator {
    engine: SimulationEngine,
    retriever: Option<Arc<dyn Retriever>>,
    polisher: Option<Arc<dyn Polisher>>,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("engine", &self.engine)
            .field("retrieval", &self.retriever.is_some())
            .field("polish", &self.polisher.is_some())
            .finish()
    }
}

impl Simulator {
    /// Bare simulator: no retrieval, no polishing.
    pub fn new(engine: SimulationEngine) -> Self {
        Self {
            engine,
            retriever: None,
            polisher: None,
        }
    }

    /// Build everything `config` asks for.
    ///
    /// A configured corpus that does not exist disables retrieval with a
    /// warning; a malformed one is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or corpus cannot be loaded or the
    /// polish provider cannot be constructed.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let catalog = Catalog::load(&config.data.lexicons, &config.data.personas)
            .context("failed to load catalog")?;
        let mut simulator = Self::new(SimulationEngine::new(catalog));

        match (&config.data.corpus, config.retrieval.enabled) {
            (Some(path), true) if path.exists() => {
                let retriever = TfIdfRetriever::from_path(path, config.retrieval.top_k)
                    .context("failed to load reference corpus")?;
                simulator = simulator.with_retriever(Arc::new(retriever));
            }
            (Some(path), true) => {
                warn!(path = %path.display(), "reference corpus not found, retrieval disabled");
            }
            _ => {}
        }

        if config.polish.is_enabled() {
            let polish = &config.polish;
            let provider = build_provider(
                &polish.model,
                polish.base_url.as_deref(),
                polish.api_key.as_deref(),
            )
            .with_context(|| format!("failed to set up polish model '{}'", polish.model))?;
            info!(model = %polish.model, "reaction polishing enabled");
            simulator = simulator.with_polisher(Arc::new(LlmPolisher::new(provider).with_config(polish)));
        }

        Ok(simulator)
    }

    /// Attach a reference retriever.
    #[must_use]
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Attach a polisher.
    #[must_use]
    pub fn with_polisher(mut self, polisher: Arc<dyn Polisher>) -> Self {
        self.polisher = Some(polisher);
        self
    }

    /// Replace the engine's phrase chooser.
    #[must_use]
    pub fn with_chooser(mut self, chooser: Arc<dyn PhraseChooser>) -> Self {
        self.engine = self.engine.with_chooser(chooser);
        self
    }

    /// The underlying engine.
    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// Whether reference context will be attached.
    pub fn has_retriever(&self) -> bool {
        self.retriever.is_some()
    }

    /// Whether results will be polished.
    pub fn has_polisher(&self) -> bool {
        self.polisher.is_some()
    }

    /// `{id, name}` of every persona in load order.
    pub fn list_personas(&self) -> Vec<PersonaSummary> {
        self.engine.list_personas()
    }

    /// Simulate reactions to `message` for the selected personas.
    ///
    /// # Errors
    ///
    /// Returns [`SimulateError::EmptyMessage`] for a blank message.
    pub async fn run(
        &self,
        message: &str,
        persona_ids: Option<&[String]>,
    ) -> Result<Vec<ReactionReport>, SimulateError> {
        if message.trim().is_empty() {
            return Err(SimulateError::EmptyMessage);
        }

        let context = self
            .retriever
            .as_ref()
            .map(|r| r.retrieve(message))
            .unwrap_or_default();

        let selected: Option<HashSet<String>> =
            persona_ids.map(|ids| ids.iter().cloned().collect());
        let mut results = self.engine.simulate(message, selected.as_ref());

        if let Some(polisher) = &self.polisher {
            for result in results.iter_mut().filter(|r| !r.political_input) {
                let draft = Draft {
                    internal: std::mem::take(&mut result.internal_reaction),
                    public: std::mem::take(&mut result.public_reaction),
                };
                let polished = polisher.polish(&result.persona_name, draft, message).await;
                result.internal_reaction = polished.internal;
                result.public_reaction = polished.public;
            }
        }

        Ok(results
            .into_iter()
            .map(|result| ReactionReport {
                result,
                retrieved_context: context.clone(),
            })
            .collect())
    }
}
