//! Masquerade CLI entry point.
//!
//! Provides `personas`, `simulate`, and `check` subcommands for listing the
//! persona catalog, simulating reactions to a message, or validating the
//! configured documents.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use masquerade::catalog::Catalog;
use masquerade::config::Config;
use masquerade::engine::reaction::SeededChooser;
use masquerade::logging;
use masquerade::retrieval::TfIdfRetriever;
use masquerade::simulator::Simulator;

/// Masquerade: simulate how personas feel about a message and what they say.
#[derive(Parser)]
#[command(name = "masquerade", version, about)]
struct Cli {
    /// Config file (default: `$MASQUERADE_CONFIG_PATH` or `./masquerade.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs to this directory (daily rotation).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// List personas in load order.
    Personas {
        /// Print JSON instead of `id<TAB>name` lines.
        #[arg(long)]
        json: bool,
    },
    /// Simulate persona reactions to a message and print them as JSON.
    Simulate {
        /// Message to react to.
        message: String,
        /// Restrict to these persona ids (repeatable).
        #[arg(short = 'p', long = "persona")]
        personas: Vec<String>,
        /// Seed phrase choice for reproducible output.
        #[arg(long)]
        seed: Option<u64>,
        /// Skip LLM polishing even if configured.
        #[arg(long)]
        no_polish: bool,
        /// Skip reference retrieval.
        #[arg(long)]
        no_context: bool,
    },
    /// Load and validate every configured document.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let _logging_guard = match &cli.log_dir {
        Some(dir) => Some(logging::init_production(dir, &config.logging.level)?),
        None => {
            logging::init_cli(&config.logging.level);
            None
        }
    };
    debug!(?config, "configuration resolved");

    match cli.command {
        Command::Personas { json } => handle_personas(&config, json),
        Command::Simulate {
            message,
            personas,
            seed,
            no_polish,
            no_context,
        } => {
            if no_polish {
                config.polish.enabled = Some(false);
            }
            if no_context {
                config.retrieval.enabled = false;
            }
            handle_simulate(&config, &message, &personas, seed).await
        }
        Command::Check => handle_check(&config),
    }
}

/// Print the persona catalog.
fn handle_personas(config: &Config, json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.data.lexicons, &config.data.personas)?;
    let summaries = catalog.personas.summaries();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for persona in summaries {
            println!("{}\t{}", persona.id, persona.name);
        }
    }
    Ok(())
}

/// Run one simulation and print the reports.
async fn handle_simulate(
    config: &Config,
    message: &str,
    personas: &[String],
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut simulator = Simulator::from_config(config)?;
    if let Some(seed) = seed {
        simulator = simulator.with_chooser(Arc::new(SeededChooser::new(seed)));
    }

    let selection = (!personas.is_empty()).then_some(personas);
    let reports = simulator.run(message, selection).await?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

/// Validate documents and print a summary.
fn handle_check(config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.data.lexicons, &config.data.personas)?;
    let lexicon = &catalog.lexicon;
    println!(
        "lexicon:  {} ({} emotions, {} tones, {} political terms)",
        config.data.lexicons.display(),
        lexicon.emotions().len(),
        lexicon.tones().len(),
        lexicon.political().len()
    );
    println!(
        "personas: {} ({} loaded)",
        config.data.personas.display(),
        catalog.personas.len()
    );

    match &config.data.corpus {
        Some(path) if path.exists() => {
            let retriever = TfIdfRetriever::from_path(path, config.retrieval.top_k)?;
            println!(
                "corpus:   {} ({} records, {} terms)",
                path.display(),
                retriever.len(),
                retriever.vocabulary_len()
            );
        }
        Some(path) => println!("corpus:   {} (missing, retrieval off)", path.display()),
        None => println!("corpus:   none"),
    }

    if config.polish.is_enabled() {
        println!("polish:   {}", config.polish.model);
    } else {
        println!("polish:   off");
    }
    println!("ok");
    Ok(())
}
