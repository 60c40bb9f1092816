//! Masquerade: a persona reaction simulator.
//!
//! Given a short message, each persona produces an internal (private)
//! reaction, a public reaction shaped by its masking style, and a flag saying
//! whether the two disagree. Scoring is lexicon-driven and deterministic;
//! only phrase choice is random, and that goes through an injectable chooser.
//!
//! Optional layers around the engine: TF-IDF reference retrieval over a tone
//! corpus, and LLM polishing of the templated text.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod logging;
pub mod polish;
pub mod providers;
pub mod retrieval;
pub mod simulator;
pub mod types;
