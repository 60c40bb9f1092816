//! Configuration loading and validation.
//!
//! Masquerade reads one TOML file. Precedence: env vars > config file >
//! defaults.
//!
//! File path resolution: `--config`, then `$MASQUERADE_CONFIG_PATH`, then
//! `./masquerade.toml` if present, then `~/.masquerade/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::providers::parse_provider_string;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "MASQUERADE_CONFIG_PATH";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "masquerade.toml";

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data document locations (`[data]`).
    pub data: DataConfig,
    /// Reference retrieval (`[retrieval]`).
    pub retrieval: RetrievalConfig,
    /// LLM polishing (`[polish]`).
    pub polish: PolishConfig,
    /// Log output (`[logging]`).
    pub logging: LoggingConfig,
}

/// A resolved config file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    /// File to read.
    pub path: PathBuf,
    /// Whether a missing file is an error (named explicitly by the user).
    pub required: bool,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if an
    /// explicitly named file is missing, or if validation fails.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Load using a custom env resolver (for testing).
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let location = Self::config_path_with(explicit, &env);
        let mut config = Self::load_from_file(&location)?;
        config.apply_overrides(&env);
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(location: &ConfigPath) -> Result<Self> {
        let path = &location.path;
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("invalid config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !location.required => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Resolve the config file location using a custom env resolver.
    pub fn config_path_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> ConfigPath {
        if let Some(path) = explicit {
            return ConfigPath {
                path: path.to_path_buf(),
                required: true,
            };
        }
        if let Some(path) = env(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            return ConfigPath {
                path: PathBuf::from(path),
                required: true,
            };
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        let path = if local.exists() {
            local
        } else {
            config_dir().map_or(local, |dir| dir.join("config.toml"))
        };
        ConfigPath {
            path,
            required: false,
        }
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids unsafe `set_var` in tests).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // Data.
        if let Some(v) = env("MASQUERADE_LEXICONS") {
            self.data.lexicons = PathBuf::from(v);
        }
        if let Some(v) = env("MASQUERADE_PERSONAS") {
            self.data.personas = PathBuf::from(v);
        }
        if let Some(v) = env("MASQUERADE_CORPUS") {
            self.data.corpus = (!v.trim().is_empty()).then(|| PathBuf::from(v));
        }

        // Retrieval.
        if let Some(v) = env("MASQUERADE_TOP_K") {
            match v.trim().parse() {
                Ok(n) => self.retrieval.top_k = n,
                Err(_) => tracing::warn!(
                    var = "MASQUERADE_TOP_K",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        // Polish (key presence enables it unless the file said otherwise).
        if let Some(v) = env("MASQUERADE_POLISH_MODEL") {
            self.polish.model = v;
        }
        if let Some(key) = env(&self.polish.api_key_env).filter(|k| !k.trim().is_empty()) {
            self.polish.api_key = Some(key);
        }

        // Logging.
        if let Some(v) = env("MASQUERADE_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be at least 1");
        }
        parse_provider_string(&self.polish.model)
            .with_context(|| format!("invalid polish.model '{}'", self.polish.model))?;
        if !(0.0..=2.0).contains(&self.polish.temperature) {
            anyhow::bail!(
                "polish.temperature must be within [0, 2], got {}",
                self.polish.temperature
            );
        }
        if self.polish.timeout_secs == 0 {
            anyhow::bail!("polish.timeout_secs must be positive");
        }
        Ok(())
    }

    /// Parse a TOML string into config (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrongly typed fields.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

/// Resolve the per-user config directory (`~/.masquerade/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".masquerade"))
}

// ── Data ────────────────────────────────────────────────────────

/// Locations of the lexicon, persona, and corpus documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Lexicon JSON document.
    pub lexicons: PathBuf,
    /// Persona JSON document.
    pub personas: PathBuf,
    /// Reference corpus CSV; retrieval is off when unset.
    pub corpus: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            lexicons: PathBuf::from("data/lexicons.json"),
            personas: PathBuf::from("data/personas.json"),
            corpus: Some(PathBuf::from("data/genz_tone_mini.csv")),
        }
    }
}

// ── Retrieval ───────────────────────────────────────────────────

/// Reference retrieval settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Attach reference context to reports.
    pub enabled: bool,
    /// Number of records returned per message.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 3,
        }
    }
}

// ── Polish ──────────────────────────────────────────────────────

/// LLM polishing settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct PolishConfig {
    /// Explicit switch; when unset, polishing follows API key presence.
    pub enabled: Option<bool>,
    /// Model spec, `<provider>/<model>`.
    pub model: String,
    /// Provider base URL override.
    pub base_url: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Completion token limit.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// API key resolved from `api_key_env`; never read from the file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl PolishConfig {
    /// Whether polishing should run.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(self.api_key.is_some())
    }
}

impl Default for PolishConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            model: "openai/gpt-4o-mini".to_owned(),
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_owned(),
            timeout_secs: 20,
            max_tokens: 200,
            temperature: 0.4,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for PolishConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolishConfig")
            .field("enabled", &self.enabled)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key_env", &self.api_key_env)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Logging ─────────────────────────────────────────────────────

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}
