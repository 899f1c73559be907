//! Configuration loading and typed config structures for the evacuation
//! simulation.
//!
//! The canonical configuration lives in `evac-config.yaml` at the project
//! root. Every field has a named default, so partial and empty documents
//! parse to a usable configuration.

use std::path::Path;

use evac_world::city_gen::MIN_NODES;
use serde::Deserialize;

/// Environment variable that overrides `scenario.seed`.
pub const SEED_ENV_VAR: &str = "EVAC_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The document parsed but a value is out of range.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// What was wrong.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `evac-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// City size and scenario seed.
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Observation noise.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Random-event chances applied during path evaluation.
    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `EVAC_SEED`, when set, overrides `scenario.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply the environment
    /// override, and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_seed_override(std::env::var(SEED_ENV_VAR).ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Replace `scenario.seed` with `value` when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `value` is not an unsigned integer.
    pub fn apply_seed_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = value else {
            return Ok(());
        };
        self.scenario.seed = raw.trim().parse().map_err(|err| ConfigError::Invalid {
            message: format!("{SEED_ENV_VAR}={raw:?} is not a valid seed: {err}"),
        })?;
        Ok(())
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scenario.n_nodes < MIN_NODES {
            return Err(invalid(format!(
                "scenario.n_nodes must be at least {MIN_NODES}, got {}",
                self.scenario.n_nodes
            )));
        }
        if !self.proxy.noise_level.is_finite() || self.proxy.noise_level < 0.0 {
            return Err(invalid(format!(
                "proxy.noise_level must be finite and non-negative, got {}",
                self.proxy.noise_level
            )));
        }
        self.evaluator.validate()
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid { message }
}

/// Scenario-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioConfig {
    /// Number of intersections in the generated city.
    #[serde(default = "default_n_nodes")]
    pub n_nodes: usize,

    /// Scenario seed; every component stream is derived from it.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            n_nodes: default_n_nodes(),
            seed: default_seed(),
        }
    }
}

/// Proxy observation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProxyConfig {
    /// Half-width of the uniform noise added to every indicator.
    #[serde(default = "default_noise_level")]
    pub noise_level: f64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            noise_level: default_noise_level(),
        }
    }
}

/// Probabilities used by the path evaluator.
///
/// Setting all four to zero gives fully deterministic missions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EvaluatorConfig {
    /// Chance that ammo spent on a horde fails to clear it.
    #[serde(default = "default_ammo_failure_chance")]
    pub ammo_failure_chance: f64,

    /// Chance that explosives spent on a blockage fail to clear it.
    #[serde(default = "default_explosives_failure_chance")]
    pub explosives_failure_chance: f64,

    /// Per-step chance of a surprise zombie encounter.
    #[serde(default = "default_surprise_encounter_chance")]
    pub surprise_encounter_chance: f64,

    /// Per-step chance of a radiation leak.
    #[serde(default = "default_radiation_leak_chance")]
    pub radiation_leak_chance: f64,
}

impl EvaluatorConfig {
    /// A configuration with every random event disabled.
    pub const fn deterministic() -> Self {
        Self {
            ammo_failure_chance: 0.0,
            explosives_failure_chance: 0.0,
            surprise_encounter_chance: 0.0,
            radiation_leak_chance: 0.0,
        }
    }

    /// Check that every chance is a probability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("ammo_failure_chance", self.ammo_failure_chance),
            ("explosives_failure_chance", self.explosives_failure_chance),
            ("surprise_encounter_chance", self.surprise_encounter_chance),
            ("radiation_leak_chance", self.radiation_leak_chance),
        ];
        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!(
                    "evaluator.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            ammo_failure_chance: default_ammo_failure_chance(),
            explosives_failure_chance: default_explosives_failure_chance(),
            surprise_encounter_chance: default_surprise_encounter_chance(),
            radiation_leak_chance: default_radiation_leak_chance(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_n_nodes() -> usize {
    30
}

const fn default_seed() -> u64 {
    42
}

const fn default_noise_level() -> f64 {
    0.1
}

const fn default_ammo_failure_chance() -> f64 {
    0.35
}

const fn default_explosives_failure_chance() -> f64 {
    0.25
}

const fn default_surprise_encounter_chance() -> f64 {
    0.15
}

const fn default_radiation_leak_chance() -> f64 {
    0.10
}

fn default_log_level() -> String {
    String::from("info")
}
