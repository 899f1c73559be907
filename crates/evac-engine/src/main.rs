//! Command-line driver for the evacuation simulation.
//!
//! Runs one seeded scenario with the shortest-path baseline policy and
//! prints the [`ScenarioReport`] as JSON on stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `evac-config.yaml` (or `EVAC_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the scenario runner from the config
//! 4. Run one scenario with the baseline policy
//! 5. Write the report
//!
//! [`ScenarioReport`]: evac_core::scenario::ScenarioReport

mod error;

use std::io::Write;
use std::path::{Path, PathBuf};

use evac_core::config::{SEED_ENV_VAR, SimulationConfig};
use evac_core::policy::ShortestPathPolicy;
use evac_core::scenario::ScenarioRunner;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable naming an alternate config file.
const CONFIG_ENV_VAR: &str = "EVAC_CONFIG";

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "evac-config.yaml";

fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so note where it came
    //    from and report it once the subscriber is installed.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        source = %source,
        seed = config.scenario.seed,
        n_nodes = config.scenario.n_nodes,
        noise_level = config.proxy.noise_level,
        "Configuration loaded"
    );

    // 3-4. Build the pipeline and run one scenario.
    let mut runner = ScenarioRunner::new(&config)?;
    let report = runner.run(&mut ShortestPathPolicy::new())?;

    // 5. Write the report.
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;

    info!(
        success = report.result.success,
        scenario_id = %report.scenario_id,
        "evac-engine finished"
    );
    Ok(())
}

/// Load configuration from the file named by `EVAC_CONFIG`, else from
/// `evac-config.yaml` if present, else defaults plus the seed override.
fn load_config() -> Result<(SimulationConfig, String), EngineError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from) {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }

    let config_path = Path::new(DEFAULT_CONFIG_PATH);
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok((config, config_path.display().to_string()))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_seed_override(std::env::var(SEED_ENV_VAR).ok().as_deref())?;
        config.validate()?;
        Ok((config, String::from("defaults")))
    }
}
