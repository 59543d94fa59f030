//! Command line runner: executes one scenario and prints the composite
//! result as JSON.
//!
//! ```text
//! scenario-run preset india_pakistan_conflict
//! scenario-run file scenario.json --config engine.json
//! scenario-run list
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scenario_engine::{presets, telemetry, Engine, EngineConfig, MemoryStore, ModelRegistry, ScenarioConfig};

/// Run an impact scenario through the scenario engine.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Engine configuration JSON (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print only the risk assessment instead of the full composite
    #[arg(long, global = true)]
    risk_only: bool,
    /// The command to run.
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in preset.
    Preset {
        /// Preset name (see `list`)
        name: String,
    },
    /// Run a scenario configuration JSON file.
    File {
        /// Path to the scenario file
        path: PathBuf,
    },
    /// List the built-in presets.
    List,
}

fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading engine config {}", path.display()))?;
            EngineConfig::from_json_str(&json)?
        }
        None => EngineConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn load_scenario(command: &Commands) -> Result<Option<ScenarioConfig>> {
    match command {
        Commands::Preset { name } => match presets::by_name(name) {
            Some(config) => Ok(Some(config)),
            None => bail!(
                "unknown preset '{name}', expected one of: {}",
                presets::PRESET_NAMES.join(", ")
            ),
        },
        Commands::File { path } => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            let config = serde_json::from_str(&json)
                .with_context(|| format!("parsing scenario {}", path.display()))?;
            Ok(Some(config))
        }
        Commands::List => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let engine_config = load_engine_config(cli.config.as_deref())?;
    telemetry::init(&engine_config.log_level);

    let Some(scenario) = load_scenario(&cli.command)? else {
        for name in presets::PRESET_NAMES {
            println!("{name}");
        }
        return Ok(());
    };

    let engine = Engine::start(
        engine_config,
        ModelRegistry::with_default_models(),
        MemoryStore::new(),
    )
    .await?;
    let composite = engine.execute(scenario).await?;

    let output = if cli.risk_only {
        serde_json::to_string_pretty(composite.risk())?
    } else {
        serde_json::to_string_pretty(composite.as_ref())?
    };
    println!("{output}");
    Ok(())
}
