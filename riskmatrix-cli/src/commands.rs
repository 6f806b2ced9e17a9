//! CLI subcommand handlers.

use crate::render;
use crate::{Commands, ConfigAction, LevelAction, ToleranceAction};
use anyhow::Context;
use riskmatrix_core::config::{self, EngineConfig};
use riskmatrix_core::{
    ComparisonSummary, GridCell, GridCoordinateResolver, RiskEvaluation, RiskInput, RiskLevel,
    RiskScoringEngine,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle a CLI subcommand.
pub fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Score { frequency, impact } => {
            handle_score(&build_engine(workspace, config_file)?, frequency, impact)
        }
        Commands::Evaluate { input, compare } => {
            handle_evaluate(&build_engine(workspace, config_file)?, &input, compare)
        }
        Commands::Resolve { target } => handle_resolve(target),
        Commands::Matrix { kind } => {
            let engine = build_engine(workspace, config_file)?;
            print!("{}", render::render_matrix(&engine, kind.into()));
            Ok(())
        }
        Commands::Tolerance { action } => handle_tolerance(action, workspace, config_file),
        Commands::Level { action } => handle_level(action, workspace),
        Commands::Config { action } => handle_config(action, workspace, config_file),
    }
}

fn load(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<EngineConfig> {
    config::load_config(Some(workspace), config_file)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
}

fn build_engine(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<RiskScoringEngine> {
    let config = load(workspace, config_file)?;
    RiskScoringEngine::new(config).map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))
}

fn parse_cell(key: &str) -> anyhow::Result<GridCell> {
    Ok(key.parse()?)
}

/// Config to edit and write back: defaults plus the workspace file only.
fn load_for_edit(workspace: &Path) -> anyhow::Result<EngineConfig> {
    config::load_workspace_config(workspace)
        .map_err(|e| anyhow::anyhow!("Failed to load workspace config: {}", e))
}

/// Write `config` to the workspace file and report where it went.
fn save_workspace(config: &EngineConfig, workspace: &Path) -> anyhow::Result<PathBuf> {
    let path = config::workspace_config_path(workspace);
    config.save(&path)?;
    Ok(path)
}

fn handle_score(engine: &RiskScoringEngine, frequency: i64, impact: i64) -> anyhow::Result<()> {
    let score = engine.inherent_score(frequency, impact)?;
    let level = RiskLevel::from_score(score);
    let cell = GridCell::from_raw(frequency, impact)?;
    let tolerable = if engine.config().tolerance.is_tolerable(cell) {
        "tolerable"
    } else {
        "no tolerable"
    };
    println!("{cell}: {score} ({level}, {tolerable})");
    Ok(())
}

/// Parse one record or an array of records.
fn parse_risks(text: &str) -> anyhow::Result<Vec<RiskInput>> {
    let value: serde_json::Value = serde_json::from_str(text).context("Input is not JSON")?;
    let risks = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(risks)
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))
    }
}

pub(crate) fn evaluate_all(
    engine: &RiskScoringEngine,
    risks: &[RiskInput],
) -> anyhow::Result<Vec<RiskEvaluation>> {
    risks
        .iter()
        .enumerate()
        .map(|(n, risk)| {
            engine.evaluate_risk(risk).with_context(|| {
                format!("Risk {} ({})", n + 1, risk.id.as_deref().unwrap_or("sin id"))
            })
        })
        .collect()
}

fn handle_evaluate(engine: &RiskScoringEngine, input: &Path, compare: bool) -> anyhow::Result<()> {
    let risks = parse_risks(&read_input(input)?)?;
    let evaluations = evaluate_all(engine, &risks)?;
    info!(count = evaluations.len(), "Evaluated risks");

    if compare {
        let points: Vec<_> = evaluations
            .iter()
            .enumerate()
            .map(|(n, e)| e.to_point(e.id.clone().unwrap_or_else(|| (n + 1).to_string())))
            .collect();
        let summary = ComparisonSummary::build(&points);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if evaluations.len() == 1 {
        println!("{}", serde_json::to_string_pretty(&evaluations[0])?);
    } else {
        println!("{}", serde_json::to_string_pretty(&evaluations)?);
    }
    Ok(())
}

fn handle_resolve(target: f64) -> anyhow::Result<()> {
    let (cell, resolution) = GridCoordinateResolver::resolve_with_kind(target);
    println!(
        "{target} -> {cell} (valor {}, {:?}, {})",
        cell.value(),
        resolution,
        RiskLevel::from_score(target)
    );
    Ok(())
}

fn handle_tolerance(
    action: ToleranceAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ToleranceAction::List => {
            let config = load(workspace, config_file)?;
            if config.tolerance.is_empty() {
                println!("No tolerable cells configured.");
            } else {
                let keys: Vec<String> = config.tolerance.cells().map(GridCell::key).collect();
                println!("Tolerable cells ({}): {}", keys.len(), keys.join(", "));
            }
            Ok(())
        }
        ToleranceAction::Toggle { cell } => {
            let cell = parse_cell(&cell)?;
            let mut config = load_for_edit(workspace)?;
            config.tolerance = config.tolerance.toggled(cell);
            let path = save_workspace(&config, workspace)?;
            let state = if config.tolerance.is_tolerable(cell) {
                "tolerable"
            } else {
                "no tolerable"
            };
            println!("{cell} is now {state} ({})", path.display());
            Ok(())
        }
    }
}

fn handle_level(action: LevelAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        LevelAction::Cycle { kind, cell } => {
            let cell = parse_cell(&cell)?;
            let mut config = load_for_edit(workspace)?;
            let kind = kind.into();
            config.level_map = config.level_map.cycle(kind, cell);
            let path = save_workspace(&config, workspace)?;
            let name = config
                .level_map
                .level_def(kind, cell)
                .map_or("-", |l| l.name.as_str());
            println!("{cell} -> {name} ({})", path.display());
            Ok(())
        }
    }
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = config::workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            save_workspace(&EngineConfig::default(), workspace)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load(workspace, config_file)?;
            let toml_str = config.to_toml_string()?;
            println!("{}", toml_str);
            Ok(())
        }
        ConfigAction::Path => {
            match config::user_config_path() {
                Some(path) => println!("user:      {}", path.display()),
                None => println!("user:      (no home directory)"),
            }
            println!(
                "workspace: {}",
                config::workspace_config_path(workspace).display()
            );
            Ok(())
        }
    }
}
