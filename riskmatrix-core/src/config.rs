//! Engine configuration.
//!
//! Configuration is layered with `figment`, later sources overriding earlier:
//! built-in defaults, the user config file, the workspace
//! `.riskmatrix/config.toml`, an explicitly named file, then `RISKMATRIX_`
//! environment variables (`__` separates nesting, e.g.
//! `RISKMATRIX_CONTROL__DEVIATION_RULE=highly_effective_only`).
//!
//! The loaded value is passed explicitly into the engine; nothing reads it
//! from ambient state.

use crate::control::ControlConfig;
use crate::error::ConfigError;
use crate::impact::ImpactConfig;
use crate::level_map::RiskLevelMapConfig;
use crate::prioritization::PrioritizationWeights;
use crate::residual::ResidualConfig;
use crate::tolerance::ToleranceSet;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under a workspace holding its config.
pub const WORKSPACE_DIR: &str = ".riskmatrix";
pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "RISKMATRIX_";

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub impact: ImpactConfig,
    pub control: ControlConfig,
    pub residual: ResidualConfig,
    /// Cells accepted as tolerable risk.
    pub tolerance: ToleranceSet,
    pub level_map: RiskLevelMapConfig,
    pub prioritization: PrioritizationWeights,
}

impl EngineConfig {
    /// Check every section's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.impact.weights.validate()?;
        self.control.validate()?;
        self.level_map.validate()?;
        self.prioritization.validate()
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Save(e.to_string()))
    }

    /// Write this config as TOML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Save(e.to_string()))?;
        }
        std::fs::write(path, contents).map_err(|e| ConfigError::Save(e.to_string()))?;
        debug!(path = %path.display(), "Saved engine configuration");
        Ok(())
    }
}

/// `config.toml` in the platform config directory, if one can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "riskmatrix", "riskmatrix")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(WORKSPACE_DIR).join(CONFIG_FILE)
}

/// Load and validate the layered configuration.
///
/// A missing user or workspace file is skipped; a missing `explicit` file is
/// an error.
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<EngineConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            debug!(path = %user_config.display(), "Merging user config");
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            debug!(path = %ws_config.display(), "Merging workspace config");
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "Merging explicit config");
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: EngineConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Defaults plus the workspace file alone.
///
/// This is the base for edits that are written back to the workspace file;
/// user config, explicit files, and environment overrides never leak into it.
pub fn load_workspace_config(workspace: &Path) -> Result<EngineConfig, ConfigError> {
    let path = workspace_config_path(workspace);
    let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(&path));
    }
    let config: EngineConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Parse a TOML document on top of the defaults, without touching the
/// filesystem or environment.
pub fn from_toml_str(toml: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = Figment::from(Serialized::defaults(EngineConfig::default()))
        .merge(Toml::string(toml))
        .extract()?;
    config.validate()?;
    Ok(config)
}
