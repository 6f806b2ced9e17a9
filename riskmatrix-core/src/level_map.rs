//! Administrator-assigned risk levels per grid cell, one map per matrix.

use crate::classification::RiskLevel;
use crate::error::ConfigError;
use crate::types::GridCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Level id an unassigned cell is treated as holding.
pub const UNASSIGNED_LEVEL_ID: &str = "5";

/// One entry of the level palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    pub color: String,
}

impl LevelDef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Band this palette entry stands for, matched on its name.
    pub fn risk_level(&self) -> Option<RiskLevel> {
        RiskLevel::from_label(&self.name)
    }
}

pub fn default_palette() -> Vec<LevelDef> {
    vec![
        LevelDef::new("1", "Crítico", "#d32f2f"),
        LevelDef::new("2", "Alto", "#f57c00"),
        LevelDef::new("3", "Medio", "#fbc02d"),
        LevelDef::new("4", "Bajo", "#388e3c"),
    ]
}

/// Which matrix a map belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixKind {
    Inherente,
    Residual,
}

/// Next palette entry after `current`, wrapping around.
///
/// An id not present in the palette (including the unassigned id) moves to
/// the first entry. `None` only for an empty palette.
pub fn next_level<'a>(palette: &'a [LevelDef], current: &str) -> Option<&'a LevelDef> {
    if palette.is_empty() {
        return None;
    }
    let next = palette
        .iter()
        .position(|l| l.id == current)
        .map_or(0, |idx| (idx + 1) % palette.len());
    palette.get(next)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLevelMapConfig {
    pub palette: Vec<LevelDef>,
    pub inherente: BTreeMap<GridCell, String>,
    pub residual: BTreeMap<GridCell, String>,
}

impl Default for RiskLevelMapConfig {
    fn default() -> Self {
        let palette = default_palette();
        let banded = banded_map(&palette);
        Self {
            palette,
            inherente: banded.clone(),
            residual: banded,
        }
    }
}

/// Assign every cell the palette entry matching its band.
pub fn banded_map(palette: &[LevelDef]) -> BTreeMap<GridCell, String> {
    GridCell::all()
        .filter_map(|cell| {
            let band = RiskLevel::from_score(cell.value());
            palette
                .iter()
                .find(|l| l.risk_level() == Some(band))
                .map(|l| (cell, l.id.clone()))
        })
        .collect()
}

impl RiskLevelMapConfig {
    pub fn map(&self, kind: MatrixKind) -> &BTreeMap<GridCell, String> {
        match kind {
            MatrixKind::Inherente => &self.inherente,
            MatrixKind::Residual => &self.residual,
        }
    }

    fn map_mut(&mut self, kind: MatrixKind) -> &mut BTreeMap<GridCell, String> {
        match kind {
            MatrixKind::Inherente => &mut self.inherente,
            MatrixKind::Residual => &mut self.residual,
        }
    }

    pub fn level_id(&self, kind: MatrixKind, cell: GridCell) -> &str {
        self.map(kind)
            .get(&cell)
            .map_or(UNASSIGNED_LEVEL_ID, String::as_str)
    }

    pub fn level_def(&self, kind: MatrixKind, cell: GridCell) -> Option<&LevelDef> {
        let id = self.level_id(kind, cell);
        self.palette.iter().find(|l| l.id == id)
    }

    /// Risk level shown for `cell`: the assigned palette entry when its name
    /// names a band, otherwise the band of the cell's score.
    pub fn level_for(&self, kind: MatrixKind, cell: GridCell) -> RiskLevel {
        self.level_def(kind, cell)
            .and_then(LevelDef::risk_level)
            .unwrap_or_else(|| RiskLevel::from_score(cell.value()))
    }

    /// Copy of this config with `cell` advanced to the next palette level.
    pub fn cycle(&self, kind: MatrixKind, cell: GridCell) -> Self {
        let mut next = self.clone();
        if let Some(level) = next_level(&self.palette, self.level_id(kind, cell)) {
            next.map_mut(kind).insert(cell, level.id.clone());
        }
        next
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }
}
