//! Inherent vs residual comparison across a set of plotted risks.

use crate::classification::RiskLevel;
use crate::types::{GRID_SIZE, GridCell};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A risk as plotted on both matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPoint {
    pub riesgo_id: String,
    pub inherente: GridCell,
    /// Residual position; a risk without controls stays where it was.
    #[serde(default)]
    pub residual: Option<GridCell>,
}

impl RiskPoint {
    pub fn new(id: impl Into<String>, inherente: GridCell, residual: Option<GridCell>) -> Self {
        Self {
            riesgo_id: id.into(),
            inherente,
            residual,
        }
    }

    pub fn residual_cell(&self) -> GridCell {
        self.residual.unwrap_or(self.inherente)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "bajo")]
    Decreased,
    #[serde(rename = "subio")]
    Increased,
    #[serde(rename = "se-mantuvo")]
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskComparison {
    pub riesgo_id: String,
    pub valor_inherente: f64,
    pub valor_residual: f64,
    pub cambio: Direction,
    /// Inherent minus residual; negative when risk went up.
    pub diferencia: f64,
    pub porcentaje_reduccion: i64,
}

impl RiskComparison {
    pub fn from_point(point: &RiskPoint) -> Self {
        let inherent = point.inherente.value();
        let residual = point.residual_cell().value();
        let cambio = if residual < inherent {
            Direction::Decreased
        } else if residual > inherent {
            Direction::Increased
        } else {
            Direction::Unchanged
        };
        let diferencia = inherent - residual;
        Self {
            riesgo_id: point.riesgo_id.clone(),
            valor_inherente: inherent,
            valor_residual: residual,
            cambio,
            diferencia,
            porcentaje_reduccion: reduction_percent(diferencia, inherent),
        }
    }
}

fn reduction_percent(reduced: f64, base: f64) -> i64 {
    if base > 0.0 {
        (reduced / base * 100.0).round() as i64
    } else {
        0
    }
}

/// Risk counts per cell, indexed `[probability - 1][impact - 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatMap {
    pub counts: [[usize; GRID_SIZE as usize]; GRID_SIZE as usize],
}

impl HeatMap {
    pub fn add(&mut self, cell: GridCell) {
        self.counts[usize::from(cell.probability.get() - 1)][usize::from(cell.impact.get() - 1)] +=
            1;
    }

    pub fn count(&self, cell: GridCell) -> usize {
        self.counts[usize::from(cell.probability.get() - 1)][usize::from(cell.impact.get() - 1)]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub riesgos: Vec<RiskComparison>,
    pub bajaron: usize,
    pub subieron: usize,
    pub se_mantuvieron: usize,
    pub total_inherente: f64,
    pub total_residual: f64,
    pub total_reducido: f64,
    pub porcentaje_reduccion_total: i64,
    pub niveles_inherente: BTreeMap<RiskLevel, usize>,
    pub niveles_residual: BTreeMap<RiskLevel, usize>,
    pub mapa_inherente: HeatMap,
    pub mapa_residual: HeatMap,
}

impl ComparisonSummary {
    /// Summarize `points`. A risk id seen twice counts once (first wins).
    pub fn build<'a>(points: impl IntoIterator<Item = &'a RiskPoint>) -> Self {
        let mut seen = HashSet::new();
        let mut summary = Self::default();

        for point in points {
            if !seen.insert(point.riesgo_id.as_str()) {
                continue;
            }
            let comparison = RiskComparison::from_point(point);
            match comparison.cambio {
                Direction::Decreased => summary.bajaron += 1,
                Direction::Increased => summary.subieron += 1,
                Direction::Unchanged => summary.se_mantuvieron += 1,
            }
            summary.total_inherente += comparison.valor_inherente;
            summary.total_residual += comparison.valor_residual;

            *summary
                .niveles_inherente
                .entry(RiskLevel::from_score(comparison.valor_inherente))
                .or_default() += 1;
            *summary
                .niveles_residual
                .entry(RiskLevel::from_score(comparison.valor_residual))
                .or_default() += 1;
            summary.mapa_inherente.add(point.inherente);
            summary.mapa_residual.add(point.residual_cell());

            summary.riesgos.push(comparison);
        }

        summary.total_reducido = summary.total_inherente - summary.total_residual;
        summary.porcentaje_reduccion_total =
            reduction_percent(summary.total_reducido, summary.total_inherente);
        summary
    }
}
