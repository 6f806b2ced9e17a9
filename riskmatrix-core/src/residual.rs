//! Residual risk: inherent frequency/impact discounted by control mitigation.

use crate::inherent;
use crate::types::Rating;
use serde::{Deserialize, Serialize};

/// Which axis the mitigation fraction discounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MitigationMode {
    #[serde(rename = "FRECUENCIA")]
    Frequency,
    #[serde(rename = "IMPACTO")]
    Impact,
    #[default]
    #[serde(rename = "AMBAS")]
    Both,
}

impl MitigationMode {
    pub fn reduces_frequency(self) -> bool {
        matches!(self, MitigationMode::Frequency | MitigationMode::Both)
    }

    pub fn reduces_impact(self) -> bool {
        matches!(self, MitigationMode::Impact | MitigationMode::Both)
    }
}

/// Rounding applied to discounted frequency/impact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualRounding {
    /// Keep the fractional value `x * (1 - m)`.
    #[default]
    Exact,
    /// Round up to a whole rating, never below 1.
    RoundUp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidualConfig {
    pub rounding: ResidualRounding,
}

/// Residual values for one cause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualRisk {
    #[serde(rename = "frecuenciaResidual")]
    pub frequency: f64,
    #[serde(rename = "impactoResidual")]
    pub impact: f64,
    #[serde(rename = "calificacionResidual")]
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ResidualRiskCalculator {
    config: ResidualConfig,
}

impl ResidualRiskCalculator {
    pub fn new(config: ResidualConfig) -> Self {
        Self { config }
    }

    /// Apply `mitigation` (a fraction, clamped to `[0, 1]`) to the axes
    /// selected by `mode`, then score with the inherent rule (2x2 pin included).
    pub fn calculate(
        &self,
        frequency: Rating,
        impact: Rating,
        mitigation: f64,
        mode: MitigationMode,
    ) -> ResidualRisk {
        let mitigation = if mitigation.is_nan() {
            0.0
        } else {
            mitigation.clamp(0.0, 1.0)
        };

        let frequency = if mode.reduces_frequency() {
            self.reduce(frequency.as_f64(), mitigation)
        } else {
            frequency.as_f64()
        };
        let impact = if mode.reduces_impact() {
            self.reduce(impact.as_f64(), mitigation)
        } else {
            impact.as_f64()
        };

        ResidualRisk {
            frequency,
            impact,
            score: inherent::score(frequency, impact),
        }
    }

    fn reduce(&self, value: f64, mitigation: f64) -> f64 {
        let discounted = value - value * mitigation;
        match self.config.rounding {
            ResidualRounding::Exact => discounted,
            // Ignore float noise so 2.0000000000000004 stays 2.
            ResidualRounding::RoundUp => (discounted - 1e-9).ceil().max(1.0),
        }
    }
}

/// Risk-level residual score: the worst cause dominates.
///
/// Each entry is a cause's residual score, or its inherent score when the
/// cause has no control. With no causes at all the risk's own stored
/// inherent score is used.
pub fn worst_residual(per_cause: impl IntoIterator<Item = f64>, fallback_inherent: f64) -> f64 {
    per_cause
        .into_iter()
        .filter(|s| !s.is_nan())
        .reduce(f64::max)
        .unwrap_or(fallback_inherent)
}
