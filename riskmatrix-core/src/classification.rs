//! Risk level classification of inherent and residual scores.

use crate::error::ScoringError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical risk level, lowest first. `Unrated` sorts below every band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Score is 0, negative, NaN, or off the grid.
    #[serde(rename = "Sin Calificar")]
    Unrated,
    /// Below 4 (covers 1-3 and the pinned 3.99).
    #[serde(rename = "Bajo")]
    Low,
    /// 4-9.
    #[serde(rename = "Medio")]
    Medium,
    /// 10-14.
    #[serde(rename = "Alto")]
    High,
    /// 15-25.
    #[serde(rename = "Crítico")]
    Critical,
}

impl RiskLevel {
    pub const RATED: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Classify a score into its band.
    ///
    /// Bands are contiguous over `(0, 25]` so fractional residual scores
    /// always land somewhere: anything above 0 and below 4 is `Bajo`, which
    /// is also where a fully mitigated fractional residual (e.g. 0.43) goes.
    /// A score of exactly 0 is `Sin Calificar`, as are negatives, NaN, and
    /// values beyond the top of the grid.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() || score <= 0.0 || score > 25.0 {
            RiskLevel::Unrated
        } else if score < 4.0 {
            RiskLevel::Low
        } else if score < 10.0 {
            RiskLevel::Medium
        } else if score < 15.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Classify with the risk's consequence context.
    pub fn classify(score: f64, classification: RiskClassification) -> Self {
        match (Self::from_score(score), classification) {
            (RiskLevel::Unrated, _) => RiskLevel::Unrated,
            (_, RiskClassification::Positive) => RiskLevel::Low,
            (level, RiskClassification::Negative) => level,
        }
    }

    /// Loose match on level names such as `"NIVEL CRÍTICO"` or `"Medio"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let upper = label.trim().to_uppercase();
        if upper.contains("SIN CALIFICAR") {
            Some(RiskLevel::Unrated)
        } else if upper.contains("CRÍTICO") || upper.contains("CRITICO") {
            Some(RiskLevel::Critical)
        } else if upper.contains("ALTO") {
            Some(RiskLevel::High)
        } else if upper.contains("MEDIO") {
            Some(RiskLevel::Medium)
        } else if upper.contains("BAJO") {
            Some(RiskLevel::Low)
        } else {
            None
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Unrated => write!(f, "Sin Calificar"),
            RiskLevel::Low => write!(f, "Bajo"),
            RiskLevel::Medium => write!(f, "Medio"),
            RiskLevel::High => write!(f, "Alto"),
            RiskLevel::Critical => write!(f, "Crítico"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| ScoringError::UnknownLevel(s.to_string()))
    }
}

/// Whether a risk's consequence is adverse or an opportunity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskClassification {
    #[default]
    #[serde(rename = "Riesgo con consecuencia negativa")]
    Negative,
    #[serde(rename = "Riesgo con consecuencia positiva")]
    Positive,
}
