//! Impact aggregation: per-dimension ratings to a single global impact.

use crate::error::ConfigError;
use crate::types::Rating;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dimensions along which a cause's impact is rated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImpactDimension {
    #[serde(rename = "economico")]
    Economic,
    #[serde(rename = "procesos")]
    Process,
    #[serde(rename = "legal")]
    Legal,
    #[serde(rename = "reputacion")]
    Reputation,
    #[serde(rename = "personas")]
    People,
    #[serde(rename = "ambiental")]
    Environmental,
    #[serde(rename = "tecnologico")]
    Technological,
    #[serde(rename = "confidencialidadSGSI")]
    Confidentiality,
    #[serde(rename = "disponibilidadSGSI")]
    Availability,
    #[serde(rename = "integridadSGSI")]
    Integrity,
}

impl ImpactDimension {
    pub const ALL: [ImpactDimension; 10] = [
        ImpactDimension::Economic,
        ImpactDimension::Process,
        ImpactDimension::Legal,
        ImpactDimension::Reputation,
        ImpactDimension::People,
        ImpactDimension::Environmental,
        ImpactDimension::Technological,
        ImpactDimension::Confidentiality,
        ImpactDimension::Availability,
        ImpactDimension::Integrity,
    ];
}

/// Ratings supplied for a cause, possibly partial. Missing dimensions count as 1.
pub type ImpactRatings = BTreeMap<ImpactDimension, Rating>;

/// How dimension ratings collapse into one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Highest supplied rating.
    #[default]
    Max,
    /// Rounded-up weighted sum.
    Weighted,
}

/// Per-dimension weights for [`AggregationMode::Weighted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactWeights {
    pub economico: f64,
    pub procesos: f64,
    pub legal: f64,
    pub reputacion: f64,
    pub personas: f64,
    pub ambiental: f64,
    pub tecnologico: f64,
    pub confidencialidad_sgsi: f64,
    pub disponibilidad_sgsi: f64,
    pub integridad_sgsi: f64,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            economico: 0.22,
            procesos: 0.10,
            legal: 0.22,
            reputacion: 0.10,
            personas: 0.14,
            ambiental: 0.22,
            tecnologico: 0.0,
            confidencialidad_sgsi: 0.0,
            disponibilidad_sgsi: 0.0,
            integridad_sgsi: 0.0,
        }
    }
}

impl ImpactWeights {
    pub fn weight(&self, dimension: ImpactDimension) -> f64 {
        match dimension {
            ImpactDimension::Economic => self.economico,
            ImpactDimension::Process => self.procesos,
            ImpactDimension::Legal => self.legal,
            ImpactDimension::Reputation => self.reputacion,
            ImpactDimension::People => self.personas,
            ImpactDimension::Environmental => self.ambiental,
            ImpactDimension::Technological => self.tecnologico,
            ImpactDimension::Confidentiality => self.confidencialidad_sgsi,
            ImpactDimension::Availability => self.disponibilidad_sgsi,
            ImpactDimension::Integrity => self.integridad_sgsi,
        }
    }

    pub fn sum(&self) -> f64 {
        ImpactDimension::ALL.iter().map(|d| self.weight(*d)).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.sum();
        let negative = ImpactDimension::ALL.iter().any(|d| self.weight(*d) < 0.0);
        if negative || (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidWeights {
                name: "impact",
                sum,
            });
        }
        Ok(())
    }
}

/// Impact aggregation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub mode: AggregationMode,
    pub weights: ImpactWeights,
}

/// Collapses dimension ratings to the global impact used for scoring.
#[derive(Debug, Clone, Default)]
pub struct ImpactAggregator {
    config: ImpactConfig,
}

impl ImpactAggregator {
    pub fn new(config: ImpactConfig) -> Self {
        Self { config }
    }

    /// Global impact under the configured mode. Always within `1..=5`.
    pub fn aggregate(&self, ratings: &ImpactRatings) -> Rating {
        match self.config.mode {
            AggregationMode::Max => Self::max(ratings),
            AggregationMode::Weighted => self.weighted(ratings),
        }
    }

    /// Highest rating across dimensions; an empty map yields the lowest rating.
    pub fn max(ratings: &ImpactRatings) -> Rating {
        ratings.values().copied().max().unwrap_or(Rating::MIN)
    }

    /// `ceil(sum(rating * weight))` with absent dimensions rated 1.
    pub fn weighted(&self, ratings: &ImpactRatings) -> Rating {
        let sum: f64 = ImpactDimension::ALL
            .iter()
            .map(|d| {
                let rating = ratings.get(d).copied().unwrap_or(Rating::MIN);
                rating.as_f64() * self.config.weights.weight(*d)
            })
            .sum();
        // Drop accumulated float noise so 1.0000000000000002 rounds to 1.
        let rounded = (sum - 1e-9).ceil().clamp(1.0, 5.0);
        Rating::checked("impact", rounded as i64).unwrap_or(Rating::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(pairs: &[(ImpactDimension, u8)]) -> ImpactRatings {
        pairs
            .iter()
            .map(|(d, r)| (*d, Rating::new(*r).unwrap()))
            .collect()
    }

    #[test]
    fn test_max_picks_highest_dimension() {
        let r = ratings(&[
            (ImpactDimension::Economic, 2),
            (ImpactDimension::Legal, 4),
            (ImpactDimension::People, 3),
        ]);
        assert_eq!(ImpactAggregator::max(&r).get(), 4);
    }

    #[test]
    fn test_max_of_empty_is_lowest() {
        assert_eq!(ImpactAggregator::max(&ImpactRatings::new()), Rating::MIN);
    }

    #[test]
    fn test_default_mode_is_max() {
        let agg = ImpactAggregator::default();
        let r = ratings(&[(ImpactDimension::Technological, 5)]);
        assert_eq!(agg.aggregate(&r).get(), 5);
    }

    #[test]
    fn test_weighted_all_ones_is_one() {
        let agg = ImpactAggregator::new(ImpactConfig {
            mode: AggregationMode::Weighted,
            ..Default::default()
        });
        assert_eq!(agg.aggregate(&ImpactRatings::new()).get(), 1);
    }

    #[test]
    fn test_weighted_rounds_up() {
        let agg = ImpactAggregator::new(ImpactConfig {
            mode: AggregationMode::Weighted,
            ..Default::default()
        });
        // 0.22*5 + 0.78*1 = 1.88 -> 2
        let r = ratings(&[(ImpactDimension::Economic, 5)]);
        assert_eq!(agg.aggregate(&r).get(), 2);

        // Every weighted dimension at 5 -> exactly 5
        let all_five: ImpactRatings = ImpactDimension::ALL
            .iter()
            .map(|d| (*d, Rating::MAX))
            .collect();
        assert_eq!(agg.aggregate(&all_five).get(), 5);
    }

    #[test]
    fn test_zero_weight_dimensions_ignored_when_weighted() {
        let agg = ImpactAggregator::new(ImpactConfig {
            mode: AggregationMode::Weighted,
            ..Default::default()
        });
        let r = ratings(&[
            (ImpactDimension::Confidentiality, 5),
            (ImpactDimension::Technological, 5),
        ]);
        assert_eq!(agg.aggregate(&r).get(), 1);
    }

    #[test]
    fn test_default_weights_are_valid() {
        assert!(ImpactWeights::default().validate().is_ok());
        let bad = ImpactWeights {
            legal: 0.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_ratings_deserialize_from_spanish_keys() {
        let r: ImpactRatings =
            serde_json::from_str(r#"{"economico": 3, "confidencialidadSGSI": 2}"#).unwrap();
        assert_eq!(r[&ImpactDimension::Economic].get(), 3);
        assert_eq!(r[&ImpactDimension::Confidentiality].get(), 2);
    }
}
