//! Prioritization score for treatment planning.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Prioritization variables; any missing one contributes 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrioritizationInput {
    pub capacidad: Option<f64>,
    pub complejidad: Option<f64>,
    pub velocidad: Option<f64>,
    pub otra_variable: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizationWeights {
    pub capacidad: f64,
    pub complejidad: f64,
    pub velocidad: f64,
    pub otra_variable: f64,
}

impl Default for PrioritizationWeights {
    fn default() -> Self {
        Self {
            capacidad: 0.25,
            complejidad: 0.25,
            velocidad: 0.25,
            otra_variable: 0.25,
        }
    }
}

impl PrioritizationWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            self.capacidad,
            self.complejidad,
            self.velocidad,
            self.otra_variable,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidWeights {
                name: "prioritization",
                sum: weights.iter().sum(),
            });
        }
        Ok(())
    }

    /// Weighted sum of the supplied variables. Non-finite inputs count as 0.
    pub fn score(&self, input: &PrioritizationInput) -> f64 {
        let value = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
        value(input.capacidad) * self.capacidad
            + value(input.complejidad) * self.complejidad
            + value(input.velocidad) * self.velocidad
            + value(input.otra_variable) * self.otra_variable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_weights() {
        let input = PrioritizationInput {
            capacidad: Some(4.0),
            complejidad: Some(2.0),
            velocidad: Some(3.0),
            otra_variable: Some(1.0),
        };
        assert_eq!(PrioritizationWeights::default().score(&input), 2.5);
    }

    #[test]
    fn test_missing_variables_count_zero() {
        let input = PrioritizationInput {
            velocidad: Some(4.0),
            ..Default::default()
        };
        assert_eq!(PrioritizationWeights::default().score(&input), 1.0);
        assert_eq!(
            PrioritizationWeights::default().score(&PrioritizationInput::default()),
            0.0
        );
    }

    #[test]
    fn test_non_finite_input_ignored() {
        let input = PrioritizationInput {
            capacidad: Some(f64::NAN),
            complejidad: Some(4.0),
            ..Default::default()
        };
        assert_eq!(PrioritizationWeights::default().score(&input), 1.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = PrioritizationWeights {
            velocidad: -0.1,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
        assert!(PrioritizationWeights::default().validate().is_ok());
    }

    #[test]
    fn test_input_from_json() {
        let input: PrioritizationInput =
            serde_json::from_str(r#"{"capacidad": 2, "otraVariable": 4}"#).unwrap();
        assert_eq!(input.otra_variable, Some(4.0));
        assert_eq!(PrioritizationWeights::default().score(&input), 1.5);
    }
}
