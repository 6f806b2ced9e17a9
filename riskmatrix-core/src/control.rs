//! Control effectiveness evaluation.
//!
//! Five weighted criteria produce an effectiveness score (0-100). The score is
//! mapped to a preliminary tier, the deviation level adjusts it into the
//! definitive tier, and the definitive tier selects the mitigation fraction.
//! A cause without a control short-circuits to `Inefectivo` / 0%.

use crate::criteria::{ControlCriteria, CriterionScores};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance applied to threshold comparisons so weighted sums that land a
/// hair under a boundary through float rounding still reach it.
const SCORE_EPSILON: f64 = 1e-9;

/// Ordinal effectiveness classification, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectivenessTier {
    #[serde(rename = "Inefectivo")]
    Ineffective,
    #[serde(rename = "Baja Efectividad")]
    LowEffectiveness,
    #[serde(rename = "Medianamente Efectivo")]
    ModeratelyEffective,
    #[serde(rename = "Efectivo")]
    Effective,
    #[serde(rename = "Altamente Efectivo")]
    HighlyEffective,
}

impl EffectivenessTier {
    pub const ALL: [EffectivenessTier; 5] = [
        EffectivenessTier::Ineffective,
        EffectivenessTier::LowEffectiveness,
        EffectivenessTier::ModeratelyEffective,
        EffectivenessTier::Effective,
        EffectivenessTier::HighlyEffective,
    ];

    /// One step down; `Inefectivo` stays put.
    pub fn downgrade(self) -> Self {
        match self {
            EffectivenessTier::HighlyEffective => EffectivenessTier::Effective,
            EffectivenessTier::Effective => EffectivenessTier::ModeratelyEffective,
            EffectivenessTier::ModeratelyEffective => EffectivenessTier::LowEffectiveness,
            EffectivenessTier::LowEffectiveness => EffectivenessTier::Ineffective,
            EffectivenessTier::Ineffective => EffectivenessTier::Ineffective,
        }
    }
}

impl fmt::Display for EffectivenessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectivenessTier::Ineffective => write!(f, "Inefectivo"),
            EffectivenessTier::LowEffectiveness => write!(f, "Baja Efectividad"),
            EffectivenessTier::ModeratelyEffective => write!(f, "Medianamente Efectivo"),
            EffectivenessTier::Effective => write!(f, "Efectivo"),
            EffectivenessTier::HighlyEffective => write!(f, "Altamente Efectivo"),
        }
    }
}

/// Observed deviations in the control's operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviationLevel {
    /// No deviations found.
    #[default]
    A,
    /// Some deviations found.
    B,
    /// The control fails most of the time.
    C,
}

/// How deviation level `B` adjusts the preliminary tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationRule {
    /// Every tier drops one step.
    #[default]
    OneStep,
    /// Only `Altamente Efectivo` drops, to `Efectivo`.
    HighlyEffectiveOnly,
}

/// Per-criterion weights; must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlWeights {
    pub aplicabilidad: f64,
    pub cobertura: f64,
    pub facilidad_uso: f64,
    pub segregacion: f64,
    pub naturaleza: f64,
}

impl Default for ControlWeights {
    fn default() -> Self {
        Self {
            aplicabilidad: 0.25,
            cobertura: 0.25,
            facilidad_uso: 0.10,
            segregacion: 0.20,
            naturaleza: 0.20,
        }
    }
}

impl ControlWeights {
    pub fn sum(&self) -> f64 {
        self.aplicabilidad + self.cobertura + self.facilidad_uso + self.segregacion + self.naturaleza
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.sum();
        let negative = [
            self.aplicabilidad,
            self.cobertura,
            self.facilidad_uso,
            self.segregacion,
            self.naturaleza,
        ]
        .iter()
        .any(|w| *w < 0.0);
        if negative || (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidWeights {
                name: "control",
                sum,
            });
        }
        Ok(())
    }
}

/// Lower bounds (inclusive) of each tier above `Inefectivo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub altamente_efectivo: f64,
    pub efectivo: f64,
    pub medianamente_efectivo: f64,
    pub baja_efectividad: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            altamente_efectivo: 85.0,
            efectivo: 70.0,
            medianamente_efectivo: 50.0,
            baja_efectividad: 25.0,
        }
    }
}

impl TierThresholds {
    pub fn classify(&self, score: f64) -> EffectivenessTier {
        let reaches = |threshold: f64| score + SCORE_EPSILON >= threshold;
        if reaches(self.altamente_efectivo) {
            EffectivenessTier::HighlyEffective
        } else if reaches(self.efectivo) {
            EffectivenessTier::Effective
        } else if reaches(self.medianamente_efectivo) {
            EffectivenessTier::ModeratelyEffective
        } else if reaches(self.baja_efectividad) {
            EffectivenessTier::LowEffectiveness
        } else {
            EffectivenessTier::Ineffective
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = [
            100.0 + SCORE_EPSILON,
            self.altamente_efectivo,
            self.efectivo,
            self.medianamente_efectivo,
            self.baja_efectividad,
        ];
        let descending = ordered.windows(2).all(|w| w[0] > w[1]);
        if !descending || self.baja_efectividad <= 0.0 {
            return Err(ConfigError::InvalidThresholds(format!(
                "{} / {} / {} / {}",
                self.altamente_efectivo,
                self.efectivo,
                self.medianamente_efectivo,
                self.baja_efectividad
            )));
        }
        Ok(())
    }
}

/// Mitigation fraction (0.0-1.0) granted by each definitive tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MitigationTable {
    pub altamente_efectivo: f64,
    pub efectivo: f64,
    pub medianamente_efectivo: f64,
    pub baja_efectividad: f64,
    pub inefectivo: f64,
}

impl Default for MitigationTable {
    fn default() -> Self {
        Self {
            altamente_efectivo: 0.81,
            efectivo: 0.61,
            medianamente_efectivo: 0.33,
            baja_efectividad: 0.20,
            inefectivo: 0.0,
        }
    }
}

impl MitigationTable {
    pub fn lookup(&self, tier: EffectivenessTier) -> f64 {
        match tier {
            EffectivenessTier::HighlyEffective => self.altamente_efectivo,
            EffectivenessTier::Effective => self.efectivo,
            EffectivenessTier::ModeratelyEffective => self.medianamente_efectivo,
            EffectivenessTier::LowEffectiveness => self.baja_efectividad,
            EffectivenessTier::Ineffective => self.inefectivo,
        }
    }

    /// Every value within `[0, 1]`, non-decreasing with tier, `Inefectivo` at 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut previous = 0.0;
        for tier in EffectivenessTier::ALL {
            let value = self.lookup(tier);
            let floor_ok = tier != EffectivenessTier::Ineffective || value == 0.0;
            if !(0.0..=1.0).contains(&value) || value < previous || !floor_ok {
                return Err(ConfigError::InvalidMitigation {
                    tier: tier.to_string(),
                    value,
                });
            }
            previous = value;
        }
        Ok(())
    }
}

/// Control evaluation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub weights: ControlWeights,
    pub thresholds: TierThresholds,
    pub mitigation: MitigationTable,
    pub deviation_rule: DeviationRule,
}

impl ControlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.thresholds.validate()?;
        self.mitigation.validate()
    }
}

/// Control data attached to a cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlInput {
    pub tiene_control: bool,
    pub desviaciones: DeviationLevel,
    #[serde(flatten)]
    pub criteria: ControlCriteria,
}

/// Outcome of a control evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlAssessment {
    #[serde(rename = "puntajeTotal")]
    pub score: f64,
    #[serde(rename = "evaluacionPreliminar")]
    pub preliminary: EffectivenessTier,
    #[serde(rename = "evaluacionDefinitiva")]
    pub definitive: EffectivenessTier,
    /// Fraction in `[0, 1]`.
    #[serde(rename = "porcentajeMitigacion")]
    pub mitigation: f64,
}

impl ControlAssessment {
    /// Result for a cause with no control in place.
    pub fn uncontrolled() -> Self {
        Self {
            score: 0.0,
            preliminary: EffectivenessTier::Ineffective,
            definitive: EffectivenessTier::Ineffective,
            mitigation: 0.0,
        }
    }
}

/// Evaluates control effectiveness and mitigation.
#[derive(Debug, Clone, Default)]
pub struct ControlEvaluator {
    config: ControlConfig,
}

impl ControlEvaluator {
    pub fn new(config: ControlConfig) -> Self {
        Self { config }
    }

    /// Weighted sum of criterion points.
    pub fn effectiveness_score(&self, scores: &CriterionScores) -> f64 {
        let w = &self.config.weights;
        scores.aplicabilidad * w.aplicabilidad
            + scores.cobertura * w.cobertura
            + scores.facilidad_uso * w.facilidad_uso
            + scores.segregacion * w.segregacion
            + scores.naturaleza * w.naturaleza
    }

    pub fn preliminary_tier(&self, score: f64) -> EffectivenessTier {
        self.config.thresholds.classify(score)
    }

    pub fn definitive_tier(
        &self,
        preliminary: EffectivenessTier,
        deviations: DeviationLevel,
    ) -> EffectivenessTier {
        match (deviations, self.config.deviation_rule) {
            (DeviationLevel::A, _) => preliminary,
            (DeviationLevel::B, DeviationRule::OneStep) => preliminary.downgrade(),
            (DeviationLevel::B, DeviationRule::HighlyEffectiveOnly) => {
                if preliminary == EffectivenessTier::HighlyEffective {
                    EffectivenessTier::Effective
                } else {
                    preliminary
                }
            }
            (DeviationLevel::C, _) => EffectivenessTier::Ineffective,
        }
    }

    pub fn mitigation(&self, definitive: EffectivenessTier) -> f64 {
        self.config.mitigation.lookup(definitive)
    }

    /// Evaluate from raw criterion points.
    pub fn evaluate_scores(
        &self,
        has_control: bool,
        scores: &CriterionScores,
        deviations: DeviationLevel,
    ) -> ControlAssessment {
        if !has_control {
            return ControlAssessment::uncontrolled();
        }

        let score = self.effectiveness_score(scores);
        let preliminary = self.preliminary_tier(score);
        let definitive = self.definitive_tier(preliminary, deviations);
        ControlAssessment {
            score,
            preliminary,
            definitive,
            mitigation: self.mitigation(definitive),
        }
    }

    /// Evaluate from selected criterion options.
    pub fn evaluate(&self, input: &ControlInput) -> ControlAssessment {
        self.evaluate_scores(
            input.tiene_control,
            &input.criteria.scores(),
            input.desviaciones,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Applicability, Coverage, EaseOfUse, Nature, Segregation};

    fn evaluator() -> ControlEvaluator {
        ControlEvaluator::default()
    }

    #[test]
    fn test_full_marks_are_highly_effective() {
        let result =
            evaluator().evaluate_scores(true, &CriterionScores::uniform(100.0), DeviationLevel::A);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.preliminary, EffectivenessTier::HighlyEffective);
        assert_eq!(result.definitive, EffectivenessTier::HighlyEffective);
        assert_eq!(result.mitigation, 0.81);
    }

    #[test]
    fn test_no_control_ignores_criteria() {
        let result =
            evaluator().evaluate_scores(false, &CriterionScores::uniform(100.0), DeviationLevel::A);
        assert_eq!(result, ControlAssessment::uncontrolled());
    }

    #[test]
    fn test_deviation_c_forces_ineffective() {
        let result =
            evaluator().evaluate_scores(true, &CriterionScores::uniform(100.0), DeviationLevel::C);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.preliminary, EffectivenessTier::HighlyEffective);
        assert_eq!(result.definitive, EffectivenessTier::Ineffective);
        assert_eq!(result.mitigation, 0.0);
    }

    #[test]
    fn test_deviation_b_downgrades_one_step() {
        let eval = evaluator();
        assert_eq!(
            eval.definitive_tier(EffectivenessTier::HighlyEffective, DeviationLevel::B),
            EffectivenessTier::Effective
        );
        assert_eq!(
            eval.definitive_tier(EffectivenessTier::ModeratelyEffective, DeviationLevel::B),
            EffectivenessTier::LowEffectiveness
        );
        assert_eq!(
            eval.definitive_tier(EffectivenessTier::Ineffective, DeviationLevel::B),
            EffectivenessTier::Ineffective
        );
    }

    #[test]
    fn test_deviation_b_highly_effective_only_rule() {
        let eval = ControlEvaluator::new(ControlConfig {
            deviation_rule: DeviationRule::HighlyEffectiveOnly,
            ..Default::default()
        });
        assert_eq!(
            eval.definitive_tier(EffectivenessTier::HighlyEffective, DeviationLevel::B),
            EffectivenessTier::Effective
        );
        assert_eq!(
            eval.definitive_tier(EffectivenessTier::Effective, DeviationLevel::B),
            EffectivenessTier::Effective
        );
    }

    #[test]
    fn test_tier_thresholds_inclusive() {
        let t = TierThresholds::default();
        assert_eq!(t.classify(85.0), EffectivenessTier::HighlyEffective);
        assert_eq!(t.classify(84.99), EffectivenessTier::Effective);
        assert_eq!(t.classify(70.0), EffectivenessTier::Effective);
        assert_eq!(t.classify(50.0), EffectivenessTier::ModeratelyEffective);
        assert_eq!(t.classify(25.0), EffectivenessTier::LowEffectiveness);
        assert_eq!(t.classify(24.9), EffectivenessTier::Ineffective);
        assert_eq!(t.classify(0.0), EffectivenessTier::Ineffective);
    }

    #[test]
    fn test_labelled_criteria_scenario() {
        // 100*.25 + 70*.25 + 100*.10 + 0*.20 + 40*.20 = 60.5
        let input = ControlInput {
            tiene_control: true,
            desviaciones: DeviationLevel::A,
            criteria: ControlCriteria {
                aplicabilidad: Some(Applicability::Documented),
                cobertura: Some(Coverage::Sample),
                facilidad_uso: Some(EaseOfUse::Proportionate),
                segregacion: Some(Segregation::NotSegregated),
                naturaleza: Some(Nature::Manual),
            },
        };
        let result = evaluator().evaluate(&input);
        assert!((result.score - 60.5).abs() < 1e-9);
        assert_eq!(result.definitive, EffectivenessTier::ModeratelyEffective);
        assert_eq!(result.mitigation, 0.33);
    }

    #[test]
    fn test_incomplete_criteria_score_low() {
        let input = ControlInput {
            tiene_control: true,
            criteria: ControlCriteria {
                naturaleza: Some(Nature::Automatic),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = evaluator().evaluate(&input);
        assert!((result.score - 20.0).abs() < 1e-9);
        assert_eq!(result.definitive, EffectivenessTier::Ineffective);
    }

    #[test]
    fn test_mitigation_monotonic_with_tier() {
        let table = MitigationTable::default();
        let values: Vec<f64> = EffectivenessTier::ALL.iter().map(|t| table.lookup(*t)).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values[0], 0.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(ControlConfig::default().validate().is_ok());

        let bad_weights = ControlConfig {
            weights: ControlWeights {
                naturaleza: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            bad_weights.validate(),
            Err(ConfigError::InvalidWeights { name: "control", .. })
        ));

        let bad_thresholds = TierThresholds {
            efectivo: 90.0,
            ..Default::default()
        };
        assert!(bad_thresholds.validate().is_err());

        let bad_table = MitigationTable {
            efectivo: 0.9,
            ..Default::default()
        };
        assert!(bad_table.validate().is_err());
    }

    #[test]
    fn test_control_input_from_json() {
        let input: ControlInput = serde_json::from_str(
            r#"{"tieneControl": true, "desviaciones": "B", "aplicabilidad": "totalmente",
                "cobertura": "total", "facilidadUso": "facil", "segregacion": "si",
                "naturaleza": "Automático"}"#,
        )
        .unwrap();
        assert!(input.criteria.is_complete());
        let result = evaluator().evaluate(&input);
        assert_eq!(result.preliminary, EffectivenessTier::HighlyEffective);
        assert_eq!(result.definitive, EffectivenessTier::Effective);
        assert_eq!(result.mitigation, 0.61);
    }

    #[test]
    fn test_tier_display_matches_serde() {
        for tier in EffectivenessTier::ALL {
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{tier}\""));
        }
    }
}
