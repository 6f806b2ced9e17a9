//! The risk scoring engine facade.
//!
//! [`RiskScoringEngine`] wires the individual calculators together: per cause
//! it aggregates impact, scores inherent risk, evaluates the control and
//! applies mitigation; per risk it takes the worst cause for both inherent
//! and residual scores and places each on the grid.
//!
//! The engine holds only its configuration and every call is a pure function
//! of its inputs, so one engine can be shared freely across threads.

use crate::classification::{RiskClassification, RiskLevel};
use crate::comparison::RiskPoint;
use crate::config::EngineConfig;
use crate::control::{ControlAssessment, ControlEvaluator, ControlInput};
use crate::error::{ConfigError, ScoringError};
use crate::grid::GridCoordinateResolver;
use crate::impact::{ImpactAggregator, ImpactRatings};
use crate::inherent;
use crate::level_map::MatrixKind;
use crate::prioritization::PrioritizationInput;
use crate::residual::{self, MitigationMode, ResidualRisk, ResidualRiskCalculator};
use crate::tolerance::BoundaryEdges;
use crate::types::{GridCell, Rating};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One cause of a risk, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CauseInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub frecuencia: Option<Rating>,
    /// Global impact; when absent it is aggregated from `impactos`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impacto: Option<Rating>,
    #[serde(skip_serializing_if = "ImpactRatings::is_empty")]
    pub impactos: ImpactRatings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlInput>,
    pub tipo_mitigacion: MitigationMode,
}

impl CauseInput {
    pub fn new(frecuencia: Rating, impacto: Rating) -> Self {
        Self {
            frecuencia: Some(frecuencia),
            impacto: Some(impacto),
            ..Default::default()
        }
    }

    pub fn with_control(mut self, control: ControlInput, mode: MitigationMode) -> Self {
        self.control = Some(control);
        self.tipo_mitigacion = mode;
        self
    }

    fn has_control(&self) -> bool {
        self.control.is_some_and(|c| c.tiene_control)
    }
}

/// Output record attached to a cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CauseEvaluation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub frecuencia: Rating,
    pub impacto_global: Rating,
    pub calificacion_inherente: f64,
    pub nivel_riesgo_inherente: RiskLevel,
    pub tiene_control: bool,
    #[serde(flatten)]
    pub control: ControlAssessment,
    pub tipo_mitigacion: MitigationMode,
    #[serde(flatten)]
    pub residual: ResidualRisk,
    pub nivel_riesgo_residual: RiskLevel,
}

/// A risk and its causes, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub causas: Vec<CauseInput>,
    pub clasificacion: RiskClassification,
    /// Previously stored inherent score, used when there are no causes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub riesgo_inherente: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priorizacion: Option<PrioritizationInput>,
}

/// Output record attached to a risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEvaluation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub causas: Vec<CauseEvaluation>,
    pub riesgo_inherente: f64,
    pub nivel_riesgo: RiskLevel,
    pub probabilidad: Rating,
    pub impacto: Rating,
    pub riesgo_residual: f64,
    pub probabilidad_residual: Rating,
    pub impacto_residual: Rating,
    pub nivel_riesgo_residual: RiskLevel,
    /// Whether the residual cell lies inside the tolerance set.
    pub tolerable: bool,
    /// Level assigned to the residual cell on the residual level map.
    pub nivel_mapa_residual: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puntaje_priorizacion: Option<f64>,
}

impl RiskEvaluation {
    pub fn inherent_cell(&self) -> GridCell {
        GridCell::new(self.probabilidad, self.impacto)
    }

    pub fn residual_cell(&self) -> GridCell {
        GridCell::new(self.probabilidad_residual, self.impacto_residual)
    }

    /// This risk as plotted on both matrices, for comparison reports.
    pub fn to_point(&self, id: impl Into<String>) -> RiskPoint {
        RiskPoint::new(id, self.inherent_cell(), Some(self.residual_cell()))
    }
}

/// Everything a renderer needs for one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub cell: GridCell,
    pub value: f64,
    pub level: RiskLevel,
    pub tolerable: bool,
    pub edges: BoundaryEdges,
}

pub struct RiskScoringEngine {
    config: EngineConfig,
    impact: ImpactAggregator,
    control: ControlEvaluator,
    residual: ResidualRiskCalculator,
}

impl RiskScoringEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            impact: ImpactAggregator::new(config.impact.clone()),
            control: ControlEvaluator::new(config.control.clone()),
            residual: ResidualRiskCalculator::new(config.residual.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Inherent score for raw integer ratings, validating the range.
    pub fn inherent_score(&self, frequency: i64, impact: i64) -> Result<f64, ScoringError> {
        inherent::inherent_score(frequency, impact)
    }

    pub fn global_impact(&self, cause: &CauseInput) -> Result<Rating, ScoringError> {
        match cause.impacto {
            Some(impact) => Ok(impact),
            None if !cause.impactos.is_empty() => Ok(self.impact.aggregate(&cause.impactos)),
            None => Err(ScoringError::MissingRating("impact")),
        }
    }

    pub fn evaluate_control(&self, control: Option<&ControlInput>) -> ControlAssessment {
        control.map_or_else(ControlAssessment::uncontrolled, |c| self.control.evaluate(c))
    }

    pub fn evaluate_cause(
        &self,
        cause: &CauseInput,
        classification: RiskClassification,
    ) -> Result<CauseEvaluation, ScoringError> {
        let frequency = cause
            .frecuencia
            .ok_or(ScoringError::MissingRating("frequency"))?;
        let impact = self.global_impact(cause)?;
        let inherent_score = inherent::cell_score(frequency, impact);

        let assessment = self.evaluate_control(cause.control.as_ref());
        let residual = self.residual.calculate(
            frequency,
            impact,
            assessment.mitigation,
            cause.tipo_mitigacion,
        );

        debug!(
            frequency = frequency.get(),
            impact = impact.get(),
            inherent = inherent_score,
            control_score = assessment.score,
            tier = %assessment.definitive,
            mitigation = assessment.mitigation,
            residual = residual.score,
            "Evaluated cause"
        );

        Ok(CauseEvaluation {
            id: cause.id.clone(),
            frecuencia: frequency,
            impacto_global: impact,
            calificacion_inherente: inherent_score,
            nivel_riesgo_inherente: RiskLevel::classify(inherent_score, classification),
            tiene_control: cause.has_control(),
            control: assessment,
            tipo_mitigacion: cause.tipo_mitigacion,
            residual,
            nivel_riesgo_residual: RiskLevel::classify(residual.score, classification),
        })
    }

    pub fn evaluate_risk(&self, risk: &RiskInput) -> Result<RiskEvaluation, ScoringError> {
        let causes = risk
            .causas
            .iter()
            .map(|c| self.evaluate_cause(c, risk.clasificacion))
            .collect::<Result<Vec<_>, _>>()?;

        let stored = risk.riesgo_inherente.filter(|s| s.is_finite());
        if causes.is_empty() {
            warn!(
                risk = risk.id.as_deref().unwrap_or("-"),
                stored_inherent = stored,
                "Risk has no causes; using stored inherent score"
            );
        }

        let inherent_score = if causes.is_empty() {
            stored.unwrap_or(0.0)
        } else {
            inherent::max_inherent(causes.iter().map(|c| c.calificacion_inherente))
        };

        let contributions = causes.iter().map(|c| {
            if c.tiene_control {
                c.residual.score
            } else {
                warn!(
                    cause = c.id.as_deref().unwrap_or("-"),
                    inherent = c.calificacion_inherente,
                    "Cause has no control; contributing its inherent score"
                );
                c.calificacion_inherente
            }
        });
        let residual_score =
            residual::worst_residual(contributions, stored.unwrap_or(inherent_score));

        let inherent_cell = GridCoordinateResolver::resolve(inherent_score);
        let residual_cell = GridCoordinateResolver::resolve(residual_score);
        let tolerable = self.config.tolerance.is_tolerable(residual_cell);
        let puntaje_priorizacion = risk
            .priorizacion
            .as_ref()
            .map(|p| self.config.prioritization.score(p));

        let evaluation = RiskEvaluation {
            id: risk.id.clone(),
            causas: causes,
            riesgo_inherente: inherent_score,
            nivel_riesgo: RiskLevel::classify(inherent_score, risk.clasificacion),
            probabilidad: inherent_cell.probability,
            impacto: inherent_cell.impact,
            riesgo_residual: residual_score,
            probabilidad_residual: residual_cell.probability,
            impacto_residual: residual_cell.impact,
            nivel_riesgo_residual: RiskLevel::classify(residual_score, risk.clasificacion),
            tolerable,
            nivel_mapa_residual: self
                .config
                .level_map
                .level_for(MatrixKind::Residual, residual_cell),
            puntaje_priorizacion,
        };

        debug!(
            risk = risk.id.as_deref().unwrap_or("-"),
            causes = evaluation.causas.len(),
            inherent = evaluation.riesgo_inherente,
            residual = evaluation.riesgo_residual,
            inherent_cell = %inherent_cell,
            residual_cell = %residual_cell,
            tolerable,
            "Evaluated risk"
        );

        Ok(evaluation)
    }

    /// Render data for a cell of the given matrix.
    pub fn cell_view(&self, kind: MatrixKind, cell: GridCell) -> CellView {
        CellView {
            cell,
            value: cell.value(),
            level: self.config.level_map.level_for(kind, cell),
            tolerable: self.config.tolerance.is_tolerable(cell),
            edges: self.config.tolerance.boundary_edges(cell),
        }
    }

    /// All 25 cells of a matrix in grid order.
    pub fn matrix(&self, kind: MatrixKind) -> Vec<CellView> {
        GridCell::all().map(|c| self.cell_view(kind, c)).collect()
    }
}

impl Default for RiskScoringEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{DeviationLevel, EffectivenessTier};
    use crate::criteria::{Applicability, ControlCriteria, Coverage, EaseOfUse, Nature, Segregation};
    use crate::impact::ImpactDimension;

    fn r(v: u8) -> Rating {
        Rating::new(v).unwrap()
    }

    fn full_control(deviations: DeviationLevel) -> ControlInput {
        ControlInput {
            tiene_control: true,
            desviaciones: deviations,
            criteria: ControlCriteria {
                aplicabilidad: Some(Applicability::Documented),
                cobertura: Some(Coverage::FullPopulation),
                facilidad_uso: Some(EaseOfUse::Proportionate),
                segregacion: Some(Segregation::Segregated),
                naturaleza: Some(Nature::Automatic),
            },
        }
    }

    #[test]
    fn test_uncontrolled_cause_keeps_inherent() {
        let engine = RiskScoringEngine::default();
        let eval = engine
            .evaluate_cause(&CauseInput::new(r(3), r(4)), RiskClassification::Negative)
            .unwrap();
        assert_eq!(eval.calificacion_inherente, 12.0);
        assert_eq!(eval.nivel_riesgo_inherente, RiskLevel::High);
        assert!(!eval.tiene_control);
        assert_eq!(eval.control.mitigation, 0.0);
        assert_eq!(eval.residual.score, 12.0);
    }

    #[test]
    fn test_fully_effective_control_both_axes() {
        let engine = RiskScoringEngine::default();
        let cause = CauseInput::new(r(3), r(4))
            .with_control(full_control(DeviationLevel::A), MitigationMode::Both);
        let eval = engine
            .evaluate_cause(&cause, RiskClassification::Negative)
            .unwrap();
        assert_eq!(eval.control.definitive, EffectivenessTier::HighlyEffective);
        assert!((eval.residual.score - 0.4332).abs() < 1e-9);
        // A positive fractional residual lands in the lowest band, not unrated.
        assert_eq!(eval.nivel_riesgo_residual, RiskLevel::Low);
    }

    #[test]
    fn test_impact_aggregated_from_dimensions() {
        let engine = RiskScoringEngine::default();
        let cause = CauseInput {
            frecuencia: Some(r(2)),
            impactos: [(ImpactDimension::Legal, r(4)), (ImpactDimension::Economic, r(2))]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        assert_eq!(engine.global_impact(&cause).unwrap().get(), 4);
        let eval = engine
            .evaluate_cause(&cause, RiskClassification::Negative)
            .unwrap();
        assert_eq!(eval.calificacion_inherente, 8.0);
    }

    #[test]
    fn test_missing_impact_is_error() {
        let engine = RiskScoringEngine::default();
        let cause = CauseInput {
            frecuencia: Some(r(2)),
            ..Default::default()
        };
        assert_eq!(
            engine.evaluate_cause(&cause, RiskClassification::Negative),
            Err(ScoringError::MissingRating("impact"))
        );
    }

    #[test]
    fn test_risk_without_causes_uses_stored_inherent() {
        let engine = RiskScoringEngine::default();
        let eval = engine
            .evaluate_risk(&RiskInput {
                riesgo_inherente: Some(15.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(eval.riesgo_inherente, 15.0);
        assert_eq!(eval.riesgo_residual, 15.0);
        assert_eq!(eval.nivel_riesgo_residual, RiskLevel::Critical);
        assert_eq!(eval.residual_cell().key(), "3-5");
    }

    #[test]
    fn test_pinned_cell_plots_on_itself() {
        let mut config = EngineConfig::default();
        config.tolerance.toggle(GridCell::new(r(2), r(2)));
        let engine = RiskScoringEngine::new(config).unwrap();
        let eval = engine
            .evaluate_risk(&RiskInput {
                causas: vec![CauseInput::new(r(2), r(2))],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(eval.riesgo_inherente, 3.99);
        assert_eq!(eval.inherent_cell().key(), "2-2");
        assert_eq!(eval.residual_cell().key(), "2-2");
        assert!(eval.tolerable);
        assert_eq!(eval.nivel_mapa_residual, RiskLevel::Low);
    }

    #[test]
    fn test_empty_risk_is_unrated() {
        let eval = RiskScoringEngine::default()
            .evaluate_risk(&RiskInput::default())
            .unwrap();
        assert_eq!(eval.nivel_riesgo, RiskLevel::Unrated);
        assert_eq!(eval.inherent_cell().key(), "1-1");
    }

    #[test]
    fn test_positive_risk_is_low() {
        let engine = RiskScoringEngine::default();
        let eval = engine
            .evaluate_risk(&RiskInput {
                causas: vec![CauseInput::new(r(5), r(5))],
                clasificacion: RiskClassification::Positive,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(eval.riesgo_inherente, 25.0);
        assert_eq!(eval.nivel_riesgo, RiskLevel::Low);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.control.weights.cobertura = 0.0;
        assert!(RiskScoringEngine::new(config).is_err());
    }

    #[test]
    fn test_matrix_view() {
        let engine = RiskScoringEngine::default();
        let cells = engine.matrix(MatrixKind::Inherente);
        assert_eq!(cells.len(), 25);
        assert_eq!(cells[6].cell.key(), "2-2");
        assert_eq!(cells[6].value, 3.99);
        assert_eq!(cells[6].level, RiskLevel::Low);
        assert!(!cells[6].tolerable);
    }
}
